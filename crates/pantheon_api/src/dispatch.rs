//! Request execution against one storage connection.
//!
//! # Responsibility
//! - Route typed requests to the god/abode/emblem services.
//! - Wrap every outcome in the response envelope.
//!
//! # Invariants
//! - Execution never panics; every failure becomes a `Failure` envelope.
//! - One request opens no transaction beyond what its service call does.
//! - Logs carry op names, ids and codes only; successful reads log at debug.

use crate::request::Request;
use crate::response::{AbodeView, EmblemView, Response};
use log::{debug, info, warn};
use pantheon_core::{
    Abode, AbodeRepository, AbodeService, Emblem, EmblemRepository, EmblemService, ErrorCategory,
    God, GodRepository, GodService, ResolveOptions, ServiceError, SqlitePantheonRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};

const ENCODE_FAILURE_BODY: &str =
    r#"{"ok":false,"error":{"code":"STORAGE","message":"response encoding failed"}}"#;

#[derive(Debug)]
enum ApiError {
    Service(ServiceError),
    Encode(serde_json::Error),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Service(err) => err.category().code(),
            Self::Encode(_) => ErrorCategory::Storage.code(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "response encoding failed: {err}"),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

/// Executes requests on a borrowed connection.
#[derive(Clone, Copy)]
pub struct Dispatcher<'conn> {
    conn: &'conn Connection,
    defaults: ResolveOptions,
}

impl<'conn> Dispatcher<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            defaults: ResolveOptions::default(),
        }
    }

    /// Resolve options used when a request carries no `depth`.
    pub fn with_defaults(mut self, defaults: ResolveOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Runs one typed request.
    pub fn execute(&self, request: Request) -> Response {
        let op = request.op();
        let is_query = request.is_query();
        match self.run(request) {
            Ok(data) => {
                if is_query {
                    debug!("event=api_request module=api status=ok op={op}");
                } else {
                    info!("event=api_request module=api status=ok op={op}");
                }
                Response::Success(data)
            }
            Err(err) => {
                warn!(
                    "event=api_request module=api status=error op={op} code={}",
                    err.code()
                );
                Response::failure(err.code(), err.to_string())
            }
        }
    }

    /// Decodes, runs and encodes one JSON request body.
    pub fn handle_json(&self, text: &str) -> String {
        let response = match Request::from_json(text) {
            Ok(request) => self.execute(request),
            Err(err) => {
                warn!(
                    "event=api_request module=api status=error op=undecoded code={}",
                    ErrorCategory::ValidationFailed.code()
                );
                Response::failure(ErrorCategory::ValidationFailed.code(), err.to_string())
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|err| {
            warn!("event=api_encode module=api status=error error={err}");
            ENCODE_FAILURE_BODY.to_string()
        })
    }

    fn run(&self, request: Request) -> Result<Value, ApiError> {
        let repo = SqlitePantheonRepository::try_new(self.conn).map_err(ServiceError::from)?;
        let gods = GodService::new(repo);
        let abodes = AbodeService::new(repo);
        let emblems = EmblemService::new(repo);

        match request {
            Request::Gods { depth } => to_data(&gods.resolve_gods(self.options(depth))?),
            Request::God { id, depth } => to_data(&gods.resolve_god(id, self.options(depth))?),
            Request::Abodes => {
                let mut views = Vec::new();
                for abode in abodes.list_abodes()? {
                    views.push(abode_view(&abodes, abode)?);
                }
                to_data(&views)
            }
            Request::Abode { id } => {
                let view = match abodes.get_abode(id)? {
                    Some(abode) => Some(abode_view(&abodes, abode)?),
                    None => None,
                };
                to_data(&view)
            }
            Request::Emblems => {
                let mut views = Vec::new();
                for emblem in emblems.list_emblems()? {
                    views.push(emblem_view(&emblems, emblem)?);
                }
                to_data(&views)
            }
            Request::Emblem { id } => {
                let view = match emblems.get_emblem(id)? {
                    Some(emblem) => Some(emblem_view(&emblems, emblem)?),
                    None => None,
                };
                to_data(&view)
            }
            Request::NewGod(new_god) => {
                let god = gods.create_god(new_god)?;
                self.god_data(&gods, god)
            }
            Request::UpdateGod {
                id,
                patch,
                expected_version,
            } => {
                let god = gods.update_god(id, &patch, expected_version)?;
                self.god_data(&gods, god)
            }
            Request::DeleteGod { id } => {
                let god = gods.delete_god(id)?;
                to_data(&gods.view(god, ResolveOptions::with_depth(Some(0)))?)
            }
            Request::AddGodRelative {
                god_id,
                relative_id,
                relationship,
            } => {
                let god = gods.add_relative(god_id, relative_id, relationship)?;
                self.god_data(&gods, god)
            }
            Request::RemoveGodRelative {
                god_id,
                relative_id,
                relationship,
            } => {
                let god = gods.remove_relative(god_id, relative_id, relationship)?;
                self.god_data(&gods, god)
            }
            Request::AddGodEmblem { god_id, emblem_id } => {
                let god = gods.add_emblem(god_id, emblem_id)?;
                self.god_data(&gods, god)
            }
            Request::RemoveGodEmblem { god_id, emblem_id } => {
                let god = gods.remove_emblem(god_id, emblem_id)?;
                self.god_data(&gods, god)
            }
            Request::UpdateGodAbode { god_id, abode_id } => {
                let god = match abode_id {
                    Some(abode_id) => gods.update_abode(god_id, abode_id)?,
                    None => gods.clear_abode(god_id)?,
                };
                self.god_data(&gods, god)
            }
            Request::AddGodDomain { god_id, domain } => {
                let god = gods.add_domain(god_id, &domain)?;
                self.god_data(&gods, god)
            }
            Request::RemoveGodDomain { god_id, domain } => {
                let god = gods.remove_domain(god_id, &domain)?;
                self.god_data(&gods, god)
            }
            Request::NewAbode { name, coordinates } => {
                let abode = abodes.create_abode(&name, &coordinates)?;
                to_data(&AbodeView::new(abode, Vec::new()))
            }
            Request::DeleteAbode { id } => {
                let residents = abodes.gods_in_abode(id)?;
                let abode = abodes.delete_abode(id)?;
                to_data(&AbodeView::new(abode, residents))
            }
            Request::UpdateAbode { id, patch } => {
                let abode = abodes.update_abode(id, &patch)?;
                to_data(&abode_view(&abodes, abode)?)
            }
            Request::NewEmblem { name } => {
                let emblem = emblems.create_emblem(&name)?;
                to_data(&EmblemView::new(emblem, Vec::new()))
            }
            Request::DeleteEmblem { id } => {
                let holders = emblems.gods_with_emblem(id)?;
                let emblem = emblems.delete_emblem(id)?;
                to_data(&EmblemView::new(emblem, holders))
            }
            Request::UpdateEmblem { id, name } => {
                let emblem = emblems.update_emblem(id, &name)?;
                to_data(&emblem_view(&emblems, emblem)?)
            }
        }
    }

    fn options(&self, depth: Option<u32>) -> ResolveOptions {
        match depth {
            Some(_) => ResolveOptions::with_depth(depth),
            None => self.defaults,
        }
    }

    fn god_data(
        &self,
        gods: &GodService<SqlitePantheonRepository<'conn>>,
        god: God,
    ) -> Result<Value, ApiError> {
        to_data(&gods.view(god, self.defaults)?)
    }
}

/// Runs one typed request with default resolve options.
pub fn execute(conn: &Connection, request: Request) -> Response {
    Dispatcher::new(conn).execute(request)
}

/// Decodes, runs and encodes one JSON request body.
///
/// Never panics; malformed input yields a `VALIDATION_FAILED` envelope.
pub fn handle_request_json(conn: &Connection, text: &str) -> String {
    Dispatcher::new(conn).handle_json(text)
}

fn abode_view<R: AbodeRepository + GodRepository>(
    abodes: &AbodeService<R>,
    abode: Abode,
) -> Result<AbodeView, ServiceError> {
    let residents = abodes.gods_in_abode(abode.id)?;
    Ok(AbodeView::new(abode, residents))
}

fn emblem_view<R: EmblemRepository + GodRepository>(
    emblems: &EmblemService<R>,
    emblem: Emblem,
) -> Result<EmblemView, ServiceError> {
    let holders = emblems.gods_with_emblem(emblem.id)?;
    Ok(EmblemView::new(emblem, holders))
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}
