//! Query/mutation surface over the pantheon core services.
//!
//! Requests are JSON envelopes `{"op": ..., "args": {...}}`; responses are
//! `{"ok": true, "data": ...}` or `{"ok": false, "error": {"code", "message"}}`.

pub mod dispatch;
pub mod request;
pub mod response;

pub use dispatch::{execute, handle_request_json, Dispatcher};
pub use request::{Request, RequestError};
pub use response::{AbodeView, EmblemView, ErrorBody, GodSummary, Response};
