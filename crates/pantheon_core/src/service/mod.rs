//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Resolve nested god projections on read.
//! - Keep API/CLI layers decoupled from storage details.

pub mod abode_service;
pub mod emblem_service;
pub mod error;
pub mod god_service;
pub mod resolve;
