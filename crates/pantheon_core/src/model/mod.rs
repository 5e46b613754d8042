//! Pantheon domain model.
//!
//! # Responsibility
//! - Define canonical records for gods and their associated abodes/emblems.
//! - Own input validation shared by repositories and services.
//!
//! # Invariants
//! - Every record is identified by a stable uuid generated on create.
//! - Relations between gods are not part of the god record; they live in the
//!   relation edge table and are computed on read.

pub mod abode;
pub mod emblem;
pub mod god;
pub mod validation;
