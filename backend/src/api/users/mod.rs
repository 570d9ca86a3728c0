//! Module for user management API endpoints.
//!
//! This module handles administration of the accounts within a company, which is
//! distinct from the core authentication process handled in `auth`.

pub mod handlers;
pub mod routes;
