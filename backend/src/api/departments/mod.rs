//! Module for department API endpoints.

pub mod handlers;
pub mod routes;
