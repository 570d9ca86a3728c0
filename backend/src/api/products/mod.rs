//! Module for the product catalogue API.

pub mod handlers;
pub mod routes;
