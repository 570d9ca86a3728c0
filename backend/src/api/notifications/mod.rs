//! Module for the notification inbox API.

pub mod handlers;
pub mod routes;
