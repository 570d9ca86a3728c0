//! Module for the purchase request API.
//!
//! This module exposes request creation and listing, the approval workflow
//! actions, and the attachments that belong to a request.

pub mod attachments;
pub mod handlers;
pub mod routes;
