//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the different API domains,
//! such as purchase requests, the product catalogue and dashboard widgets,
//! excluding core authentication routes which are handled separately.

pub mod dashboard;
pub mod departments;
pub mod notifications;
pub mod products;
pub mod requests;
pub mod users;
