//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! and orchestrate interactions between different parts of the application,
//! such as driving the approval workflow or aggregating dashboard data.

pub mod attachments;
pub mod catalog;
pub mod dashboard;
pub mod directory;
pub mod notifications;
pub mod planner;
pub mod requests;
pub mod storage;
pub mod workflow;
