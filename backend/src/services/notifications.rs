//! Fan-out of workflow notifications.
//!
//! Called inside the same transaction as the state change that triggers them, so
//! a decision and its notifications are stored together or not at all.

use rusqlite::Connection;
use tracing::debug;

use super::workflow::Transition;
use crate::database::models::{ApprovalStep, NotificationKind, PurchaseRequest, RequestStatus, Role};
use crate::database::queries;

/// Active users who can decide `step` for `request`, excluding the requester. Falls back
/// to the company's administrators when nobody else holds the required role.
pub fn step_recipients(
    conn: &Connection,
    request: &PurchaseRequest,
    step: ApprovalStep,
) -> rusqlite::Result<Vec<i64>> {
    let mut recipients = match step {
        ApprovalStep::DepartmentManager => {
            queries::department_approver_ids(conn, request.company_id, request.department_id)?
        }
        other => queries::active_user_ids_with_role(conn, request.company_id, other.required_role())?,
    };
    recipients.retain(|id| *id != request.requester_id);
    if recipients.is_empty() {
        recipients = queries::active_user_ids_with_role(conn, request.company_id, Role::Admin)?;
        recipients.retain(|id| *id != request.requester_id);
    }
    Ok(recipients)
}

fn send(
    conn: &Connection,
    request: &PurchaseRequest,
    user_ids: &[i64],
    kind: NotificationKind,
    message: &str,
) -> rusqlite::Result<usize> {
    for user_id in user_ids {
        queries::insert_notification(
            conn,
            request.company_id,
            *user_id,
            kind,
            message,
            Some(request.id),
        )?;
    }
    debug!(request_id = request.id, kind = %kind, recipients = user_ids.len(), "notifications queued");
    Ok(user_ids.len())
}

/// Tells the first approvers that a new request is waiting.
pub fn request_created(conn: &Connection, request: &PurchaseRequest) -> rusqlite::Result<usize> {
    let Some(step) = request.current_step else {
        return Ok(0);
    };
    let recipients = step_recipients(conn, request, step)?;
    let message = format!("Request #{} \"{}\" is waiting for your approval", request.id, request.title);
    send(conn, request, &recipients, NotificationKind::ApprovalRequired, &message)
}

/// Notifies the requester about `transition` and, when the request moved on to a new
/// step, that step's approvers.
pub fn request_transitioned(
    conn: &Connection,
    request: &PurchaseRequest,
    transition: &Transition,
) -> rusqlite::Result<usize> {
    let mut sent = 0;

    let (kind, message) = match transition.status {
        RequestStatus::Pending => (
            NotificationKind::RequestAdvanced,
            format!(
                "Request #{} \"{}\" was approved at step {} and moved to {}",
                request.id,
                request.title,
                transition.decided_step,
                transition.step.map(|s| s.as_str()).unwrap_or("-"),
            ),
        ),
        RequestStatus::Approved => (
            NotificationKind::RequestApproved,
            format!("Request #{} \"{}\" was fully approved", request.id, request.title),
        ),
        RequestStatus::Rejected => (
            NotificationKind::RequestRejected,
            format!(
                "Request #{} \"{}\" was rejected at step {}",
                request.id, request.title, transition.decided_step
            ),
        ),
        RequestStatus::InPurchasing => (
            NotificationKind::PurchaseStarted,
            format!("Purchasing started for request #{} \"{}\"", request.id, request.title),
        ),
        RequestStatus::Completed => (
            NotificationKind::RequestCompleted,
            format!("Request #{} \"{}\" was completed", request.id, request.title),
        ),
    };
    sent += send(conn, request, &[request.requester_id], kind, &message)?;

    if let Some(next) = transition.step.filter(|next| *next != transition.decided_step) {
        let recipients = step_recipients(conn, request, next)?;
        let message = format!(
            "Request #{} \"{}\" is waiting for your action at step {}",
            request.id, request.title, next
        );
        sent += send(conn, request, &recipients, NotificationKind::ApprovalRequired, &message)?;
    }

    Ok(sent)
}
