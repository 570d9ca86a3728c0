//! The purchase request approval state machine.
//!
//! A request moves through a fixed chain of steps:
//!
//! ```text
//! BEKLEMEDE/DEPARTMENT_MANAGER -> BEKLEMEDE/IT -> BEKLEMEDE/FINANCE
//!     -> ONAYLANDI/PURCHASING -> SATINALMA_SURECINDE/PURCHASING -> TAMAMLANDI
//! ```
//!
//! Any approval step may reject, which ends the request in REDDEDILDI. Terminal
//! requests carry no current step. Everything here is pure; persistence and
//! notifications live in `services::requests`.

use std::fmt;

use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::database::models::{ApprovalStep, Decision, RequestStatus, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Approve,
    Reject,
    StartPurchase,
    Complete,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::StartPurchase => "start purchase for",
            WorkflowAction::Complete => "complete",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} a request in status {status}")]
    InvalidTransition {
        status: RequestStatus,
        action: WorkflowAction,
    },
    #[error("step {step} must be decided by role {required}")]
    WrongRole {
        step: ApprovalStep,
        required: Role,
    },
    #[error("only a manager of the request's department can decide this step")]
    NotDepartmentManager,
    #[error("requesters cannot decide on their own request")]
    SelfDecision,
}

impl WorkflowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::FORBIDDEN,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::WrongRole { .. } => "wrong_role",
            WorkflowError::NotDepartmentManager => "not_department_manager",
            WorkflowError::SelfDecision => "self_decision",
        }
    }
}

impl ApprovalStep {
    /// The step that follows this one, `None` after purchasing.
    pub fn next(self) -> Option<ApprovalStep> {
        match self {
            ApprovalStep::DepartmentManager => Some(ApprovalStep::It),
            ApprovalStep::It => Some(ApprovalStep::Finance),
            ApprovalStep::Finance => Some(ApprovalStep::Purchasing),
            ApprovalStep::Purchasing => None,
        }
    }

    pub fn required_role(self) -> Role {
        match self {
            ApprovalStep::DepartmentManager => Role::Manager,
            ApprovalStep::It => Role::It,
            ApprovalStep::Finance => Role::Finance,
            ApprovalStep::Purchasing => Role::Purchasing,
        }
    }

    /// Steps a user with `role` can decide regardless of department.
    pub fn company_wide_for(role: Role) -> Vec<ApprovalStep> {
        match role {
            Role::Admin => ApprovalStep::ALL.to_vec(),
            Role::It => vec![ApprovalStep::It],
            Role::Finance => vec![ApprovalStep::Finance],
            Role::Purchasing => vec![ApprovalStep::Purchasing],
            Role::Manager | Role::User => Vec::new(),
        }
    }
}

/// The result of applying an action to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Step the decision was taken at, recorded in the approval history.
    pub decided_step: ApprovalStep,
    pub decision: Decision,
    pub status: RequestStatus,
    pub step: Option<ApprovalStep>,
}

pub fn transition(
    status: RequestStatus,
    step: Option<ApprovalStep>,
    action: WorkflowAction,
) -> Result<Transition, WorkflowError> {
    let invalid = WorkflowError::InvalidTransition { status, action };

    let Some(current) = step else {
        return Err(invalid);
    };

    let (decision, status, step) = match (status, current, action) {
        (RequestStatus::Pending, ApprovalStep::Finance, WorkflowAction::Approve) => (
            Decision::Approved,
            RequestStatus::Approved,
            Some(ApprovalStep::Purchasing),
        ),
        (
            RequestStatus::Pending,
            ApprovalStep::DepartmentManager | ApprovalStep::It,
            WorkflowAction::Approve,
        ) => (Decision::Approved, RequestStatus::Pending, current.next()),
        (RequestStatus::Pending, ApprovalStep::Purchasing, _) => return Err(invalid),
        (RequestStatus::Pending, _, WorkflowAction::Reject)
        | (RequestStatus::Approved, ApprovalStep::Purchasing, WorkflowAction::Reject) => {
            (Decision::Rejected, RequestStatus::Rejected, None)
        }
        (RequestStatus::Approved, ApprovalStep::Purchasing, WorkflowAction::StartPurchase) => (
            Decision::PurchaseStarted,
            RequestStatus::InPurchasing,
            Some(ApprovalStep::Purchasing),
        ),
        (RequestStatus::InPurchasing, ApprovalStep::Purchasing, WorkflowAction::Complete) => {
            (Decision::Completed, RequestStatus::Completed, None)
        }
        _ => return Err(invalid),
    };

    Ok(Transition {
        decided_step: current,
        decision,
        status,
        step,
    })
}

/// Who is trying to act on a request.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub user_id: i64,
    pub role: Role,
    /// Departments whose manager step this actor may decide.
    pub managed_departments: &'a [i64],
}

/// Checks that `actor` may decide `step` of a request raised by `requester_id` in `department_id`.
pub fn authorize_actor(
    actor: &Actor<'_>,
    step: ApprovalStep,
    requester_id: i64,
    department_id: i64,
) -> Result<(), WorkflowError> {
    if actor.user_id == requester_id {
        return Err(WorkflowError::SelfDecision);
    }
    if actor.role == Role::Admin {
        return Ok(());
    }

    let required = step.required_role();
    if actor.role != required {
        return Err(WorkflowError::WrongRole { step, required });
    }
    if step == ApprovalStep::DepartmentManager && !actor.managed_departments.contains(&department_id) {
        return Err(WorkflowError::NotDepartmentManager);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApprovalStep::*;
    use RequestStatus::*;
    use WorkflowAction::*;

    fn apply(status: RequestStatus, step: Option<ApprovalStep>, action: WorkflowAction) -> (RequestStatus, Option<ApprovalStep>) {
        let t = transition(status, step, action).expect("transition should be valid");
        (t.status, t.step)
    }

    #[test]
    fn happy_path_walks_the_whole_chain() {
        let mut state = (Pending, Some(DepartmentManager));
        state = apply(state.0, state.1, Approve);
        assert_eq!(state, (Pending, Some(It)));
        state = apply(state.0, state.1, Approve);
        assert_eq!(state, (Pending, Some(Finance)));
        state = apply(state.0, state.1, Approve);
        assert_eq!(state, (Approved, Some(Purchasing)));
        state = apply(state.0, state.1, StartPurchase);
        assert_eq!(state, (InPurchasing, Some(Purchasing)));
        state = apply(state.0, state.1, Complete);
        assert_eq!(state, (Completed, None));
    }

    #[test]
    fn any_approval_step_can_reject() {
        for step in [DepartmentManager, It, Finance] {
            let t = transition(Pending, Some(step), Reject).expect("reject");
            assert_eq!((t.status, t.step, t.decision, t.decided_step), (Rejected, None, Decision::Rejected, step));
        }
        assert_eq!(apply(Approved, Some(Purchasing), Reject), (Rejected, None));
    }

    #[test]
    fn out_of_order_actions_are_invalid() {
        let cases = [
            (Pending, Some(DepartmentManager), StartPurchase),
            (Pending, Some(It), Complete),
            (Approved, Some(Purchasing), Approve),
            (Approved, Some(Purchasing), Complete),
            (InPurchasing, Some(Purchasing), Approve),
            (InPurchasing, Some(Purchasing), Reject),
            (InPurchasing, Some(Purchasing), StartPurchase),
            (Rejected, None, Approve),
            (Completed, None, Reject),
            (Pending, None, Approve),
            (Pending, Some(Purchasing), Approve),
        ];
        for (status, step, action) in cases {
            assert_eq!(
                transition(status, step, action),
                Err(WorkflowError::InvalidTransition { status, action }),
                "{status}/{step:?} {action}"
            );
        }
    }

    #[test]
    fn step_order_and_roles() {
        assert_eq!(DepartmentManager.next(), Some(It));
        assert_eq!(Purchasing.next(), None);
        assert_eq!(Finance.required_role(), Role::Finance);
        assert_eq!(ApprovalStep::company_wide_for(Role::Admin).len(), 4);
        assert!(ApprovalStep::company_wide_for(Role::Manager).is_empty());
    }

    #[test]
    fn actors_are_checked_against_the_step() {
        let managed = [10];
        let manager = Actor { user_id: 1, role: Role::Manager, managed_departments: &managed };
        assert_eq!(authorize_actor(&manager, DepartmentManager, 2, 10), Ok(()));
        assert_eq!(
            authorize_actor(&manager, DepartmentManager, 2, 11),
            Err(WorkflowError::NotDepartmentManager)
        );
        assert_eq!(
            authorize_actor(&manager, It, 2, 10),
            Err(WorkflowError::WrongRole { step: It, required: Role::It })
        );
        assert_eq!(authorize_actor(&manager, DepartmentManager, 1, 10), Err(WorkflowError::SelfDecision));

        let admin = Actor { user_id: 5, role: Role::Admin, managed_departments: &[] };
        assert_eq!(authorize_actor(&admin, Finance, 2, 99), Ok(()));
        assert_eq!(authorize_actor(&admin, Finance, 5, 99), Err(WorkflowError::SelfDecision));
    }
}
