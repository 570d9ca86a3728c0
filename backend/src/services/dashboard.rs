//! Logic for collecting and aggregating the data shown on a user's dashboard.
//!
//! The summary is computed from the same visibility rules as request listings, so
//! the counts a user sees always match what they can open.

use serde::Serialize;

use super::requests::{filter_for, ListScope};
use crate::database::models::{PurchaseRequest, RequestStatus, UserRecord};
use crate::database::queries;
use crate::database::Database;
use crate::errors::AppResult;

const RECENT_REQUESTS: i64 = 5;

/// Amounts are only ever summed within one currency.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: RequestStatus,
    pub count: i64,
    pub totals: Vec<CurrencyTotal>,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub by_status: Vec<StatusCount>,
    pub awaiting_my_action: i64,
    pub unread_notifications: i64,
    pub completed_totals: Vec<CurrencyTotal>,
    pub recent_requests: Vec<PurchaseRequest>,
}

/// Folds per-currency rows into one entry per status, including statuses with no requests.
fn group_by_status(rows: &[(RequestStatus, String, i64, i64)]) -> Vec<StatusCount> {
    RequestStatus::ALL
        .iter()
        .map(|status| {
            let matching = rows.iter().filter(|(s, ..)| s == status);
            StatusCount {
                status: *status,
                count: matching.clone().map(|(_, _, count, _)| count).sum(),
                totals: matching
                    .map(|(_, currency, _, total_cents)| CurrencyTotal {
                        currency: currency.clone(),
                        total_cents: *total_cents,
                    })
                    .collect(),
            }
        })
        .collect()
}

pub async fn summary(db: &Database, user: &UserRecord) -> AppResult<DashboardSummary> {
    let user = user.clone();
    db.call(move |conn| {
        let visible = filter_for(conn, &user, None, ListScope::All)?;
        let rows = queries::request_totals_by_status(conn, &visible)?;
        let by_status = group_by_status(&rows);
        let completed_totals = by_status
            .iter()
            .find(|c| c.status == RequestStatus::Completed)
            .map(|c| c.totals.clone())
            .unwrap_or_default();

        let awaiting = filter_for(conn, &user, None, ListScope::AwaitingMe)?;
        let awaiting_my_action = queries::count_requests(conn, &awaiting)?;
        let unread_notifications = queries::unread_notification_count(conn, user.id)?;
        let recent_requests = queries::list_requests(conn, &visible, RECENT_REQUESTS, 0)?;

        Ok(DashboardSummary {
            by_status,
            awaiting_my_action,
            unread_notifications,
            completed_totals,
            recent_requests,
        })
    })
    .await
}
