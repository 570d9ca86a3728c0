//! Purchase request lifecycle: creation, visibility, listing, decisions and withdrawal.
//!
//! Every mutation runs in one transaction together with its approval record and
//! notifications.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::notifications;
use super::storage::AttachmentStore;
use super::workflow::{self, Actor, WorkflowAction};
use crate::database::models::{
    Approval, ApprovalStep, Attachment, Priority, PurchaseRequest, RequestItem, RequestStatus,
    Role, UserRecord,
};
use crate::database::queries::{self, AwaitingFilter, NewItem, NewRequest, RequestFilter, Visibility};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::utils::{normalize_currency, optional_text, required_text, Pagination};

pub const DEFAULT_CURRENCY: &str = "TRY";
pub const MAX_ITEMS: usize = 50;
pub const MAX_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    pub product_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequestInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub priority: Priority,
    pub department_id: Option<i64>,
    pub currency: Option<String>,
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    #[default]
    All,
    Mine,
    AwaitingMe,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub scope: ListScope,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RequestPage {
    pub items: Vec<PurchaseRequest>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: PurchaseRequest,
    pub items: Vec<RequestItem>,
    pub approvals: Vec<Approval>,
    pub attachments: Vec<Attachment>,
}

/// Which requests `user` may see.
pub fn visibility_for(conn: &Connection, user: &UserRecord) -> rusqlite::Result<Visibility> {
    Ok(match user.role {
        Role::Admin | Role::It | Role::Finance | Role::Purchasing => Visibility::Company,
        Role::Manager => {
            let mut department_ids = queries::managed_department_ids(conn, user.company_id, user.id)?;
            if let Some(own) = user.department_id {
                if !department_ids.contains(&own) {
                    department_ids.push(own);
                }
            }
            Visibility::Departments {
                department_ids,
                user_id: user.id,
            }
        }
        Role::User => Visibility::Own { user_id: user.id },
    })
}

fn is_visible(visibility: &Visibility, request: &PurchaseRequest) -> bool {
    match visibility {
        Visibility::Company => true,
        Visibility::Departments {
            department_ids,
            user_id,
        } => request.requester_id == *user_id || department_ids.contains(&request.department_id),
        Visibility::Own { user_id } => request.requester_id == *user_id,
    }
}

/// Loads a request the caller may see. Invisible requests are reported as missing.
pub fn load_visible(
    conn: &Connection,
    user: &UserRecord,
    request_id: i64,
) -> AppResult<PurchaseRequest> {
    let request = queries::get_request(conn, user.company_id, request_id)?
        .ok_or(AppError::NotFound("purchase request"))?;
    if !is_visible(&visibility_for(conn, user)?, &request) {
        return Err(AppError::NotFound("purchase request"));
    }
    Ok(request)
}

fn load_detail(conn: &Connection, request: PurchaseRequest) -> AppResult<RequestDetail> {
    let items = queries::list_items(conn, request.id)?;
    let approvals = queries::list_approvals(conn, request.id)?;
    let attachments = queries::list_attachments(conn, request.company_id, request.id)?;
    Ok(RequestDetail {
        request,
        items,
        approvals,
        attachments,
    })
}

struct ResolvedItem {
    product_id: Option<i64>,
    description: String,
    quantity: i64,
    unit_price_cents: i64,
}

fn resolve_items(
    conn: &Connection,
    company_id: i64,
    requested_currency: Option<String>,
    inputs: &[ItemInput],
) -> AppResult<(Vec<ResolvedItem>, String, i64)> {
    if inputs.is_empty() {
        return Err(AppError::validation("a request needs at least one item"));
    }
    if inputs.len() > MAX_ITEMS {
        return Err(AppError::validation(format!("a request can have at most {MAX_ITEMS} items")));
    }

    let mut currency = requested_currency;
    let mut items = Vec::with_capacity(inputs.len());
    let mut total: i64 = 0;

    for (index, input) in inputs.iter().enumerate() {
        let line = index + 1;
        if !(1..=MAX_QUANTITY).contains(&input.quantity) {
            return Err(AppError::validation(format!(
                "item {line}: quantity must be between 1 and {MAX_QUANTITY}"
            )));
        }

        let (description, unit_price_cents) = match input.product_id {
            Some(product_id) => {
                let product = queries::get_product(conn, company_id, product_id)?
                    .filter(|p| p.active)
                    .ok_or_else(|| {
                        AppError::validation(format!("item {line}: product {product_id} is not available"))
                    })?;
                let code = currency.get_or_insert_with(|| product.currency.clone());
                if *code != product.currency {
                    return Err(AppError::validation(format!(
                        "item {line}: product is priced in {} but the request uses {code}",
                        product.currency
                    )));
                }
                let description = match input.description.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => optional_text("description", text, 500)?,
                    _ => product.name.clone(),
                };
                (description, input.unit_price_cents.unwrap_or(product.unit_price_cents))
            }
            None => {
                let description =
                    required_text(&format!("item {line} description"), input.description.as_deref().unwrap_or(""), 500)?;
                let price = input.unit_price_cents.ok_or_else(|| {
                    AppError::validation(format!("item {line}: unit_price_cents is required"))
                })?;
                (description, price)
            }
        };

        if unit_price_cents < 0 {
            return Err(AppError::validation(format!("item {line}: unit price must not be negative")));
        }
        total = unit_price_cents
            .checked_mul(input.quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| AppError::validation("request total is too large"))?;

        items.push(ResolvedItem {
            product_id: input.product_id,
            description,
            quantity: input.quantity,
            unit_price_cents,
        });
    }

    let currency = currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    Ok((items, currency, total))
}

pub async fn create_request(
    db: &Database,
    user: &UserRecord,
    input: CreateRequestInput,
) -> AppResult<RequestDetail> {
    let title = required_text("title", &input.title, 200)?;
    let description = optional_text("description", &input.description, 4000)?;
    let justification = optional_text("justification", &input.justification, 4000)?;
    let currency = input.currency.as_deref().map(normalize_currency).transpose()?;
    let user = user.clone();

    let detail = db
        .transaction(move |tx| {
            let department_id = input
                .department_id
                .or(user.department_id)
                .ok_or_else(|| AppError::validation("department_id is required for users without a department"))?;
            if queries::get_department(tx, user.company_id, department_id)?.is_none() {
                return Err(AppError::validation(format!("department {department_id} does not exist")));
            }

            let (items, currency, total_cents) = resolve_items(tx, user.company_id, currency, &input.items)?;

            let request_id = queries::insert_request(
                tx,
                &NewRequest {
                    company_id: user.company_id,
                    requester_id: user.id,
                    department_id,
                    title: &title,
                    description: &description,
                    justification: &justification,
                    priority: input.priority,
                    total_cents,
                    currency: &currency,
                },
            )?;
            for item in &items {
                queries::insert_item(
                    tx,
                    request_id,
                    &NewItem {
                        product_id: item.product_id,
                        description: &item.description,
                        quantity: item.quantity,
                        unit_price_cents: item.unit_price_cents,
                    },
                )?;
            }

            let request = queries::get_request(tx, user.company_id, request_id)?
                .ok_or(AppError::NotFound("purchase request"))?;
            notifications::request_created(tx, &request)?;
            load_detail(tx, request)
        })
        .await?;

    info!(
        request_id = detail.request.id,
        company_id = detail.request.company_id,
        requester_id = detail.request.requester_id,
        total_cents = detail.request.total_cents,
        "purchase request created"
    );
    Ok(detail)
}

/// Listing filter restricted to what `user` may see and, for `awaiting_me`, act on.
pub fn filter_for(
    conn: &Connection,
    user: &UserRecord,
    status: Option<RequestStatus>,
    scope: ListScope,
) -> rusqlite::Result<RequestFilter> {
    let mut filter = RequestFilter::new(user.company_id, visibility_for(conn, user)?);
    filter.status = status;
    match scope {
        ListScope::All => {}
        ListScope::Mine => filter.requester_id = Some(user.id),
        ListScope::AwaitingMe => {
            let managed_departments = if matches!(user.role, Role::Manager | Role::Admin) {
                queries::managed_department_ids(conn, user.company_id, user.id)?
            } else {
                Vec::new()
            };
            filter.awaiting = Some(AwaitingFilter {
                user_id: user.id,
                steps: ApprovalStep::company_wide_for(user.role),
                managed_departments,
            });
        }
    }
    Ok(filter)
}

pub async fn list_requests(db: &Database, user: &UserRecord, query: ListQuery) -> AppResult<RequestPage> {
    let (limit, offset) = Pagination {
        limit: query.limit,
        offset: query.offset,
    }
    .resolve();
    let user = user.clone();
    db.call(move |conn| {
        let filter = filter_for(conn, &user, query.status, query.scope)?;
        let items = queries::list_requests(conn, &filter, limit, offset)?;
        let total = queries::count_requests(conn, &filter)?;
        Ok(RequestPage {
            items,
            total,
            limit,
            offset,
        })
    })
    .await
}

pub async fn get_request(db: &Database, user: &UserRecord, request_id: i64) -> AppResult<RequestDetail> {
    let user = user.clone();
    db.call(move |conn| {
        let request = load_visible(conn, &user, request_id)?;
        load_detail(conn, request)
    })
    .await
}

/// Applies a workflow action on behalf of `user`.
pub async fn decide(
    db: &Database,
    user: &UserRecord,
    request_id: i64,
    action: WorkflowAction,
    comment: Option<String>,
) -> AppResult<RequestDetail> {
    let comment = match comment {
        Some(text) => Some(optional_text("comment", &text, 2000)?).filter(|c| !c.is_empty()),
        None => None,
    };
    if action == WorkflowAction::Reject && comment.is_none() {
        return Err(AppError::validation("a comment is required when rejecting"));
    }
    let user = user.clone();

    let (detail, transition) = db
        .transaction(move |tx| {
            let request = load_visible(tx, &user, request_id)?;
            let transition = workflow::transition(request.status, request.current_step, action)?;

            let managed = queries::managed_department_ids(tx, user.company_id, user.id)?;
            let actor = Actor {
                user_id: user.id,
                role: user.role,
                managed_departments: &managed,
            };
            workflow::authorize_actor(&actor, transition.decided_step, request.requester_id, request.department_id)?;

            queries::update_request_state(tx, request.id, transition.status, transition.step)?;
            queries::insert_approval(
                tx,
                request.id,
                transition.decided_step,
                user.id,
                transition.decision,
                comment.as_deref(),
            )?;
            notifications::request_transitioned(tx, &request, &transition)?;

            let updated = queries::get_request(tx, user.company_id, request.id)?
                .ok_or(AppError::NotFound("purchase request"))?;
            Ok((load_detail(tx, updated)?, transition))
        })
        .await?;

    info!(
        request_id,
        step = %transition.decided_step,
        decision = %transition.decision,
        status = %transition.status,
        "workflow decision recorded"
    );
    Ok(detail)
}

/// Withdraws a request that no approver has acted on yet, deleting its files.
pub async fn cancel(
    db: &Database,
    storage: &AttachmentStore,
    user: &UserRecord,
    request_id: i64,
) -> AppResult<()> {
    let actor = user.clone();
    let attachments = db
        .transaction(move |tx| {
            let request = load_visible(tx, &actor, request_id)?;
            if request.requester_id != actor.id {
                return Err(AppError::forbidden("only the requester can withdraw a request"));
            }
            let untouched = request.status == RequestStatus::Pending
                && request.current_step == Some(ApprovalStep::DepartmentManager)
                && queries::list_approvals(tx, request.id)?.is_empty();
            if !untouched {
                return Err(AppError::conflict("only requests nobody has decided on can be withdrawn"));
            }
            let attachments = queries::list_attachments(tx, request.company_id, request.id)?;
            queries::delete_request(tx, request.company_id, request.id)?;
            Ok(attachments)
        })
        .await?;

    for attachment in &attachments {
        storage.discard(attachment.company_id, &attachment.stored_name).await;
    }
    info!(request_id, user_id = user.id, "purchase request withdrawn");
    Ok(())
}
