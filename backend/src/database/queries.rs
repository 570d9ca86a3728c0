//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct database operations, providing reusable
//! functions for interacting with the database and abstracting the query logic
//! from higher-level services and API handlers. Every function that touches
//! tenant-owned rows takes the company id and filters by it.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::models::{
    Approval, ApprovalStep, Attachment, CalendarEvent, Company, Decision, Department,
    Notification, NotificationKind, Priority, Product, PurchaseRequest, RequestItem,
    RequestStatus, Role, Todo, UserRecord,
};

type QueryResult<T> = rusqlite::Result<T>;

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

const COMPANY_COLUMNS: &str = "id, name, slug, created_at";

fn map_company(row: &Row<'_>) -> QueryResult<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn insert_company(conn: &Connection, name: &str, slug: &str) -> QueryResult<Company> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO companies (name, slug, created_at) VALUES (?1, ?2, ?3)",
        params![name, slug, now],
    )?;
    Ok(Company {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        slug: slug.to_string(),
        created_at: now,
    })
}

pub fn find_company_by_slug(conn: &Connection, slug: &str) -> QueryResult<Option<Company>> {
    conn.query_row(
        &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE slug = ?1"),
        params![slug],
        map_company,
    )
    .optional()
}

pub fn get_company(conn: &Connection, id: i64) -> QueryResult<Option<Company>> {
    conn.query_row(
        &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"),
        params![id],
        map_company,
    )
    .optional()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

const USER_COLUMNS: &str =
    "id, company_id, department_id, email, full_name, password_hash, role, active, created_at";

fn map_user(row: &Row<'_>) -> QueryResult<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        company_id: row.get(1)?,
        department_id: row.get(2)?,
        email: row.get(3)?,
        full_name: row.get(4)?,
        password_hash: row.get(5)?,
        role: row.get(6)?,
        active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub company_id: i64,
    pub department_id: Option<i64>,
    pub email: &'a str,
    pub full_name: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

pub fn insert_user(conn: &Connection, user: &NewUser<'_>) -> QueryResult<UserRecord> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users (company_id, department_id, email, full_name, password_hash, role, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        params![
            user.company_id,
            user.department_id,
            user.email,
            user.full_name,
            user.password_hash,
            user.role,
            now
        ],
    )?;
    Ok(UserRecord {
        id: conn.last_insert_rowid(),
        company_id: user.company_id,
        department_id: user.department_id,
        email: user.email.to_string(),
        full_name: user.full_name.to_string(),
        password_hash: user.password_hash.to_string(),
        role: user.role,
        active: true,
        created_at: now,
    })
}

pub fn get_user(conn: &Connection, company_id: i64, id: i64) -> QueryResult<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_user,
    )
    .optional()
}

pub fn find_user_by_email(
    conn: &Connection,
    company_id: i64,
    email: &str,
) -> QueryResult<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE company_id = ?1 AND email = ?2"),
        params![company_id, email],
        map_user,
    )
    .optional()
}

pub fn list_users(conn: &Connection, company_id: i64) -> QueryResult<Vec<UserRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE company_id = ?1 ORDER BY full_name, id"
    ))?;
    let rows = stmt.query_map(params![company_id], map_user)?;
    rows.collect()
}

/// Persists every mutable column of `user`.
pub fn save_user(conn: &Connection, user: &UserRecord) -> QueryResult<()> {
    conn.execute(
        "UPDATE users SET department_id = ?1, email = ?2, full_name = ?3, password_hash = ?4, role = ?5, active = ?6
         WHERE company_id = ?7 AND id = ?8",
        params![
            user.department_id,
            user.email,
            user.full_name,
            user.password_hash,
            user.role,
            user.active,
            user.company_id,
            user.id
        ],
    )?;
    Ok(())
}

/// Ids of the active users holding `role`.
pub fn active_user_ids_with_role(
    conn: &Connection,
    company_id: i64,
    role: Role,
) -> QueryResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM users WHERE company_id = ?1 AND role = ?2 AND active = 1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![company_id, role], |row| row.get(0))?;
    rows.collect()
}

/// Users who may decide the department-manager step for `department_id`: the assigned
/// manager when there is one, otherwise every active MANAGER of that department.
pub fn department_approver_ids(
    conn: &Connection,
    company_id: i64,
    department_id: i64,
) -> QueryResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT u.id FROM users u
         JOIN departments d ON d.id = ?2 AND d.company_id = ?1
         WHERE u.company_id = ?1 AND u.active = 1 AND u.role = 'MANAGER'
           AND ((d.manager_id IS NOT NULL AND u.id = d.manager_id)
             OR (d.manager_id IS NULL AND u.department_id = d.id))
         ORDER BY u.id",
    )?;
    let rows = stmt.query_map(params![company_id, department_id], |row| row.get(0))?;
    rows.collect()
}

/// Departments whose manager step `user_id` may decide.
pub fn managed_department_ids(
    conn: &Connection,
    company_id: i64,
    user_id: i64,
) -> QueryResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT d.id FROM departments d
         JOIN users u ON u.id = ?2 AND u.company_id = ?1
         WHERE d.company_id = ?1 AND u.role = 'MANAGER' AND u.active = 1
           AND (d.manager_id = u.id OR (d.manager_id IS NULL AND u.department_id = d.id))
         ORDER BY d.id",
    )?;
    let rows = stmt.query_map(params![company_id, user_id], |row| row.get(0))?;
    rows.collect()
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

const DEPARTMENT_COLUMNS: &str = "id, company_id, name, manager_id, created_at";

fn map_department(row: &Row<'_>) -> QueryResult<Department> {
    Ok(Department {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        manager_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn insert_department(
    conn: &Connection,
    company_id: i64,
    name: &str,
    manager_id: Option<i64>,
) -> QueryResult<Department> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO departments (company_id, name, manager_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![company_id, name, manager_id, now],
    )?;
    Ok(Department {
        id: conn.last_insert_rowid(),
        company_id,
        name: name.to_string(),
        manager_id,
        created_at: now,
    })
}

pub fn get_department(
    conn: &Connection,
    company_id: i64,
    id: i64,
) -> QueryResult<Option<Department>> {
    conn.query_row(
        &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_department,
    )
    .optional()
}

pub fn list_departments(conn: &Connection, company_id: i64) -> QueryResult<Vec<Department>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE company_id = ?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![company_id], map_department)?;
    rows.collect()
}

pub fn save_department(conn: &Connection, department: &Department) -> QueryResult<()> {
    conn.execute(
        "UPDATE departments SET name = ?1, manager_id = ?2 WHERE company_id = ?3 AND id = ?4",
        params![
            department.name,
            department.manager_id,
            department.company_id,
            department.id
        ],
    )?;
    Ok(())
}

/// Unassigns `user_id` from every department it manages. Returns the number of departments touched.
pub fn clear_department_manager(conn: &Connection, company_id: i64, user_id: i64) -> QueryResult<usize> {
    conn.execute(
        "UPDATE departments SET manager_id = NULL WHERE company_id = ?1 AND manager_id = ?2",
        params![company_id, user_id],
    )
}

/// True when users or purchase requests still point at the department.
pub fn department_in_use(conn: &Connection, company_id: i64, id: i64) -> QueryResult<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM users WHERE company_id = ?1 AND department_id = ?2)
             OR EXISTS (SELECT 1 FROM purchase_requests WHERE company_id = ?1 AND department_id = ?2)",
        params![company_id, id],
        |row| row.get(0),
    )
}

pub fn delete_department(conn: &Connection, company_id: i64, id: i64) -> QueryResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM departments WHERE company_id = ?1 AND id = ?2",
        params![company_id, id],
    )?;
    Ok(deleted > 0)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

const PRODUCT_COLUMNS: &str =
    "id, company_id, name, category, description, unit_price_cents, currency, active";

fn map_product(row: &Row<'_>) -> QueryResult<Product> {
    Ok(Product {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        unit_price_cents: row.get(5)?,
        currency: row.get(6)?,
        active: row.get(7)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub company_id: i64,
    pub name: &'a str,
    pub category: &'a str,
    pub description: &'a str,
    pub unit_price_cents: i64,
    pub currency: &'a str,
}

pub fn insert_product(conn: &Connection, product: &NewProduct<'_>) -> QueryResult<Product> {
    conn.execute(
        "INSERT INTO products (company_id, name, category, description, unit_price_cents, currency, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
        params![
            product.company_id,
            product.name,
            product.category,
            product.description,
            product.unit_price_cents,
            product.currency
        ],
    )?;
    Ok(Product {
        id: conn.last_insert_rowid(),
        company_id: product.company_id,
        name: product.name.to_string(),
        category: product.category.to_string(),
        description: product.description.to_string(),
        unit_price_cents: product.unit_price_cents,
        currency: product.currency.to_string(),
        active: true,
    })
}

pub fn get_product(conn: &Connection, company_id: i64, id: i64) -> QueryResult<Option<Product>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_product,
    )
    .optional()
}

pub fn list_products(
    conn: &Connection,
    company_id: i64,
    active_only: bool,
    category: Option<&str>,
) -> QueryResult<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE company_id = ?1 AND (?2 = 0 OR active = 1) AND (?3 IS NULL OR category = ?3)
         ORDER BY category, name"
    ))?;
    let rows = stmt.query_map(params![company_id, active_only, category], map_product)?;
    rows.collect()
}

pub fn save_product(conn: &Connection, product: &Product) -> QueryResult<()> {
    conn.execute(
        "UPDATE products SET name = ?1, category = ?2, description = ?3, unit_price_cents = ?4, currency = ?5, active = ?6
         WHERE company_id = ?7 AND id = ?8",
        params![
            product.name,
            product.category,
            product.description,
            product.unit_price_cents,
            product.currency,
            product.active,
            product.company_id,
            product.id
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Purchase requests
// ---------------------------------------------------------------------------

const REQUEST_COLUMNS: &str = "id, company_id, requester_id, department_id, title, description, justification, \
     priority, status, current_step, total_cents, currency, created_at, updated_at";

fn map_request(row: &Row<'_>) -> QueryResult<PurchaseRequest> {
    Ok(PurchaseRequest {
        id: row.get(0)?,
        company_id: row.get(1)?,
        requester_id: row.get(2)?,
        department_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        justification: row.get(6)?,
        priority: row.get(7)?,
        status: row.get(8)?,
        current_step: row.get(9)?,
        total_cents: row.get(10)?,
        currency: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewRequest<'a> {
    pub company_id: i64,
    pub requester_id: i64,
    pub department_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub justification: &'a str,
    pub priority: Priority,
    pub total_cents: i64,
    pub currency: &'a str,
}

#[derive(Debug, Clone)]
pub struct NewItem<'a> {
    pub product_id: Option<i64>,
    pub description: &'a str,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Inserts a new request at the start of the approval chain and returns its id.
pub fn insert_request(conn: &Connection, request: &NewRequest<'_>) -> QueryResult<i64> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO purchase_requests
            (company_id, requester_id, department_id, title, description, justification, priority,
             status, current_step, total_cents, currency, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            request.company_id,
            request.requester_id,
            request.department_id,
            request.title,
            request.description,
            request.justification,
            request.priority,
            RequestStatus::Pending,
            ApprovalStep::DepartmentManager,
            request.total_cents,
            request.currency,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_item(conn: &Connection, request_id: i64, item: &NewItem<'_>) -> QueryResult<i64> {
    conn.execute(
        "INSERT INTO request_items (request_id, product_id, description, quantity, unit_price_cents)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            request_id,
            item.product_id,
            item.description,
            item.quantity,
            item.unit_price_cents
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_request(
    conn: &Connection,
    company_id: i64,
    id: i64,
) -> QueryResult<Option<PurchaseRequest>> {
    conn.query_row(
        &format!("SELECT {REQUEST_COLUMNS} FROM purchase_requests WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_request,
    )
    .optional()
}

pub fn update_request_state(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    step: Option<ApprovalStep>,
) -> QueryResult<()> {
    conn.execute(
        "UPDATE purchase_requests SET status = ?1, current_step = ?2, updated_at = ?3 WHERE id = ?4",
        params![status, step, Utc::now(), id],
    )?;
    Ok(())
}

pub fn delete_request(conn: &Connection, company_id: i64, id: i64) -> QueryResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM purchase_requests WHERE company_id = ?1 AND id = ?2",
        params![company_id, id],
    )?;
    Ok(deleted > 0)
}

/// Which requests a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Company,
    /// Requests of the listed departments plus the caller's own.
    Departments { department_ids: Vec<i64>, user_id: i64 },
    Own { user_id: i64 },
}

/// Restricts a listing to requests the caller can currently act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwaitingFilter {
    pub user_id: i64,
    /// Steps the caller may decide in any department.
    pub steps: Vec<ApprovalStep>,
    /// Departments whose manager step the caller may decide.
    pub managed_departments: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct RequestFilter {
    pub company_id: i64,
    pub visibility: Visibility,
    pub status: Option<RequestStatus>,
    pub requester_id: Option<i64>,
    pub awaiting: Option<AwaitingFilter>,
}

impl RequestFilter {
    pub fn new(company_id: i64, visibility: Visibility) -> Self {
        Self {
            company_id,
            visibility,
            status: None,
            requester_id: None,
            awaiting: None,
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = vec!["company_id = ?".to_string()];
        let mut values = vec![Value::Integer(self.company_id)];

        match &self.visibility {
            Visibility::Company => {}
            Visibility::Departments {
                department_ids,
                user_id,
            } => {
                if department_ids.is_empty() {
                    clauses.push("requester_id = ?".to_string());
                } else {
                    let marks = vec!["?"; department_ids.len()].join(", ");
                    clauses.push(format!("(department_id IN ({marks}) OR requester_id = ?)"));
                    values.extend(department_ids.iter().map(|id| Value::Integer(*id)));
                }
                values.push(Value::Integer(*user_id));
            }
            Visibility::Own { user_id } => {
                clauses.push("requester_id = ?".to_string());
                values.push(Value::Integer(*user_id));
            }
        }

        if let Some(status) = self.status {
            clauses.push("status = ?".to_string());
            values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(requester_id) = self.requester_id {
            clauses.push("requester_id = ?".to_string());
            values.push(Value::Integer(requester_id));
        }

        if let Some(awaiting) = &self.awaiting {
            let mut alternatives = Vec::new();
            if !awaiting.steps.is_empty() {
                let marks = vec!["?"; awaiting.steps.len()].join(", ");
                alternatives.push(format!("current_step IN ({marks})"));
                values.extend(
                    awaiting
                        .steps
                        .iter()
                        .map(|step| Value::Text(step.as_str().to_string())),
                );
            }
            if !awaiting.managed_departments.is_empty() {
                let marks = vec!["?"; awaiting.managed_departments.len()].join(", ");
                alternatives.push(format!(
                    "(current_step = ? AND department_id IN ({marks}))"
                ));
                values.push(Value::Text(
                    ApprovalStep::DepartmentManager.as_str().to_string(),
                ));
                values.extend(awaiting.managed_departments.iter().map(|id| Value::Integer(*id)));
            }
            if alternatives.is_empty() {
                clauses.push("0".to_string());
            } else {
                clauses.push(format!("({})", alternatives.join(" OR ")));
                clauses.push("requester_id != ?".to_string());
                values.push(Value::Integer(awaiting.user_id));
            }
        }

        (clauses.join(" AND "), values)
    }
}

pub fn list_requests(
    conn: &Connection,
    filter: &RequestFilter,
    limit: i64,
    offset: i64,
) -> QueryResult<Vec<PurchaseRequest>> {
    let (clause, mut values) = filter.where_clause();
    values.push(Value::Integer(limit));
    values.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUEST_COLUMNS} FROM purchase_requests WHERE {clause}
         ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    ))?;
    let rows = stmt.query_map(params_from_iter(values), map_request)?;
    rows.collect()
}

pub fn count_requests(conn: &Connection, filter: &RequestFilter) -> QueryResult<i64> {
    let (clause, values) = filter.where_clause();
    conn.query_row(
        &format!("SELECT COUNT(*) FROM purchase_requests WHERE {clause}"),
        params_from_iter(values),
        |row| row.get(0),
    )
}

/// Request count and summed total per status and currency.
pub fn request_totals_by_status(
    conn: &Connection,
    filter: &RequestFilter,
) -> QueryResult<Vec<(RequestStatus, String, i64, i64)>> {
    let (clause, values) = filter.where_clause();
    let mut stmt = conn.prepare(&format!(
        "SELECT status, currency, COUNT(*), COALESCE(SUM(total_cents), 0) FROM purchase_requests
         WHERE {clause} GROUP BY status, currency ORDER BY currency"
    ))?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;
    rows.collect()
}

pub fn list_items(conn: &Connection, request_id: i64) -> QueryResult<Vec<RequestItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, request_id, product_id, description, quantity, unit_price_cents
         FROM request_items WHERE request_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![request_id], |row| {
        Ok(RequestItem {
            id: row.get(0)?,
            request_id: row.get(1)?,
            product_id: row.get(2)?,
            description: row.get(3)?,
            quantity: row.get(4)?,
            unit_price_cents: row.get(5)?,
        })
    })?;
    rows.collect()
}

// ---------------------------------------------------------------------------
// Approval history
// ---------------------------------------------------------------------------

pub fn insert_approval(
    conn: &Connection,
    request_id: i64,
    step: ApprovalStep,
    approver_id: i64,
    decision: Decision,
    comment: Option<&str>,
) -> QueryResult<Approval> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO approvals (request_id, step, approver_id, decision, comment, decided_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![request_id, step, approver_id, decision, comment, now],
    )?;
    Ok(Approval {
        id: conn.last_insert_rowid(),
        request_id,
        step,
        approver_id,
        decision,
        comment: comment.map(str::to_string),
        decided_at: now,
    })
}

pub fn list_approvals(conn: &Connection, request_id: i64) -> QueryResult<Vec<Approval>> {
    let mut stmt = conn.prepare(
        "SELECT id, request_id, step, approver_id, decision, comment, decided_at
         FROM approvals WHERE request_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![request_id], |row| {
        Ok(Approval {
            id: row.get(0)?,
            request_id: row.get(1)?,
            step: row.get(2)?,
            approver_id: row.get(3)?,
            decision: row.get(4)?,
            comment: row.get(5)?,
            decided_at: row.get(6)?,
        })
    })?;
    rows.collect()
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

const ATTACHMENT_COLUMNS: &str = "id, company_id, request_id, uploader_id, original_name, stored_name, \
     content_type, size_bytes, sha256, created_at";

fn map_attachment(row: &Row<'_>) -> QueryResult<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        company_id: row.get(1)?,
        request_id: row.get(2)?,
        uploader_id: row.get(3)?,
        original_name: row.get(4)?,
        stored_name: row.get(5)?,
        content_type: row.get(6)?,
        size_bytes: row.get(7)?,
        sha256: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewAttachment<'a> {
    pub company_id: i64,
    pub request_id: i64,
    pub uploader_id: i64,
    pub original_name: &'a str,
    pub stored_name: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub sha256: &'a str,
}

pub fn insert_attachment(conn: &Connection, file: &NewAttachment<'_>) -> QueryResult<Attachment> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO attachments
            (company_id, request_id, uploader_id, original_name, stored_name, content_type, size_bytes, sha256, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            file.company_id,
            file.request_id,
            file.uploader_id,
            file.original_name,
            file.stored_name,
            file.content_type,
            file.size_bytes,
            file.sha256,
            now
        ],
    )?;
    Ok(Attachment {
        id: conn.last_insert_rowid(),
        company_id: file.company_id,
        request_id: file.request_id,
        uploader_id: file.uploader_id,
        original_name: file.original_name.to_string(),
        stored_name: file.stored_name.to_string(),
        content_type: file.content_type.to_string(),
        size_bytes: file.size_bytes,
        sha256: file.sha256.to_string(),
        created_at: now,
    })
}

pub fn list_attachments(
    conn: &Connection,
    company_id: i64,
    request_id: i64,
) -> QueryResult<Vec<Attachment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE company_id = ?1 AND request_id = ?2 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![company_id, request_id], map_attachment)?;
    rows.collect()
}

pub fn get_attachment(
    conn: &Connection,
    company_id: i64,
    id: i64,
) -> QueryResult<Option<Attachment>> {
    conn.query_row(
        &format!("SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_attachment,
    )
    .optional()
}

pub fn delete_attachment(conn: &Connection, company_id: i64, id: i64) -> QueryResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM attachments WHERE company_id = ?1 AND id = ?2",
        params![company_id, id],
    )?;
    Ok(deleted > 0)
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

pub fn insert_notification(
    conn: &Connection,
    company_id: i64,
    user_id: i64,
    kind: NotificationKind,
    message: &str,
    request_id: Option<i64>,
) -> QueryResult<i64> {
    conn.execute(
        "INSERT INTO notifications (company_id, user_id, kind, message, request_id, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![company_id, user_id, kind, message, request_id, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_notifications(
    conn: &Connection,
    user_id: i64,
    unread_only: bool,
    limit: i64,
) -> QueryResult<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, message, request_id, read, created_at FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR read = 0)
         ORDER BY id DESC LIMIT ?3",
    )?;
    let rows = stmt.query_map(params![user_id, unread_only, limit], |row| {
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            message: row.get(3)?,
            request_id: row.get(4)?,
            read: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;
    rows.collect()
}

pub fn mark_notification_read(conn: &Connection, user_id: i64, id: i64) -> QueryResult<bool> {
    let updated = conn.execute(
        "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
    )?;
    Ok(updated > 0)
}

pub fn mark_all_notifications_read(conn: &Connection, user_id: i64) -> QueryResult<usize> {
    conn.execute(
        "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
        params![user_id],
    )
}

pub fn unread_notification_count(conn: &Connection, user_id: i64) -> QueryResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0",
        params![user_id],
        |row| row.get(0),
    )
}

// ---------------------------------------------------------------------------
// To-do items
// ---------------------------------------------------------------------------

fn map_todo(row: &Row<'_>) -> QueryResult<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        done: row.get(3)?,
        due_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn insert_todo(
    conn: &Connection,
    user_id: i64,
    text: &str,
    due_date: Option<NaiveDate>,
) -> QueryResult<Todo> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO todos (user_id, text, done, due_date, created_at) VALUES (?1, ?2, 0, ?3, ?4)",
        params![user_id, text, due_date, now],
    )?;
    Ok(Todo {
        id: conn.last_insert_rowid(),
        user_id,
        text: text.to_string(),
        done: false,
        due_date,
        created_at: now,
    })
}

pub fn list_todos(conn: &Connection, user_id: i64) -> QueryResult<Vec<Todo>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, text, done, due_date, created_at FROM todos
         WHERE user_id = ?1 ORDER BY done, due_date IS NULL, due_date, id",
    )?;
    let rows = stmt.query_map(params![user_id], map_todo)?;
    rows.collect()
}

pub fn get_todo(conn: &Connection, user_id: i64, id: i64) -> QueryResult<Option<Todo>> {
    conn.query_row(
        "SELECT id, user_id, text, done, due_date, created_at FROM todos WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
        map_todo,
    )
    .optional()
}

pub fn save_todo(conn: &Connection, todo: &Todo) -> QueryResult<()> {
    conn.execute(
        "UPDATE todos SET text = ?1, done = ?2, due_date = ?3 WHERE user_id = ?4 AND id = ?5",
        params![todo.text, todo.done, todo.due_date, todo.user_id, todo.id],
    )?;
    Ok(())
}

pub fn delete_todo(conn: &Connection, user_id: i64, id: i64) -> QueryResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM todos WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
    )?;
    Ok(deleted > 0)
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

const EVENT_COLUMNS: &str = "id, company_id, owner_id, title, description, starts_at, ends_at";

fn map_event(row: &Row<'_>) -> QueryResult<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        company_id: row.get(1)?,
        owner_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        starts_at: row.get(5)?,
        ends_at: row.get(6)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub company_id: i64,
    pub owner_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

pub fn insert_event(conn: &Connection, event: &NewEvent<'_>) -> QueryResult<CalendarEvent> {
    conn.execute(
        "INSERT INTO calendar_events (company_id, owner_id, title, description, starts_at, ends_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.company_id,
            event.owner_id,
            event.title,
            event.description,
            event.starts_at,
            event.ends_at
        ],
    )?;
    Ok(CalendarEvent {
        id: conn.last_insert_rowid(),
        company_id: event.company_id,
        owner_id: event.owner_id,
        title: event.title.to_string(),
        description: event.description.to_string(),
        starts_at: event.starts_at,
        ends_at: event.ends_at,
    })
}

/// Events starting in `[from, to)`.
pub fn list_events(
    conn: &Connection,
    company_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> QueryResult<Vec<CalendarEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM calendar_events
         WHERE company_id = ?1 AND starts_at >= ?2 AND starts_at < ?3
         ORDER BY starts_at, id"
    ))?;
    let rows = stmt.query_map(params![company_id, from, to], map_event)?;
    rows.collect()
}

pub fn get_event(conn: &Connection, company_id: i64, id: i64) -> QueryResult<Option<CalendarEvent>> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE company_id = ?1 AND id = ?2"),
        params![company_id, id],
        map_event,
    )
    .optional()
}

pub fn delete_event(conn: &Connection, company_id: i64, id: i64) -> QueryResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM calendar_events WHERE company_id = ?1 AND id = ?2",
        params![company_id, id],
    )?;
    Ok(deleted > 0)
}
