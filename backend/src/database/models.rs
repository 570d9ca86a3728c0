//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from SQLite. Enumerations are stored as their uppercase wire strings, which are
//! also what the JSON API exposes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Declares a string-backed enum that round-trips through SQLite TEXT columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} `{}`", stringify!($name), other)),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse().map_err(|err: String| FromSqlError::Other(err.into()))
            }
        }
    };
}

text_enum!(
    /// Role of a user inside their company.
    Role {
        Admin => "ADMIN",
        User => "USER",
        Manager => "MANAGER",
        It => "IT",
        Finance => "FINANCE",
        Purchasing => "PURCHASING",
    }
);

text_enum!(
    RequestStatus {
        Pending => "BEKLEMEDE",
        Approved => "ONAYLANDI",
        Rejected => "REDDEDILDI",
        InPurchasing => "SATINALMA_SURECINDE",
        Completed => "TAMAMLANDI",
    }
);

text_enum!(
    /// Position of a request in the fixed approval chain.
    ApprovalStep {
        DepartmentManager => "DEPARTMENT_MANAGER",
        It => "IT",
        Finance => "FINANCE",
        Purchasing => "PURCHASING",
    }
);

text_enum!(
    Priority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
);

text_enum!(
    /// Outcome recorded in the approval history.
    Decision {
        Approved => "APPROVED",
        Rejected => "REJECTED",
        PurchaseStarted => "PURCHASE_STARTED",
        Completed => "COMPLETED",
    }
);

text_enum!(
    NotificationKind {
        ApprovalRequired => "APPROVAL_REQUIRED",
        RequestAdvanced => "REQUEST_ADVANCED",
        RequestApproved => "REQUEST_APPROVED",
        RequestRejected => "REQUEST_REJECTED",
        PurchaseStarted => "PURCHASE_STARTED",
        RequestCompleted => "REQUEST_COMPLETED",
    }
);

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub manager_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A user row, including the password hash. Never serialized directly.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub company_id: i64,
    pub department_id: Option<i64>,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub company_id: i64,
    pub department_id: Option<i64>,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub active: bool,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            company_id: record.company_id,
            department_id: record.department_id,
            email: record.email.clone(),
            full_name: record.full_name.clone(),
            role: record.role,
            active: record.active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub unit_price_cents: i64,
    pub currency: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRequest {
    pub id: i64,
    pub company_id: i64,
    pub requester_id: i64,
    pub department_id: i64,
    pub title: String,
    pub description: String,
    pub justification: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub current_step: Option<ApprovalStep>,
    pub total_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestItem {
    pub id: i64,
    pub request_id: i64,
    pub product_id: Option<i64>,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl RequestItem {
    pub fn line_total_cents(&self) -> i64 {
        self.quantity * self.unit_price_cents
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Approval {
    pub id: i64,
    pub request_id: i64,
    pub step: ApprovalStep,
    pub approver_id: i64,
    pub decision: Decision,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub id: i64,
    pub company_id: i64,
    pub request_id: i64,
    pub uploader_id: i64,
    pub original_name: String,
    #[serde(skip)]
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub request_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub done: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub company_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}
