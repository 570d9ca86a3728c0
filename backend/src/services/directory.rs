//! Administration of a company's users and departments.

use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use crate::auth::service::{hash_password, validate_password};
use crate::database::models::{Department, Role, User, UserRecord};
use crate::database::queries::{self, NewUser};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::utils::{normalize_email, required_text};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department_id: Option<i64>,
    #[serde(default)]
    pub clear_department: bool,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartmentInput {
    pub name: Option<String>,
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub clear_manager: bool,
}

fn ensure_department(conn: &Connection, company_id: i64, department_id: i64) -> AppResult<()> {
    if queries::get_department(conn, company_id, department_id)?.is_none() {
        return Err(AppError::validation(format!("department {department_id} does not exist")));
    }
    Ok(())
}

fn ensure_manager(conn: &Connection, company_id: i64, user_id: i64) -> AppResult<()> {
    match queries::get_user(conn, company_id, user_id)? {
        Some(user) if user.role == Role::Manager && user.active => Ok(()),
        Some(_) => Err(AppError::validation(format!(
            "user {user_id} is not an active manager"
        ))),
        None => Err(AppError::validation(format!("user {user_id} does not exist"))),
    }
}

pub async fn list_users(db: &Database, company_id: i64) -> AppResult<Vec<User>> {
    db.call(move |conn| {
        Ok(queries::list_users(conn, company_id)?
            .iter()
            .map(User::from)
            .collect())
    })
    .await
}

pub async fn get_user(db: &Database, company_id: i64, user_id: i64) -> AppResult<User> {
    db.call(move |conn| {
        queries::get_user(conn, company_id, user_id)?
            .as_ref()
            .map(User::from)
            .ok_or(AppError::NotFound("user"))
    })
    .await
}

pub async fn create_user(db: &Database, company_id: i64, input: CreateUserInput) -> AppResult<User> {
    let email = normalize_email(&input.email)?;
    let full_name = required_text("full_name", &input.full_name, 120)?;
    validate_password(&input.password)?;
    let password_hash = hash_password(&input.password)?;

    let user = db
        .transaction(move |tx| {
            if let Some(department_id) = input.department_id {
                ensure_department(tx, company_id, department_id)?;
            }
            if queries::find_user_by_email(tx, company_id, &email)?.is_some() {
                return Err(AppError::conflict(format!("a user with email {email} already exists")));
            }
            let record = queries::insert_user(
                tx,
                &NewUser {
                    company_id,
                    department_id: input.department_id,
                    email: &email,
                    full_name: &full_name,
                    password_hash: &password_hash,
                    role: input.role,
                },
            )?;
            Ok(User::from(&record))
        })
        .await?;

    info!(company_id, user_id = user.id, role = %user.role, "user created");
    Ok(user)
}

/// Applies `input` to a user. `admin` is the caller, who may not demote or deactivate themself.
pub async fn update_user(
    db: &Database,
    admin: &UserRecord,
    user_id: i64,
    input: UpdateUserInput,
) -> AppResult<User> {
    let full_name = input
        .full_name
        .as_deref()
        .map(|name| required_text("full_name", name, 120))
        .transpose()?;
    if user_id == admin.id {
        if input.role.is_some_and(|role| role != Role::Admin) {
            return Err(AppError::forbidden("administrators cannot change their own role"));
        }
        if input.active == Some(false) {
            return Err(AppError::forbidden("administrators cannot deactivate themselves"));
        }
    }
    let company_id = admin.company_id;

    let user = db
        .transaction(move |tx| {
            let mut record = queries::get_user(tx, company_id, user_id)?.ok_or(AppError::NotFound("user"))?;
            if let Some(name) = full_name {
                record.full_name = name;
            }
            if let Some(role) = input.role {
                record.role = role;
            }
            if input.clear_department {
                record.department_id = None;
            } else if let Some(department_id) = input.department_id {
                ensure_department(tx, company_id, department_id)?;
                record.department_id = Some(department_id);
            }
            if let Some(active) = input.active {
                record.active = active;
            }
            queries::save_user(tx, &record)?;
            if record.role != Role::Manager || !record.active {
                let released = queries::clear_department_manager(tx, company_id, record.id)?;
                if released > 0 {
                    info!(company_id, user_id, departments = released, "department manager unassigned");
                }
            }
            Ok(User::from(&record))
        })
        .await?;

    info!(company_id, user_id, "user updated");
    Ok(user)
}

pub async fn deactivate_user(db: &Database, admin: &UserRecord, user_id: i64) -> AppResult<User> {
    update_user(
        db,
        admin,
        user_id,
        UpdateUserInput {
            active: Some(false),
            ..UpdateUserInput::default()
        },
    )
    .await
}

pub async fn list_departments(db: &Database, company_id: i64) -> AppResult<Vec<Department>> {
    db.call(move |conn| Ok(queries::list_departments(conn, company_id)?)).await
}

pub async fn create_department(
    db: &Database,
    company_id: i64,
    input: DepartmentInput,
) -> AppResult<Department> {
    let name = required_text("name", &input.name, 120)?;
    let department = db
        .transaction(move |tx| {
            if let Some(manager_id) = input.manager_id {
                ensure_manager(tx, company_id, manager_id)?;
            }
            Ok(queries::insert_department(tx, company_id, &name, input.manager_id)?)
        })
        .await?;
    info!(company_id, department_id = department.id, "department created");
    Ok(department)
}

pub async fn update_department(
    db: &Database,
    company_id: i64,
    department_id: i64,
    input: UpdateDepartmentInput,
) -> AppResult<Department> {
    let name = input
        .name
        .as_deref()
        .map(|name| required_text("name", name, 120))
        .transpose()?;
    db.transaction(move |tx| {
        let mut department = queries::get_department(tx, company_id, department_id)?
            .ok_or(AppError::NotFound("department"))?;
        if let Some(name) = name {
            department.name = name;
        }
        if input.clear_manager {
            department.manager_id = None;
        } else if let Some(manager_id) = input.manager_id {
            ensure_manager(tx, company_id, manager_id)?;
            department.manager_id = Some(manager_id);
        }
        queries::save_department(tx, &department)?;
        Ok(department)
    })
    .await
}

pub async fn delete_department(db: &Database, company_id: i64, department_id: i64) -> AppResult<()> {
    db.transaction(move |tx| {
        if queries::get_department(tx, company_id, department_id)?.is_none() {
            return Err(AppError::NotFound("department"));
        }
        if queries::department_in_use(tx, company_id, department_id)? {
            return Err(AppError::conflict("department still has users or requests"));
        }
        queries::delete_department(tx, company_id, department_id)?;
        Ok(())
    })
    .await?;
    info!(company_id, department_id, "department deleted");
    Ok(())
}
