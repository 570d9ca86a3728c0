//! Personal to-do list and the shared company calendar shown as dashboard widgets.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::database::models::{CalendarEvent, Role, Todo, UserRecord};
use crate::database::queries::{self, NewEvent};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::utils::{optional_text, required_text};

/// Window used when a calendar query gives no bounds.
const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    pub text: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoInput {
    pub text: Option<String>,
    pub done: Option<bool>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_due_date: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventRange {
    /// Resolves missing bounds against `now` and checks the window size.
    pub fn resolve(&self, now: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let from = self.from.unwrap_or(now);
        let to = match self.to {
            Some(to) => to,
            None => from
                .checked_add_signed(Duration::days(DEFAULT_WINDOW_DAYS))
                .ok_or_else(|| AppError::validation("`from` is out of range"))?,
        };
        if to <= from {
            return Err(AppError::validation("`to` must be after `from`"));
        }
        if to - from > Duration::days(MAX_WINDOW_DAYS) {
            return Err(AppError::validation(format!(
                "calendar range must not exceed {MAX_WINDOW_DAYS} days"
            )));
        }
        Ok((from, to))
    }
}

pub async fn list_todos(db: &Database, user_id: i64) -> AppResult<Vec<Todo>> {
    db.call(move |conn| Ok(queries::list_todos(conn, user_id)?)).await
}

pub async fn create_todo(db: &Database, user_id: i64, input: TodoInput) -> AppResult<Todo> {
    let text = required_text("text", &input.text, 500)?;
    db.call(move |conn| Ok(queries::insert_todo(conn, user_id, &text, input.due_date)?))
        .await
}

pub async fn update_todo(
    db: &Database,
    user_id: i64,
    todo_id: i64,
    input: UpdateTodoInput,
) -> AppResult<Todo> {
    let text = input.text.as_deref().map(|t| required_text("text", t, 500)).transpose()?;
    db.call(move |conn| {
        let mut todo = queries::get_todo(conn, user_id, todo_id)?.ok_or(AppError::NotFound("todo"))?;
        if let Some(text) = text {
            todo.text = text;
        }
        if let Some(done) = input.done {
            todo.done = done;
        }
        if input.clear_due_date {
            todo.due_date = None;
        } else if input.due_date.is_some() {
            todo.due_date = input.due_date;
        }
        queries::save_todo(conn, &todo)?;
        Ok(todo)
    })
    .await
}

pub async fn delete_todo(db: &Database, user_id: i64, todo_id: i64) -> AppResult<()> {
    let deleted = db
        .call(move |conn| Ok(queries::delete_todo(conn, user_id, todo_id)?))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("todo"));
    }
    Ok(())
}

pub async fn list_events(db: &Database, company_id: i64, range: EventRange) -> AppResult<Vec<CalendarEvent>> {
    let (from, to) = range.resolve(Utc::now())?;
    db.call(move |conn| Ok(queries::list_events(conn, company_id, from, to)?))
        .await
}

pub async fn create_event(db: &Database, user: &UserRecord, input: EventInput) -> AppResult<CalendarEvent> {
    let title = required_text("title", &input.title, 200)?;
    let description = optional_text("description", &input.description, 2000)?;
    if input.ends_at < input.starts_at {
        return Err(AppError::validation("ends_at must not precede starts_at"));
    }
    let (company_id, owner_id) = (user.company_id, user.id);
    db.call(move |conn| {
        Ok(queries::insert_event(
            conn,
            &NewEvent {
                company_id,
                owner_id,
                title: &title,
                description: &description,
                starts_at: input.starts_at,
                ends_at: input.ends_at,
            },
        )?)
    })
    .await
}

pub async fn delete_event(db: &Database, user: &UserRecord, event_id: i64) -> AppResult<()> {
    let (company_id, user_id, is_admin) = (user.company_id, user.id, user.role == Role::Admin);
    db.call(move |conn| {
        let event = queries::get_event(conn, company_id, event_id)?.ok_or(AppError::NotFound("calendar event"))?;
        if event.owner_id != user_id && !is_admin {
            return Err(AppError::forbidden("only the owner can delete this event"));
        }
        queries::delete_event(conn, company_id, event_id)?;
        Ok(())
    })
    .await
}
