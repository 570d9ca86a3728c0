//! Attachment operations on purchase requests: upload, listing, download, removal.

use tracing::info;

use super::requests::load_visible;
use super::storage::{sanitize_file_name, AttachmentStore};
use crate::database::models::{Attachment, RequestStatus, Role, UserRecord};
use crate::database::queries::{self, NewAttachment};
use crate::database::Database;
use crate::errors::{AppError, AppResult};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file received from a client, before it is stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub async fn upload(
    db: &Database,
    storage: &AttachmentStore,
    max_bytes: usize,
    user: &UserRecord,
    request_id: i64,
    upload: Upload,
) -> AppResult<Attachment> {
    let original_name = sanitize_file_name(&upload.file_name)
        .ok_or_else(|| AppError::validation("file name is missing or invalid"))?;
    if upload.bytes.is_empty() {
        return Err(AppError::validation("file is empty"));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(max_bytes));
    }
    let content_type = upload
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    // Check access before touching the disk.
    let viewer = user.clone();
    db.call(move |conn| load_visible(conn, &viewer, request_id).map(|_| ()))
        .await?;

    let stored = storage.save(user.company_id, &upload.bytes).await?;
    let owner = user.clone();
    let file = stored.clone();
    let inserted = db
        .call(move |conn| {
            // The request may have been withdrawn while the file was written.
            load_visible(conn, &owner, request_id)?;
            Ok(queries::insert_attachment(
                conn,
                &NewAttachment {
                    company_id: owner.company_id,
                    request_id,
                    uploader_id: owner.id,
                    original_name: &original_name,
                    stored_name: &file.stored_name,
                    content_type: &content_type,
                    size_bytes: file.size_bytes as i64,
                    sha256: &file.sha256,
                },
            )?)
        })
        .await;

    match inserted {
        Ok(attachment) => {
            info!(
                attachment_id = attachment.id,
                request_id,
                size_bytes = attachment.size_bytes,
                sha256 = %attachment.sha256,
                "attachment stored"
            );
            Ok(attachment)
        }
        Err(err) => {
            storage.discard(user.company_id, &stored.stored_name).await;
            Err(err)
        }
    }
}

pub async fn list(db: &Database, user: &UserRecord, request_id: i64) -> AppResult<Vec<Attachment>> {
    let user = user.clone();
    db.call(move |conn| {
        let request = load_visible(conn, &user, request_id)?;
        Ok(queries::list_attachments(conn, request.company_id, request.id)?)
    })
    .await
}

/// Loads attachment metadata the caller may see.
async fn load(db: &Database, user: &UserRecord, attachment_id: i64) -> AppResult<(Attachment, RequestStatus)> {
    let user = user.clone();
    db.call(move |conn| {
        let attachment = queries::get_attachment(conn, user.company_id, attachment_id)?
            .ok_or(AppError::NotFound("attachment"))?;
        let request = load_visible(conn, &user, attachment.request_id)
            .map_err(|_| AppError::NotFound("attachment"))?;
        Ok((attachment, request.status))
    })
    .await
}

pub async fn download(
    db: &Database,
    storage: &AttachmentStore,
    user: &UserRecord,
    attachment_id: i64,
) -> AppResult<(Attachment, Vec<u8>)> {
    let (attachment, _) = load(db, user, attachment_id).await?;
    let bytes = storage.read(attachment.company_id, &attachment.stored_name).await?;
    Ok((attachment, bytes))
}

/// Deletes an attachment. Only its uploader or an administrator may, and only while
/// the request is still awaiting approval.
pub async fn delete(
    db: &Database,
    storage: &AttachmentStore,
    user: &UserRecord,
    attachment_id: i64,
) -> AppResult<()> {
    let (attachment, status) = load(db, user, attachment_id).await?;
    if attachment.uploader_id != user.id && user.role != Role::Admin {
        return Err(AppError::forbidden("only the uploader can delete this attachment"));
    }
    if status != RequestStatus::Pending {
        return Err(AppError::conflict("attachments can only be removed while the request is pending"));
    }

    let company_id = attachment.company_id;
    db.call(move |conn| Ok(queries::delete_attachment(conn, company_id, attachment_id)?))
        .await?;
    storage.discard(attachment.company_id, &attachment.stored_name).await;
    info!(attachment_id, user_id = user.id, "attachment deleted");
    Ok(())
}
