use kpidash_core::{new_id, now_rfc3339, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{attachment_key, ClaimAttachment, CustomerClaim};
use crate::service::{ClaimService, MAX_ATTACHMENT_BYTES};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Last path segment of a client-supplied file name.
fn clean_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    (!base.is_empty() && base != "." && base != "..").then(|| base.to_string())
}

impl ClaimService {
    pub fn list_attachments(&self, claim_id: &str) -> Result<Vec<ClaimAttachment>, ServiceError> {
        self.store.fetch::<CustomerClaim>(claim_id)?;
        let query = Query::new()
            .filter(Filter::eq("claim_id", claim_id))
            .order_by("created_at", false);
        let (items, _) = self.store.query::<ClaimAttachment>(&query)?;
        Ok(items)
    }

    /// Store `bytes` in the blob store and record the attachment.
    pub fn add_attachment(
        &self,
        actor: &Principal,
        claim_id: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ClaimAttachment, ServiceError> {
        let claim = self.store.fetch::<CustomerClaim>(claim_id)?;
        let file_name = clean_file_name(file_name)
            .ok_or_else(|| ServiceError::Validation("file name is required".into()))?;
        if bytes.is_empty() {
            return Err(ServiceError::Validation("attachment is empty".into()));
        }
        if bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(ServiceError::Validation(format!(
                "attachment is {} bytes; the limit is {}",
                bytes.len(),
                MAX_ATTACHMENT_BYTES
            )));
        }

        let attachment = ClaimAttachment {
            id: new_id(),
            claim_id: claim.id,
            file_name,
            content_type: content_type
                .map(str::trim)
                .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii() && !ch.is_ascii_control()))
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
            size: bytes.len() as u64,
            uploaded_by: actor.username.clone(),
            created_at: now_rfc3339(),
        };

        self.blobs.put(&attachment.blob_key(), bytes)?;
        if let Err(e) = self.store.create(&attachment) {
            if let Err(cleanup) = self.blobs.delete(&attachment.blob_key()) {
                tracing::warn!(key = %attachment.blob_key(), error = %cleanup, "orphaned attachment blob");
            }
            return Err(e.into());
        }

        tracing::info!(claim = %attachment.claim_id, file = %attachment.file_name, size = attachment.size, "attachment stored");
        self.activity.record(
            actor,
            Action::Upload,
            "claim",
            &attachment.claim_id,
            Some(serde_json::json!({ "attachment_id": attachment.id, "file_name": attachment.file_name })),
        );
        Ok(attachment)
    }

    /// Attachment metadata together with its bytes.
    pub fn attachment_content(&self, id: &str) -> Result<(ClaimAttachment, Vec<u8>), ServiceError> {
        let attachment = self.store.fetch::<ClaimAttachment>(id)?;
        let bytes = self
            .blobs
            .get(&attachment_key(&attachment.claim_id, &attachment.id))?
            .ok_or_else(|| {
                tracing::error!(attachment = id, "attachment blob missing");
                ServiceError::not_found("attachment content", id)
            })?;
        Ok((attachment, bytes))
    }

    pub fn delete_attachment(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        let attachment = self.store.fetch::<ClaimAttachment>(id)?;
        if !self.store.remove::<ClaimAttachment>(id)? {
            return Err(ServiceError::not_found("attachment", id));
        }
        self.blobs.delete(&attachment.blob_key())?;
        self.activity.record(
            actor,
            Action::Delete,
            "claim_attachment",
            id,
            Some(serde_json::json!({ "claim_id": attachment.claim_id })),
        );
        Ok(())
    }
}
