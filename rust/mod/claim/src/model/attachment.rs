use serde::{Deserialize, Serialize};

/// Metadata of a file attached to a claim. The bytes live in the blob store
/// under [`ClaimAttachment::blob_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimAttachment {
    pub id: String,
    pub claim_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    pub created_at: String,
}

impl ClaimAttachment {
    pub fn blob_key(&self) -> String {
        attachment_key(&self.claim_id, &self.id)
    }
}

pub fn attachment_key(claim_id: &str, attachment_id: &str) -> String {
    format!("{}{}", claim_blob_prefix(claim_id), attachment_id)
}

pub fn claim_blob_prefix(claim_id: &str) -> String {
    format!("claims/{}/", claim_id)
}
