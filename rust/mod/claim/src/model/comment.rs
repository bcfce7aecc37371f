use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimComment {
    pub id: String,
    pub claim_id: String,
    /// Username of the writer; only they or an admin may delete it.
    pub author: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}
