use kpidash_core::{new_id, now_rfc3339, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{ClaimComment, CommentInput, CustomerClaim};
use crate::service::ClaimService;

impl ClaimService {
    /// Comments on a claim, oldest first.
    pub fn list_comments(&self, claim_id: &str) -> Result<Vec<ClaimComment>, ServiceError> {
        self.store.fetch::<CustomerClaim>(claim_id)?;
        let query = Query::new()
            .filter(Filter::eq("claim_id", claim_id))
            .order_by("created_at", false);
        let (items, _) = self.store.query::<ClaimComment>(&query)?;
        Ok(items)
    }

    pub fn add_comment(
        &self,
        actor: &Principal,
        claim_id: &str,
        input: CommentInput,
    ) -> Result<ClaimComment, ServiceError> {
        let claim = self.store.fetch::<CustomerClaim>(claim_id)?;
        let text = input.text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation("comment text is required".into()));
        }

        let comment = ClaimComment {
            id: new_id(),
            claim_id: claim.id,
            author: actor.username.clone(),
            text: text.to_string(),
            created_at: now_rfc3339(),
        };
        self.store.create(&comment)?;
        self.activity.record(
            actor,
            Action::Comment,
            "claim",
            &comment.claim_id,
            Some(serde_json::json!({ "comment_id": comment.id })),
        );
        Ok(comment)
    }

    /// Only the author or an admin may delete a comment.
    pub fn delete_comment(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        let comment = self.store.fetch::<ClaimComment>(id)?;
        if comment.author != actor.username && !actor.is_admin() {
            return Err(ServiceError::PermissionDenied(
                "only the author or an administrator can delete this comment".into(),
            ));
        }
        if !self.store.remove::<ClaimComment>(id)? {
            return Err(ServiceError::not_found("comment", id));
        }
        self.activity.record(
            actor,
            Action::Delete,
            "claim_comment",
            id,
            Some(serde_json::json!({ "claim_id": comment.claim_id })),
        );
        Ok(())
    }
}
