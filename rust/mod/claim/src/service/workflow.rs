use kpidash_core::{new_id, now_rfc3339, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{ClaimStatus, ClaimWorkflow, CustomerClaim, StatusChange};
use crate::service::ClaimService;

impl ClaimService {
    /// Move a claim along its workflow and record the transition.
    pub fn change_status(
        &self,
        actor: &Principal,
        id: &str,
        change: StatusChange,
    ) -> Result<CustomerClaim, ServiceError> {
        let mut claim = self.store.fetch::<CustomerClaim>(id)?;
        let from = claim.status;
        let to = change.status;
        if !from.can_move_to(to) {
            return Err(ServiceError::Validation(format!(
                "claim {} cannot move from {} to {}",
                claim.claim_number,
                from.as_str(),
                to.as_str()
            )));
        }

        let now = now_rfc3339();
        claim.status = to;
        claim.closed_at = (to == ClaimStatus::Closed).then(|| now.clone());
        claim.updated_at = now.clone();
        if !self.store.save(&claim)? {
            return Err(ServiceError::not_found("claim", id));
        }

        let note = change.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.store.create(&ClaimWorkflow {
            id: new_id(),
            claim_id: claim.id.clone(),
            from_status: Some(from),
            to_status: to,
            changed_by: actor.username.clone(),
            note,
            created_at: now,
        })?;
        self.activity.record(
            actor,
            Action::StatusChange,
            "claim",
            id,
            Some(serde_json::json!({ "from": from, "to": to })),
        );
        Ok(claim)
    }

    /// Transitions of a claim, oldest first.
    pub fn claim_workflow(&self, id: &str) -> Result<Vec<ClaimWorkflow>, ServiceError> {
        self.store.fetch::<CustomerClaim>(id)?;
        let query = Query::new()
            .filter(Filter::eq("claim_id", id))
            .order_by("created_at", false);
        let (items, _) = self.store.query::<ClaimWorkflow>(&query)?;
        Ok(items)
    }
}
