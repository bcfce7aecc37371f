use chrono::Datelike;
use kpidash_core::{
    department_or_default, merge_patch, new_id, now_rfc3339, parse_date, today, ListResult,
    Principal, ServiceError, MAX_LIST_LIMIT,
};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{
    claim_blob_prefix, ClaimAttachment, ClaimComment, ClaimInput, ClaimQuery, ClaimStats,
    ClaimStatus, ClaimWorkflow, CustomerClaim, Severity,
};
use crate::service::ClaimService;

/// Attempts at picking a free claim number when creates race.
const NUMBER_ATTEMPTS: usize = 3;

/// Claim numbers are four digits, so each year holds at most this many claims.
const MAX_CLAIMS_PER_YEAR: u32 = 9999;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn check_claim(claim: &CustomerClaim) -> Result<(), ServiceError> {
    if claim.customer.trim().is_empty() {
        return Err(ServiceError::Validation("customer is required".into()));
    }
    if claim.title.trim().is_empty() {
        return Err(ServiceError::Validation("claim title is required".into()));
    }
    parse_date("received_date", &claim.received_date)?;
    Ok(())
}

impl ClaimService {
    /// Next free `CLM-{year}-NNNN` number.
    fn next_claim_number(&self, year: i32) -> Result<String, ServiceError> {
        let prefix = format!("CLM-{}-", year);
        let query = Query::new()
            .filter(Filter::gte("claim_number", prefix.as_str()))
            .filter(Filter::lte("claim_number", format!("{}9999", prefix)))
            .order_by("claim_number", true)
            .page(1, 0);
        let (latest, _) = self.store.query::<CustomerClaim>(&query)?;
        let last = latest
            .first()
            .and_then(|c| c.claim_number.strip_prefix(&prefix))
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0);
        if last >= MAX_CLAIMS_PER_YEAR {
            return Err(ServiceError::Validation(format!(
                "claim numbers for {} are exhausted ({} per year)",
                year, MAX_CLAIMS_PER_YEAR
            )));
        }
        Ok(format!("{}{:04}", prefix, last + 1))
    }

    pub fn list_claims(&self, params: &ClaimQuery) -> Result<ListResult<CustomerClaim>, ServiceError> {
        let query = Query::new()
            .eq_opt("status", params.status.map(|s| s.as_str()))
            .eq_opt("department", params.department.as_deref())
            .eq_opt("severity", params.severity.map(|s| s.as_str()))
            .page(params.limit.clamp(1, MAX_LIST_LIMIT), params.offset);
        let (items, total) = self.store.query::<CustomerClaim>(&query)?;
        Ok(ListResult { items, total })
    }

    pub fn get_claim(&self, id: &str) -> Result<CustomerClaim, ServiceError> {
        self.store.fetch::<CustomerClaim>(id)
    }

    pub fn create_claim(&self, actor: &Principal, input: ClaimInput) -> Result<CustomerClaim, ServiceError> {
        let now = now_rfc3339();
        let mut claim = CustomerClaim {
            id: new_id(),
            claim_number: String::new(),
            customer: input.customer.trim().to_string(),
            product_code: blank_to_none(input.product_code),
            title: input.title.trim().to_string(),
            description: blank_to_none(input.description),
            department: department_or_default(input.department.as_deref(), &self.config.default_department),
            severity: input.severity.unwrap_or_default(),
            status: ClaimStatus::Open,
            assigned_to: blank_to_none(input.assigned_to),
            received_date: blank_to_none(input.received_date).unwrap_or_else(today),
            closed_at: None,
            created_by: actor.username.clone(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        check_claim(&claim)?;

        let year = chrono::Utc::now().year();
        let mut attempt = 0;
        loop {
            attempt += 1;
            claim.claim_number = self.next_claim_number(year)?;
            match self.store.create(&claim).map_err(ServiceError::from) {
                Ok(()) => break,
                Err(ServiceError::Conflict(msg)) if attempt < NUMBER_ATTEMPTS => {
                    tracing::debug!(number = %claim.claim_number, %msg, "claim number taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.create(&ClaimWorkflow {
            id: new_id(),
            claim_id: claim.id.clone(),
            from_status: None,
            to_status: ClaimStatus::Open,
            changed_by: actor.username.clone(),
            note: None,
            created_at: now,
        })?;
        tracing::info!(number = %claim.claim_number, customer = %claim.customer, "claim opened");
        self.activity.record(
            actor,
            Action::Create,
            "claim",
            &claim.id,
            Some(serde_json::json!({ "claim_number": claim.claim_number })),
        );
        Ok(claim)
    }

    /// Merge-patch the descriptive fields. Status moves go through
    /// [`ClaimService::change_status`].
    pub fn update_claim(
        &self,
        actor: &Principal,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<CustomerClaim, ServiceError> {
        let current = self.store.fetch::<CustomerClaim>(id)?;
        if let Some(status) = patch.get("status") {
            if *status != serde_json::json!(current.status) {
                return Err(ServiceError::Validation(
                    "status cannot be changed here; use the status endpoint".into(),
                ));
            }
        }

        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["claim_number"] = serde_json::json!(current.claim_number);
        base["status"] = serde_json::json!(current.status);
        base["closed_at"] = serde_json::json!(current.closed_at);
        base["created_by"] = serde_json::json!(current.created_by);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());
        if base.get("department").is_none() {
            base["department"] = serde_json::json!("");
        }
        if base.get("received_date").is_none() {
            base["received_date"] = serde_json::json!(current.received_date);
        }

        let mut claim: CustomerClaim = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid claim: {}", e)))?;
        claim.customer = claim.customer.trim().to_string();
        claim.title = claim.title.trim().to_string();
        claim.department = department_or_default(Some(&claim.department), &self.config.default_department);
        claim.assigned_to = blank_to_none(claim.assigned_to);
        check_claim(&claim)?;

        if !self.store.save(&claim)? {
            return Err(ServiceError::not_found("claim", id));
        }
        self.activity.record(actor, Action::Update, "claim", id, None);
        Ok(claim)
    }

    /// Delete a claim with its workflow rows, comments, attachments and
    /// attachment bytes.
    pub fn delete_claim(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        let claim = self.get_claim(id)?;
        let by_claim = [Filter::eq("claim_id", id)];
        self.store.remove_where::<ClaimWorkflow>(&by_claim)?;
        let comments = self.store.remove_where::<ClaimComment>(&by_claim)?;
        let attachments = self.store.remove_where::<ClaimAttachment>(&by_claim)?;
        let blobs = self.blobs.delete_prefix(&claim_blob_prefix(id))?;
        if !self.store.remove::<CustomerClaim>(id)? {
            return Err(ServiceError::not_found("claim", id));
        }
        tracing::info!(number = %claim.claim_number, comments, attachments, blobs, "claim deleted");
        self.activity.record(
            actor,
            Action::Delete,
            "claim",
            id,
            Some(serde_json::json!({ "claim_number": claim.claim_number })),
        );
        Ok(())
    }

    /// Claim counts by status and severity, optionally for one department.
    pub fn claim_stats(&self, department: Option<&str>) -> Result<ClaimStats, ServiceError> {
        let scoped = |column: &'static str, value: &'static str| {
            let mut filters = vec![Filter::eq(column, value)];
            if let Some(d) = department {
                filters.push(Filter::eq("department", d));
            }
            filters
        };

        let mut stats = ClaimStats::default();
        for status in ClaimStatus::ALL {
            let n = self.store.count_where::<CustomerClaim>(&scoped("status", status.as_str()))?;
            stats.by_status.insert(status.as_str().to_string(), n);
            stats.total += n;
        }
        for severity in Severity::ALL {
            let n = self.store.count_where::<CustomerClaim>(&scoped("severity", severity.as_str()))?;
            stats.by_severity.insert(severity.as_str().to_string(), n);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::StatusChange;
    use crate::service::testing::{admin, claim_input, engineer, memory_service, sqlite_service};

    #[test]
    fn created_claim_is_listed() {
        for svc in [memory_service(), sqlite_service()] {
            let claim = svc.create_claim(&engineer(), claim_input("Ford Otosan")).unwrap();
            assert_eq!(claim.status, ClaimStatus::Open);
            assert_eq!(claim.severity, Severity::Medium);
            assert_eq!(claim.created_by, "zeynep");

            let listed = svc.list_claims(&ClaimQuery::default()).unwrap();
            assert_eq!(listed.total, 1);
            assert_eq!(listed.items[0], claim);
        }
    }

    #[test]
    fn numbers_are_sequential() {
        for svc in [memory_service(), sqlite_service()] {
            let year = chrono::Utc::now().year();
            let numbers: Vec<_> = (0..3)
                .map(|_| svc.create_claim(&engineer(), claim_input("Tofaş")).unwrap().claim_number)
                .collect();
            assert_eq!(
                numbers,
                (1..=3).map(|n| format!("CLM-{}-{:04}", year, n)).collect::<Vec<_>>()
            );

            // Numbering continues after the highest number in use.
            let first = svc.list_claims(&ClaimQuery::default()).unwrap().items;
            let oldest = first.iter().find(|c| c.claim_number == numbers[0]).unwrap();
            svc.delete_claim(&admin(), &oldest.id).unwrap();
            let next = svc.create_claim(&engineer(), claim_input("Tofaş")).unwrap();
            assert_eq!(next.claim_number, format!("CLM-{}-0004", year));
        }
    }

    #[test]
    fn numbers_stop_at_four_digits() {
        for svc in [memory_service(), sqlite_service()] {
            let year = chrono::Utc::now().year();
            let mut claim = svc.create_claim(&engineer(), claim_input("Tofaş")).unwrap();
            claim.claim_number = format!("CLM-{}-9998", year);
            svc.store.save(&claim).unwrap();

            let last = svc.create_claim(&engineer(), claim_input("Tofaş")).unwrap();
            assert_eq!(last.claim_number, format!("CLM-{}-9999", year));
            assert!(matches!(
                svc.create_claim(&engineer(), claim_input("Tofaş")),
                Err(ServiceError::Validation(_))
            ));
            assert_eq!(svc.list_claims(&ClaimQuery::default()).unwrap().total, 2);
        }
    }

    #[test]
    fn update_cannot_change_status() {
        let svc = memory_service();
        let claim = svc.create_claim(&engineer(), claim_input("Arçelik")).unwrap();

        assert!(matches!(
            svc.update_claim(&engineer(), &claim.id, json!({"status": "closed"})),
            Err(ServiceError::Validation(_))
        ));

        let updated = svc
            .update_claim(
                &engineer(),
                &claim.id,
                json!({"status": "open", "severity": "critical", "claim_number": "X", "department": ""}),
            )
            .unwrap();
        assert_eq!(updated.severity, Severity::Critical);
        assert_eq!(updated.claim_number, claim.claim_number);
        assert_eq!(updated.department, "Genel");
    }

    #[test]
    fn filters_and_stats() {
        for svc in [memory_service(), sqlite_service()] {
            let a = svc.create_claim(&engineer(), claim_input("A")).unwrap();
            let mut high = claim_input("B");
            high.severity = Some(Severity::High);
            svc.create_claim(&engineer(), high).unwrap();
            let mut other = claim_input("C");
            other.department = Some("Lojistik".into());
            svc.create_claim(&engineer(), other).unwrap();
            svc.change_status(
                &engineer(),
                &a.id,
                StatusChange {
                    status: ClaimStatus::Investigating,
                    note: None,
                },
            )
            .unwrap();

            let investigating = ClaimQuery {
                status: Some(ClaimStatus::Investigating),
                ..ClaimQuery::default()
            };
            assert_eq!(svc.list_claims(&investigating).unwrap().total, 1);
            let high = ClaimQuery {
                severity: Some(Severity::High),
                ..ClaimQuery::default()
            };
            assert_eq!(svc.list_claims(&high).unwrap().total, 1);

            let stats = svc.claim_stats(None).unwrap();
            assert_eq!(stats.total, 3);
            assert_eq!(stats.by_status["open"], 2);
            assert_eq!(stats.by_status["investigating"], 1);
            assert_eq!(stats.by_status["closed"], 0);
            assert_eq!(stats.by_severity["medium"], 2);

            let kalite = svc.claim_stats(Some("Kalite")).unwrap();
            assert_eq!(kalite.total, 2);
        }
    }

    #[test]
    fn required_fields() {
        let svc = memory_service();
        let mut input = claim_input(" ");
        assert!(matches!(svc.create_claim(&engineer(), input.clone()), Err(ServiceError::Validation(_))));
        input.customer = "A".into();
        input.received_date = Some("6 Mayıs".into());
        assert!(matches!(svc.create_claim(&engineer(), input), Err(ServiceError::Validation(_))));
    }
}
