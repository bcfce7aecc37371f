use std::collections::BTreeMap;

use kpidash_core::{
    department_or_default, merge_patch, new_id, now_rfc3339, parse_date, percentage, today,
    ListResult, Principal, ServiceError, MAX_LIST_LIMIT,
};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{CategorySummary, KpiData, KpiInput, KpiQuery};
use crate::service::KpiService;

fn check_kpi(kpi: &KpiData) -> Result<(), ServiceError> {
    if kpi.name.trim().is_empty() {
        return Err(ServiceError::Validation("KPI name is required".into()));
    }
    if !kpi.value.is_finite() || !kpi.target.is_finite() {
        return Err(ServiceError::Validation("value and target must be numbers".into()));
    }
    parse_date("period", &kpi.period)?;
    Ok(())
}

impl KpiService {
    fn kpi_query(&self, params: &KpiQuery) -> Result<Query, ServiceError> {
        let mut query = Query::new()
            .eq_opt("department", params.department.as_deref())
            .eq_opt("category", params.category.map(|c| c.as_str()))
            .order_by("period", true);
        if let Some(from) = params.from.as_deref() {
            parse_date("from", from)?;
            query = query.filter(Filter::gte("period", from.trim()));
        }
        if let Some(to) = params.to.as_deref() {
            parse_date("to", to)?;
            query = query.filter(Filter::lte("period", to.trim()));
        }
        Ok(query)
    }

    pub fn list_kpis(&self, params: &KpiQuery) -> Result<ListResult<KpiData>, ServiceError> {
        let query = self
            .kpi_query(params)?
            .page(params.limit.clamp(1, MAX_LIST_LIMIT), params.offset);
        let (items, total) = self.store.query::<KpiData>(&query)?;
        Ok(ListResult { items, total })
    }

    pub fn get_kpi(&self, id: &str) -> Result<KpiData, ServiceError> {
        self.store.fetch::<KpiData>(id)
    }

    pub fn create_kpi(&self, actor: &Principal, input: KpiInput) -> Result<KpiData, ServiceError> {
        let now = now_rfc3339();
        let kpi = KpiData {
            id: new_id(),
            department: department_or_default(input.department.as_deref(), &self.config.default_department),
            category: input.category,
            name: input.name.trim().to_string(),
            percentage: percentage(input.value, input.target),
            value: input.value,
            target: input.target,
            unit: input.unit.filter(|u| !u.trim().is_empty()),
            period: input.period.map(|p| p.trim().to_string()).unwrap_or_else(today),
            metadata: input.metadata,
            created_by: actor.username.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        check_kpi(&kpi)?;

        self.store.create(&kpi)?;
        self.activity.record(
            actor,
            Action::Create,
            "kpi",
            &kpi.id,
            Some(serde_json::json!({ "name": kpi.name, "department": kpi.department })),
        );
        Ok(kpi)
    }

    /// Merge-patch a KPI; the percentage always follows value and target.
    pub fn update_kpi(&self, actor: &Principal, id: &str, patch: serde_json::Value) -> Result<KpiData, ServiceError> {
        let current = self.store.fetch::<KpiData>(id)?;

        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["created_by"] = serde_json::json!(current.created_by);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());
        if base.get("period").is_none() {
            base["period"] = serde_json::json!(current.period);
        }
        if base.get("department").is_none() {
            base["department"] = serde_json::json!("");
        }

        let mut kpi: KpiData = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid KPI: {}", e)))?;
        kpi.department = department_or_default(Some(&kpi.department), &self.config.default_department);
        kpi.percentage = percentage(kpi.value, kpi.target);
        check_kpi(&kpi)?;

        if !self.store.save(&kpi)? {
            return Err(ServiceError::not_found("kpi", id));
        }
        self.activity.record(
            actor,
            Action::Update,
            "kpi",
            id,
            Some(serde_json::json!({ "value": kpi.value, "percentage": kpi.percentage })),
        );
        Ok(kpi)
    }

    pub fn delete_kpi(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove::<KpiData>(id)? {
            return Err(ServiceError::not_found("kpi", id));
        }
        let unlinked = self.unlink_actions(id)?;
        self.activity.record(
            actor,
            Action::Delete,
            "kpi",
            id,
            (unlinked > 0).then(|| serde_json::json!({ "unlinked_actions": unlinked })),
        );
        Ok(())
    }

    /// Count and average percentage per category over the matching KPIs.
    /// Categories without entries are reported with zeros.
    pub fn kpi_summary(&self, params: &KpiQuery) -> Result<Vec<CategorySummary>, ServiceError> {
        let (items, _) = self.store.query::<KpiData>(&self.kpi_query(params)?)?;

        let mut sums: BTreeMap<_, (usize, f64)> = BTreeMap::new();
        for kpi in &items {
            let entry = sums.entry(kpi.category).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += kpi.percentage;
        }

        Ok(crate::model::KpiCategory::ALL
            .iter()
            .filter(|c| params.category.map_or(true, |wanted| wanted == **c))
            .map(|c| {
                let (count, total) = sums.get(c).copied().unwrap_or((0, 0.0));
                CategorySummary {
                    category: *c,
                    count,
                    average_percentage: if count > 0 { total / count as f64 } else { 0.0 },
                }
            })
            .collect())
    }
}
