use kpidash_core::{
    department_or_default, merge_patch, new_id, now_rfc3339, ListResult, Principal, ServiceError,
    MAX_LIST_LIMIT,
};
use kpidash_store::{Action, Filter, Query, RecordStoreExt, StoreError, Value};

use crate::model::{ProductionStation, StationDataEntry, StationInput, StationKpi, StationQuery};
use crate::service::StationService;

fn code_conflict(code: &str) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |e| match ServiceError::from(e) {
        ServiceError::Conflict(_) => ServiceError::Conflict(format!("station code '{}' already exists", code)),
        other => other,
    }
}

fn check_station(station: &ProductionStation) -> Result<(), ServiceError> {
    if station.code.is_empty() {
        return Err(ServiceError::Validation("station code is required".into()));
    }
    if station.name.trim().is_empty() {
        return Err(ServiceError::Validation("station name is required".into()));
    }
    Ok(())
}

impl StationService {
    pub fn list_stations(&self, params: &StationQuery) -> Result<ListResult<ProductionStation>, ServiceError> {
        let mut query = Query::new()
            .eq_opt("department", params.department.as_deref())
            .order_by("code", false)
            .page(params.limit.clamp(1, MAX_LIST_LIMIT), params.offset);
        if let Some(active) = params.active {
            query = query.filter(Filter::eq("active", Value::bool(active)));
        }
        let (items, total) = self.store.query::<ProductionStation>(&query)?;
        Ok(ListResult { items, total })
    }

    pub fn get_station(&self, id: &str) -> Result<ProductionStation, ServiceError> {
        self.store.fetch::<ProductionStation>(id)
    }

    pub fn create_station(&self, actor: &Principal, input: StationInput) -> Result<ProductionStation, ServiceError> {
        let now = now_rfc3339();
        let station = ProductionStation {
            id: new_id(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            department: department_or_default(input.department.as_deref(), &self.config.default_department),
            description: input.description.filter(|d| !d.trim().is_empty()),
            active: input.active.unwrap_or(true),
            created_at: now.clone(),
            updated_at: now,
        };
        check_station(&station)?;

        self.store.create(&station).map_err(code_conflict(&station.code))?;
        self.activity.record(
            actor,
            Action::Create,
            "station",
            &station.id,
            Some(serde_json::json!({ "code": station.code })),
        );
        Ok(station)
    }

    pub fn update_station(
        &self,
        actor: &Principal,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<ProductionStation, ServiceError> {
        let current = self.store.fetch::<ProductionStation>(id)?;

        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());
        if base.get("department").is_none() {
            base["department"] = serde_json::json!("");
        }

        let mut station: ProductionStation = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid station: {}", e)))?;
        station.code = station.code.trim().to_string();
        station.name = station.name.trim().to_string();
        station.department = department_or_default(Some(&station.department), &self.config.default_department);
        check_station(&station)?;

        if !self.store.save(&station).map_err(code_conflict(&station.code))? {
            return Err(ServiceError::not_found("station", id));
        }
        let action = if current.active != station.active {
            Action::Toggle
        } else {
            Action::Update
        };
        self.activity.record(actor, action, "station", id, Some(serde_json::json!({ "code": station.code })));
        Ok(station)
    }

    /// Delete a station together with its entries and KPIs.
    pub fn delete_station(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        let station = self.get_station(id)?;
        let by_station = [Filter::eq("station_id", id)];
        let entries = self.store.remove_where::<StationDataEntry>(&by_station)?;
        let kpis = self.store.remove_where::<StationKpi>(&by_station)?;
        if !self.store.remove::<ProductionStation>(id)? {
            return Err(ServiceError::not_found("station", id));
        }
        tracing::info!(code = %station.code, entries, kpis, "station deleted");
        self.activity.record(
            actor,
            Action::Delete,
            "station",
            id,
            Some(serde_json::json!({ "code": station.code, "entries": entries, "kpis": kpis })),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::EntryInput;
    use crate::service::testing::{memory_service, operator, sqlite_service, station_input};

    #[test]
    fn codes_are_unique() {
        for svc in [memory_service(), sqlite_service()] {
            let a = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            let b = svc.create_station(&operator(), station_input("PRS-02")).unwrap();
            assert!(matches!(
                svc.create_station(&operator(), station_input(" PRS-01 ")),
                Err(ServiceError::Conflict(_))
            ));
            assert!(matches!(
                svc.update_station(&operator(), &b.id, json!({"code": "PRS-01"})),
                Err(ServiceError::Conflict(_))
            ));
            assert_eq!(svc.get_station(&a.id).unwrap().code, "PRS-01");
        }
    }

    #[test]
    fn list_filters_by_active_flag() {
        for svc in [memory_service(), sqlite_service()] {
            let a = svc.create_station(&operator(), station_input("PRS-02")).unwrap();
            svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            svc.update_station(&operator(), &a.id, json!({"active": false})).unwrap();

            let all = svc.list_stations(&StationQuery::default()).unwrap();
            let codes: Vec<_> = all.items.iter().map(|s| s.code.as_str()).collect();
            assert_eq!(codes, vec!["PRS-01", "PRS-02"]);

            let active = StationQuery {
                active: Some(true),
                ..StationQuery::default()
            };
            let result = svc.list_stations(&active).unwrap();
            assert_eq!(result.total, 1);
            assert_eq!(result.items[0].code, "PRS-01");
        }
    }

    #[test]
    fn required_fields() {
        let svc = memory_service();
        let mut input = station_input(" ");
        assert!(matches!(svc.create_station(&operator(), input.clone()), Err(ServiceError::Validation(_))));
        input.code = "PRS-01".into();
        input.name = "".into();
        assert!(matches!(svc.create_station(&operator(), input), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn delete_cascades() {
        for svc in [memory_service(), sqlite_service()] {
            let keep = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            let gone = svc.create_station(&operator(), station_input("PRS-02")).unwrap();
            for station in [&keep, &gone] {
                let entry = EntryInput {
                    date: Some("2024-05-01".into()),
                    shift: None,
                    produced: 100,
                    defects: 1,
                    downtime_minutes: 10,
                    planned_minutes: 480,
                    notes: None,
                };
                svc.create_entry(&operator(), &station.id, entry).unwrap();
            }

            svc.delete_station(&operator(), &gone.id).unwrap();
            assert!(matches!(svc.get_station(&gone.id), Err(ServiceError::NotFound(_))));
            assert_eq!(svc.list_entries(&keep.id, &Default::default()).unwrap().len(), 1);
            assert_eq!(
                svc.store.count_where::<StationDataEntry>(&[Filter::eq("station_id", gone.id.as_str())]).unwrap(),
                0
            );
        }
    }
}
