use kpidash_core::{merge_patch, new_id, now_rfc3339, parse_date, percentage, today, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{ProductionStation, StationKpi, StationKpiInput};
use crate::service::StationService;

fn check_kpi(kpi: &StationKpi) -> Result<(), ServiceError> {
    if kpi.name.trim().is_empty() {
        return Err(ServiceError::Validation("KPI name is required".into()));
    }
    if !kpi.value.is_finite() || !kpi.target.is_finite() {
        return Err(ServiceError::Validation("value and target must be numbers".into()));
    }
    parse_date("period", &kpi.period)?;
    Ok(())
}

impl StationService {
    pub fn list_station_kpis(&self, station_id: &str) -> Result<Vec<StationKpi>, ServiceError> {
        self.store.fetch::<ProductionStation>(station_id)?;
        let query = Query::new()
            .filter(Filter::eq("station_id", station_id))
            .order_by("period", true);
        let (items, _) = self.store.query::<StationKpi>(&query)?;
        Ok(items)
    }

    pub fn create_station_kpi(
        &self,
        actor: &Principal,
        station_id: &str,
        input: StationKpiInput,
    ) -> Result<StationKpi, ServiceError> {
        let station = self.store.fetch::<ProductionStation>(station_id)?;
        let now = now_rfc3339();
        let kpi = StationKpi {
            id: new_id(),
            station_id: station.id,
            name: input.name.trim().to_string(),
            percentage: percentage(input.value, input.target),
            value: input.value,
            target: input.target,
            unit: input.unit.filter(|u| !u.trim().is_empty()),
            period: input.period.map(|p| p.trim().to_string()).unwrap_or_else(today),
            created_at: now.clone(),
            updated_at: now,
        };
        check_kpi(&kpi)?;

        self.store.create(&kpi)?;
        self.activity.record(
            actor,
            Action::Create,
            "station_kpi",
            &kpi.id,
            Some(serde_json::json!({ "station": station.code, "name": kpi.name })),
        );
        Ok(kpi)
    }

    pub fn update_station_kpi(
        &self,
        actor: &Principal,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<StationKpi, ServiceError> {
        let current = self.store.fetch::<StationKpi>(id)?;

        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["station_id"] = serde_json::json!(current.station_id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());
        if base.get("period").is_none() {
            base["period"] = serde_json::json!(current.period);
        }

        let mut kpi: StationKpi = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid KPI: {}", e)))?;
        kpi.percentage = percentage(kpi.value, kpi.target);
        check_kpi(&kpi)?;

        if !self.store.save(&kpi)? {
            return Err(ServiceError::not_found("station kpi", id));
        }
        self.activity.record(
            actor,
            Action::Update,
            "station_kpi",
            id,
            Some(serde_json::json!({ "value": kpi.value, "percentage": kpi.percentage })),
        );
        Ok(kpi)
    }

    pub fn delete_station_kpi(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove::<StationKpi>(id)? {
            return Err(ServiceError::not_found("station kpi", id));
        }
        self.activity.record(actor, Action::Delete, "station_kpi", id, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::service::testing::{memory_service, operator, sqlite_service, station_input};

    fn input(name: &str, value: f64, target: f64, period: &str) -> StationKpiInput {
        StationKpiInput {
            name: name.into(),
            value,
            target,
            unit: Some("adet".into()),
            period: Some(period.into()),
        }
    }

    #[test]
    fn crud_recomputes_percentage() {
        for svc in [memory_service(), sqlite_service()] {
            let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            let kpi = svc
                .create_station_kpi(&operator(), &station.id, input("OEE", 68.0, 85.0, "2024-05-01"))
                .unwrap();
            assert_eq!(kpi.percentage, 80.0);

            let updated = svc
                .update_station_kpi(&operator(), &kpi.id, json!({"value": 85.0, "station_id": "other"}))
                .unwrap();
            assert_eq!(updated.percentage, 100.0);
            assert_eq!(updated.station_id, station.id);

            svc.create_station_kpi(&operator(), &station.id, input("Fire", 1.0, 0.0, "2024-06-01")).unwrap();
            let names: Vec<_> = svc
                .list_station_kpis(&station.id)
                .unwrap()
                .into_iter()
                .map(|k| k.name)
                .collect();
            assert_eq!(names, vec!["Fire", "OEE"]);

            svc.delete_station_kpi(&operator(), &kpi.id).unwrap();
            assert_eq!(svc.list_station_kpis(&station.id).unwrap().len(), 1);
        }
    }

    #[test]
    fn overflowing_percentage_is_stored_as_zero() {
        for svc in [memory_service(), sqlite_service()] {
            let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            let kpi = svc
                .create_station_kpi(&operator(), &station.id, input("OEE", 1e300, 1e-10, "2024-05-01"))
                .unwrap();
            assert_eq!(kpi.percentage, 0.0);
            assert_eq!(svc.list_station_kpis(&station.id).unwrap().len(), 1);
        }
    }

    #[test]
    fn validation() {
        let svc = memory_service();
        let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
        assert!(matches!(
            svc.create_station_kpi(&operator(), &station.id, input(" ", 1.0, 1.0, "2024-05-01")),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_station_kpi(&operator(), "missing", input("OEE", 1.0, 1.0, "2024-05-01")),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_station_kpi(&operator(), "missing"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
