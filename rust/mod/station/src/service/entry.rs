use kpidash_core::{new_id, now_rfc3339, parse_date, percentage, today, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{DateRange, EntryInput, ProductionStation, StationDataEntry, StationSummary};
use crate::service::StationService;

fn check_entry(entry: &StationDataEntry) -> Result<(), ServiceError> {
    parse_date("date", &entry.date)?;
    if entry.defects > entry.produced {
        return Err(ServiceError::Validation(format!(
            "defects ({}) cannot exceed produced ({})",
            entry.defects, entry.produced
        )));
    }
    if entry.downtime_minutes > entry.planned_minutes {
        return Err(ServiceError::Validation(format!(
            "downtime ({} min) cannot exceed planned time ({} min)",
            entry.downtime_minutes, entry.planned_minutes
        )));
    }
    Ok(())
}

/// Sum one counter over the entries; a total beyond `u64` is rejected.
fn total(entries: &[StationDataEntry], field: &str, value: impl Fn(&StationDataEntry) -> u64) -> Result<u64, ServiceError> {
    entries.iter().try_fold(0u64, |sum, e| {
        sum.checked_add(value(e))
            .ok_or_else(|| ServiceError::Validation(format!("{} total is too large to summarise", field)))
    })
}

impl StationService {
    fn range_query(&self, station_id: &str, range: &DateRange) -> Result<Query, ServiceError> {
        let mut query = Query::new()
            .filter(Filter::eq("station_id", station_id))
            .order_by("date", true);
        if let Some(from) = range.from.as_deref() {
            parse_date("from", from)?;
            query = query.filter(Filter::gte("date", from.trim()));
        }
        if let Some(to) = range.to.as_deref() {
            parse_date("to", to)?;
            query = query.filter(Filter::lte("date", to.trim()));
        }
        Ok(query)
    }

    /// Entries of one station, newest date first.
    pub fn list_entries(&self, station_id: &str, range: &DateRange) -> Result<Vec<StationDataEntry>, ServiceError> {
        self.store.fetch::<ProductionStation>(station_id)?;
        let (items, _) = self.store.query::<StationDataEntry>(&self.range_query(station_id, range)?)?;
        Ok(items)
    }

    pub fn create_entry(
        &self,
        actor: &Principal,
        station_id: &str,
        input: EntryInput,
    ) -> Result<StationDataEntry, ServiceError> {
        let station = self.store.fetch::<ProductionStation>(station_id)?;
        if !station.active {
            return Err(ServiceError::Validation(format!(
                "station '{}' is inactive",
                station.code
            )));
        }

        let entry = StationDataEntry {
            id: new_id(),
            station_id: station.id.clone(),
            date: input.date.map(|d| d.trim().to_string()).unwrap_or_else(today),
            shift: input.shift.filter(|s| !s.trim().is_empty()),
            produced: input.produced,
            defects: input.defects,
            downtime_minutes: input.downtime_minutes,
            planned_minutes: input.planned_minutes,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            created_by: actor.username.clone(),
            created_at: now_rfc3339(),
        };
        check_entry(&entry)?;

        self.store.create(&entry)?;
        self.activity.record(
            actor,
            Action::Create,
            "station_entry",
            &entry.id,
            Some(serde_json::json!({ "station": station.code, "date": entry.date })),
        );
        Ok(entry)
    }

    pub fn delete_entry(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove::<StationDataEntry>(id)? {
            return Err(ServiceError::not_found("station entry", id));
        }
        self.activity.record(actor, Action::Delete, "station_entry", id, None);
        Ok(())
    }

    /// Production totals, defect rate and availability over a date range.
    pub fn station_summary(&self, station_id: &str, range: &DateRange) -> Result<StationSummary, ServiceError> {
        let entries = self.list_entries(station_id, range)?;

        let produced = total(&entries, "produced", |e| e.produced)?;
        let defects = total(&entries, "defects", |e| e.defects)?;
        let downtime = total(&entries, "downtime_minutes", |e| e.downtime_minutes)?;
        let planned = total(&entries, "planned_minutes", |e| e.planned_minutes)?;

        Ok(StationSummary {
            station_id: station_id.to_string(),
            from: range.from.clone(),
            to: range.to.clone(),
            entries: entries.len(),
            produced,
            defects,
            downtime_minutes: downtime,
            planned_minutes: planned,
            defect_rate: percentage(defects as f64, produced as f64),
            availability: percentage(planned.saturating_sub(downtime) as f64, planned as f64),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::service::testing::{memory_service, operator, sqlite_service, station_input};

    fn entry(date: &str, produced: u64, defects: u64, downtime: u64) -> EntryInput {
        EntryInput {
            date: Some(date.into()),
            shift: Some("A".into()),
            produced,
            defects,
            downtime_minutes: downtime,
            planned_minutes: 480,
            notes: None,
        }
    }

    #[test]
    fn summary_rejects_totals_beyond_u64() {
        for svc in [memory_service(), sqlite_service()] {
            let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            let huge = u64::MAX / 2 + 1;
            svc.create_entry(&operator(), &station.id, entry("2024-05-01", huge, 0, 0)).unwrap();
            svc.create_entry(&operator(), &station.id, entry("2024-05-02", huge, 0, 0)).unwrap();

            assert!(matches!(
                svc.station_summary(&station.id, &DateRange::default()),
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[test]
    fn summary_over_range() {
        for svc in [memory_service(), sqlite_service()] {
            let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
            svc.create_entry(&operator(), &station.id, entry("2024-04-30", 1000, 50, 0)).unwrap();
            svc.create_entry(&operator(), &station.id, entry("2024-05-01", 400, 8, 48)).unwrap();
            svc.create_entry(&operator(), &station.id, entry("2024-05-02", 600, 12, 48)).unwrap();

            let may = DateRange {
                from: Some("2024-05-01".into()),
                to: Some("2024-05-31".into()),
            };
            let summary = svc.station_summary(&station.id, &may).unwrap();
            assert_eq!(summary.entries, 2);
            assert_eq!(summary.produced, 1000);
            assert_eq!(summary.defects, 20);
            assert_eq!(summary.defect_rate, 2.0);
            assert_eq!(summary.planned_minutes, 960);
            assert_eq!(summary.availability, 90.0);

            let dates: Vec<_> = svc
                .list_entries(&station.id, &DateRange::default())
                .unwrap()
                .into_iter()
                .map(|e| e.date)
                .collect();
            assert_eq!(dates, vec!["2024-05-02", "2024-05-01", "2024-04-30"]);
        }
    }

    #[test]
    fn empty_summary_is_zero() {
        let svc = memory_service();
        let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
        let summary = svc.station_summary(&station.id, &DateRange::default()).unwrap();
        assert_eq!(summary.entries, 0);
        assert_eq!(summary.defect_rate, 0.0);
        assert_eq!(summary.availability, 0.0);
    }

    #[test]
    fn entry_validation() {
        let svc = memory_service();
        let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();

        let too_many_defects = entry("2024-05-01", 10, 11, 0);
        assert!(matches!(
            svc.create_entry(&operator(), &station.id, too_many_defects),
            Err(ServiceError::Validation(_))
        ));
        let too_much_downtime = entry("2024-05-01", 10, 0, 481);
        assert!(matches!(
            svc.create_entry(&operator(), &station.id, too_much_downtime),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_entry(&operator(), &station.id, entry("01.05.2024", 10, 0, 0)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_entry(&operator(), "missing", entry("2024-05-01", 10, 0, 0)),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn inactive_station_rejects_entries() {
        let svc = memory_service();
        let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
        svc.update_station(&operator(), &station.id, json!({"active": false})).unwrap();
        assert!(matches!(
            svc.create_entry(&operator(), &station.id, entry("2024-05-01", 10, 0, 0)),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn delete_entry() {
        let svc = sqlite_service();
        let station = svc.create_station(&operator(), station_input("PRS-01")).unwrap();
        let created = svc.create_entry(&operator(), &station.id, entry("2024-05-01", 10, 0, 0)).unwrap();
        assert_eq!(created.created_by, "mehmet");
        svc.delete_entry(&operator(), &created.id).unwrap();
        assert!(svc.list_entries(&station.id, &DateRange::default()).unwrap().is_empty());
        assert!(matches!(svc.delete_entry(&operator(), &created.id), Err(ServiceError::NotFound(_))));
    }
}
