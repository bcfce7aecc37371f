use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use kpidash_core::{department_or_default, parse_date, Principal, ServiceError};
use kpidash_kv::KVStoreExt;
use kpidash_store::Action;

use crate::model::{CalendarDay, CalendarMonth, DayStatus, KpiCategory};
use crate::service::KpiService;

/// Marked days of one month, keyed by day of month. Unmarked days are successes.
type MonthMarks = BTreeMap<u32, DayStatus>;

fn parse_month(month: &str) -> Result<NaiveDate, ServiceError> {
    let month = month.trim();
    if month.len() != 7 {
        return Err(ServiceError::Validation(format!("month must be YYYY-MM, got '{}'", month)));
    }
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("month must be YYYY-MM, got '{}'", month)))
}

impl KpiService {
    fn calendar_department(&self, department: &str) -> Result<String, ServiceError> {
        let department = department_or_default(Some(department), &self.config.default_department);
        if department.contains('/') {
            return Err(ServiceError::Validation("department must not contain '/'".into()));
        }
        Ok(department)
    }

    fn calendar_key(department: &str, category: KpiCategory, date: NaiveDate) -> String {
        format!("calendar/{}/{}/{}", department, category.as_str(), date.format("%Y-%m"))
    }

    fn load_marks(&self, key: &str) -> Result<MonthMarks, ServiceError> {
        Ok(self.kv.get_json::<MonthMarks>(key)?.unwrap_or_default())
    }

    /// Every day of `month` (`YYYY-MM`) with its status.
    pub fn calendar_month(
        &self,
        department: &str,
        category: KpiCategory,
        month: &str,
    ) -> Result<CalendarMonth, ServiceError> {
        let department = self.calendar_department(department)?;
        let first = parse_month(month)?;
        let marks = self.load_marks(&Self::calendar_key(&department, category, first))?;

        let days: Vec<CalendarDay> = first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .map(|d| CalendarDay {
                date: d.format("%Y-%m-%d").to_string(),
                status: marks.get(&d.day()).copied().unwrap_or_default(),
            })
            .collect();
        let failure_days = days.iter().filter(|d| d.status == DayStatus::Failure).count();

        Ok(CalendarMonth {
            department,
            category,
            month: first.format("%Y-%m").to_string(),
            days,
            failure_days,
        })
    }

    /// Flip a day between success and failure.
    pub fn toggle_day(
        &self,
        actor: &Principal,
        department: &str,
        category: KpiCategory,
        date: &str,
    ) -> Result<CalendarDay, ServiceError> {
        let day = parse_date("date", date)?;
        let current = self.day_status(department, category, day)?;
        self.write_day(actor, department, category, day, Some(current.flipped()), Action::Toggle)
    }

    /// Mark a day explicitly; `None` clears the mark.
    pub fn set_day(
        &self,
        actor: &Principal,
        department: &str,
        category: KpiCategory,
        date: &str,
        status: Option<DayStatus>,
    ) -> Result<CalendarDay, ServiceError> {
        let day = parse_date("date", date)?;
        self.write_day(actor, department, category, day, status, Action::Update)
    }

    fn day_status(&self, department: &str, category: KpiCategory, day: NaiveDate) -> Result<DayStatus, ServiceError> {
        let department = self.calendar_department(department)?;
        let marks = self.load_marks(&Self::calendar_key(&department, category, day))?;
        Ok(marks.get(&day.day()).copied().unwrap_or_default())
    }

    fn write_day(
        &self,
        actor: &Principal,
        department: &str,
        category: KpiCategory,
        day: NaiveDate,
        status: Option<DayStatus>,
        action: Action,
    ) -> Result<CalendarDay, ServiceError> {
        let department = self.calendar_department(department)?;
        let key = Self::calendar_key(&department, category, day);
        let mut marks = self.load_marks(&key)?;
        match status {
            Some(s) => {
                marks.insert(day.day(), s);
            }
            None => {
                marks.remove(&day.day());
            }
        }
        if marks.is_empty() {
            self.kv.delete(&key)?;
        } else {
            self.kv.set_json(&key, &marks)?;
        }

        let date = day.format("%Y-%m-%d").to_string();
        let status = status.unwrap_or_default();
        self.activity.record(
            actor,
            action,
            "calendar",
            &format!("{}/{}/{}", department, category.as_str(), date),
            Some(serde_json::json!({ "status": status })),
        );
        Ok(CalendarDay { date, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{manager, memory_service};

    #[test]
    fn toggling_twice_restores_status() {
        let svc = memory_service();
        let before = svc.calendar_month("Kalite", KpiCategory::Quality, "2024-05").unwrap();
        assert_eq!(before.days[9].status, DayStatus::Success);

        let once = svc.toggle_day(&manager(), "Kalite", KpiCategory::Quality, "2024-05-10").unwrap();
        assert_eq!(once.status, DayStatus::Failure);
        let twice = svc.toggle_day(&manager(), "Kalite", KpiCategory::Quality, "2024-05-10").unwrap();
        assert_eq!(twice.status, DayStatus::Success);

        let after = svc.calendar_month("Kalite", KpiCategory::Quality, "2024-05").unwrap();
        assert_eq!(after.days, before.days);
    }

    #[test]
    fn month_view_covers_every_day() {
        let svc = memory_service();
        svc.set_day(&manager(), "Kalite", KpiCategory::Safety, "2024-02-29", Some(DayStatus::Failure)).unwrap();
        svc.set_day(&manager(), "Kalite", KpiCategory::Safety, "2024-02-01", Some(DayStatus::Failure)).unwrap();

        let month = svc.calendar_month("Kalite", KpiCategory::Safety, "2024-02").unwrap();
        assert_eq!(month.days.len(), 29);
        assert_eq!(month.failure_days, 2);
        assert_eq!(month.days[28].date, "2024-02-29");
        assert_eq!(month.days[28].status, DayStatus::Failure);

        // Calendars are separate per category and department.
        assert_eq!(svc.calendar_month("Kalite", KpiCategory::Quality, "2024-02").unwrap().failure_days, 0);
        assert_eq!(svc.calendar_month("Üretim", KpiCategory::Safety, "2024-02").unwrap().failure_days, 0);
    }

    #[test]
    fn clearing_a_mark() {
        let svc = memory_service();
        svc.set_day(&manager(), "Kalite", KpiCategory::Quality, "2024-05-03", Some(DayStatus::Failure)).unwrap();
        let cleared = svc.set_day(&manager(), "Kalite", KpiCategory::Quality, "2024-05-03", None).unwrap();
        assert_eq!(cleared.status, DayStatus::Success);
        assert_eq!(svc.calendar_month("Kalite", KpiCategory::Quality, "2024-05").unwrap().failure_days, 0);
    }

    #[test]
    fn bad_dates_rejected() {
        let svc = memory_service();
        assert!(svc.calendar_month("Kalite", KpiCategory::Quality, "2024-5").is_err());
        assert!(svc.calendar_month("Kalite", KpiCategory::Quality, "2024-13").is_err());
        assert!(svc.toggle_day(&manager(), "Kalite", KpiCategory::Quality, "2024-02-30").is_err());
        assert!(svc.toggle_day(&manager(), "A/B", KpiCategory::Quality, "2024-02-03").is_err());
    }
}
