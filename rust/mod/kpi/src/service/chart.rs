use kpidash_core::{now_rfc3339, Principal, ServiceError};
use kpidash_import::{parse_table, ChartData};
use kpidash_kv::KVStoreExt;
use kpidash_store::Action;

use crate::model::{ChartDataset, ChartInfo};
use crate::service::KpiService;

const CHART_PREFIX: &str = "chart/";

fn chart_name(name: &str) -> Result<&str, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("chart name is required".into()));
    }
    if name.contains('/') {
        return Err(ServiceError::Validation("chart name must not contain '/'".into()));
    }
    Ok(name)
}

impl KpiService {
    /// Parse a CSV/TSV export into a chart dataset, replacing any dataset
    /// with the same name.
    pub fn import_chart(&self, actor: &Principal, name: &str, bytes: &[u8]) -> Result<ChartDataset, ServiceError> {
        let name = chart_name(name)?;
        let table = parse_table(bytes)?;
        let data = ChartData::from_table(&table)?;

        let dataset = ChartDataset {
            name: name.to_string(),
            encoding: table.encoding.to_string(),
            delimiter: table.delimiter.to_string(),
            labels: data.labels,
            series: data.series,
            imported_by: actor.username.clone(),
            imported_at: now_rfc3339(),
        };
        self.kv.set_json(&format!("{}{}", CHART_PREFIX, name), &dataset)?;

        tracing::info!(
            chart = name,
            encoding = table.encoding,
            rows = dataset.labels.len(),
            series = dataset.series.len(),
            "chart imported"
        );
        self.activity.record(
            actor,
            Action::Import,
            "chart",
            name,
            Some(serde_json::json!({ "rows": dataset.labels.len(), "encoding": dataset.encoding })),
        );
        Ok(dataset)
    }

    pub fn list_charts(&self) -> Result<Vec<ChartInfo>, ServiceError> {
        let mut charts = Vec::new();
        for (key, bytes) in self.kv.scan(CHART_PREFIX)? {
            match serde_json::from_slice::<ChartDataset>(&bytes) {
                Ok(d) => charts.push(ChartInfo::from(&d)),
                Err(e) => tracing::warn!(key, error = %e, "skipping unreadable chart dataset"),
            }
        }
        Ok(charts)
    }

    pub fn get_chart(&self, name: &str) -> Result<ChartDataset, ServiceError> {
        let name = chart_name(name)?;
        self.kv
            .get_json(&format!("{}{}", CHART_PREFIX, name))?
            .ok_or_else(|| ServiceError::not_found("chart", name))
    }

    pub fn delete_chart(&self, actor: &Principal, name: &str) -> Result<(), ServiceError> {
        let name = chart_name(name)?;
        let key = format!("{}{}", CHART_PREFIX, name);
        if self.kv.get(&key)?.is_none() {
            return Err(ServiceError::not_found("chart", name));
        }
        self.kv.delete(&key)?;
        self.activity.record(actor, Action::Delete, "chart", name, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{manager, memory_service};

    #[test]
    fn imports_windows_1254_semicolon_export() {
        let svc = memory_service();
        // "Ay;Hedef;Gerçekleşen" / "Şubat;100;85,5" in windows-1254.
        let mut bytes = b"Ay;Hedef;Ger\xe7ekle\xfeen\n".to_vec();
        bytes.extend_from_slice(b"Ocak;100;92\n\xdeubat;100;85,5\n");

        let dataset = svc.import_chart(&manager(), "kalite-2024", &bytes).unwrap();
        assert_eq!(dataset.encoding, "windows-1254");
        assert_eq!(dataset.delimiter, ";");
        assert_eq!(dataset.labels, vec!["Ocak", "Şubat"]);
        assert_eq!(dataset.series[1].name, "Gerçekleşen");
        assert_eq!(dataset.series[1].values, vec![Some(92.0), Some(85.5)]);

        let fetched = svc.get_chart("kalite-2024").unwrap();
        assert_eq!(fetched.labels, dataset.labels);
    }

    #[test]
    fn list_and_delete() {
        let svc = memory_service();
        svc.import_chart(&manager(), "b", b"Ay,Deger\nOcak,1\n").unwrap();
        svc.import_chart(&manager(), "a", b"Ay\tDeger\nOcak\t2\n").unwrap();

        let names: Vec<_> = svc.list_charts().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b"]);

        svc.delete_chart(&manager(), "a").unwrap();
        assert!(matches!(svc.get_chart("a"), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_chart(&manager(), "a"), Err(ServiceError::NotFound(_))));
        assert_eq!(svc.list_charts().unwrap().len(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        let svc = memory_service();
        assert!(matches!(svc.import_chart(&manager(), " ", b"a,b\n1,2\n"), Err(ServiceError::Validation(_))));
        assert!(matches!(svc.import_chart(&manager(), "x/y", b"a,b\n1,2\n"), Err(ServiceError::Validation(_))));
        assert!(matches!(svc.import_chart(&manager(), "x", b"only\n1\n"), Err(ServiceError::Validation(_))));
        assert!(matches!(svc.import_chart(&manager(), "x", b""), Err(ServiceError::Validation(_))));
    }
}
