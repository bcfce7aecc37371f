use serde::{Deserialize, Serialize};

/// Paging parameters accepted by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Upper bound applied to client-supplied limits.
pub const MAX_LIST_LIMIT: usize = 500;

impl ListParams {
    /// The limit clamped to `1..=MAX_LIST_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIST_LIMIT)
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Today's date as `YYYY-MM-DD` (UTC).
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Trimmed department name, or `fallback` when the input is missing or blank.
pub fn department_or_default(department: Option<&str>, fallback: &str) -> String {
    match department.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => fallback.to_string(),
    }
}

/// Validate a `YYYY-MM-DD` date string.
pub fn parse_date(field: &str, value: &str) -> Result<chrono::NaiveDate, crate::ServiceError> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        crate::ServiceError::Validation(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    })
}

/// Percentage of `target` reached by `value`; zero when there is no positive
/// target or the ratio overflows `f64`.
pub fn percentage(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    let pct = value / target * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Merge a JSON patch into a base value (RFC 7386).
///
/// `null` removes a key, objects merge recursively, anything else replaces.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
