use chrono::SecondsFormat;
use serde::Serialize;

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> From<Vec<T>> for ListResult<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// Get the current UTC time as an RFC 3339 string.
///
/// Always microsecond precision with a `Z` suffix, so timestamps sort
/// lexically in time order (SQL `ORDER BY` on the text column).
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_fixed_width_utc() {
        let ts = now_rfc3339();
        assert!(ts.ends_with('Z'));
        // 2026-10-18T09:30:00.123456Z
        assert_eq!(ts.len(), 27);
    }

    #[test]
    fn list_result_counts_items() {
        let list = ListResult::from(vec!["a", "b"]);
        assert_eq!(list.total, 2);
    }
}
