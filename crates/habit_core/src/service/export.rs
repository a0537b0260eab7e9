//! Portable JSON export of the habit collection.

use crate::model::habit::Habit;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Format version written into every export.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Export document: the full collection plus export metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope<'a> {
    pub habits: &'a [Habit],
    pub export_date: DateTime<Utc>,
    pub version: &'static str,
}

impl ExportEnvelope<'_> {
    /// Pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds an export document; never touches storage.
pub fn export_snapshot(habits: &[Habit], exported_at: DateTime<Utc>) -> ExportEnvelope<'_> {
    ExportEnvelope {
        habits,
        export_date: exported_at,
        version: EXPORT_FORMAT_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::{export_snapshot, EXPORT_FORMAT_VERSION};
    use crate::model::habit::NewHabit;
    use chrono::{TimeZone, Utc};

    #[test]
    fn export_uses_snapshot_layout_with_metadata() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        let habits = vec![NewHabit::new("Meditate", "5 minutes", "mindfulness")
            .with_reminder("07:30")
            .into_habit(at)
            .unwrap()];

        let json = export_snapshot(&habits, at).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], EXPORT_FORMAT_VERSION);
        assert_eq!(value["exportDate"], "2024-02-01T10:00:00Z");
        assert_eq!(value["habits"][0]["category"], "mindfulness");
        assert_eq!(value["habits"][0]["reminderTime"], "07:30");
        assert!(value["habits"][0]["completions"].as_object().unwrap().is_empty());
    }
}
