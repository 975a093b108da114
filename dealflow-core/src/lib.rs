//! Dealflow Core - Record Types
//!
//! Entity types, per-entity field schemas, the error taxonomy and the
//! notification contract shared by every other dealflow crate. Nothing in
//! here performs I/O.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod notification;
pub mod pipeline;
pub mod schema;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Integer record identifier assigned by the record store.
pub type RecordId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// A raw record as exchanged with the record store: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Key under which the record store exposes the record identifier.
pub const ID_FIELD: &str = "Id";

/// Render a timestamp the way the record store stores it
/// (`2024-03-01T09:30:00.000Z`).
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read the `Id` field of a raw record, accepting numeric strings.
pub fn record_id(record: &Record) -> Option<RecordId> {
    match record.get(ID_FIELD)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub use entities::{Activity, Address, Company, Contact, Deal, Lookup, Quote, SalesOrder};
pub use enums::{
    ActivityType, CompanyStatus, DealStage, EntityType, EnumParseError, QuoteStatus,
    SalesOrderStatus,
};
pub use error::{
    ConfigError, DealflowError, DealflowResult, LlmError, StorageError, ValidationError,
};
pub use filter::{QuoteFilter, SalesOrderFilter, SalesOrderSort};
pub use notification::{Notification, NotificationLevel, Notifier, RecordingNotifier};
pub use pipeline::{DashboardStats, PipelineColumn, PipelineSummary};
pub use schema::{EntitySchema, FieldDefault, FieldKind, FieldSpec, RecordSchema, StampRule};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_format_timestamp_uses_millis_and_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_record_id_accepts_number_and_numeric_string() {
        let mut record = Record::new();
        record.insert(ID_FIELD.to_string(), json!(42));
        assert_eq!(record_id(&record), Some(42));

        record.insert(ID_FIELD.to_string(), json!(" 7 "));
        assert_eq!(record_id(&record), Some(7));

        record.insert(ID_FIELD.to_string(), json!(null));
        assert_eq!(record_id(&record), None);
    }
}
