//! Record preparation around the editing session.
//!
//! Before a record goes to persistence the placeholder name is stripped,
//! display-format dates are converted back to storage format and the audit
//! trail is serialized alongside it.

use serde::Serialize;

use crate::audit::AuditTrail;
use crate::ceo;
use crate::date;
use crate::error::RecordError;
use crate::policy::date_fields;
use crate::record::{Field, LocalRecord};

/// What the caller hands to persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub record: LocalRecord,
    /// Serialized [`AuditTrail`].
    pub was_notes: String,
}

pub fn prepare_for_submit(
    record: &LocalRecord,
    audit: &AuditTrail,
) -> Result<Submission, RecordError> {
    let mut record = record.clone();
    ceo::clear_placeholder(&mut record);
    for field in date_fields() {
        let value = record.text(field);
        if date::is_display_format(&value) {
            record.set(field, date::to_storage(&value));
        }
    }
    Ok(Submission {
        record,
        was_notes: audit.to_json()?,
    })
}

/// Inverse of [`prepare_for_submit`] for a record loaded from storage.
pub fn prepare_for_display(record: &LocalRecord) -> LocalRecord {
    let mut record = record.clone();
    for field in date_fields() {
        let value = record.text(field);
        if date::is_storage_format(&value) {
            record.set(field, date::to_display(&value));
        }
    }
    if record.get(Field::CeoRestricted).as_flag() && record.is_blank(Field::CeoName) {
        record.set(Field::CeoName, ceo::PLACEHOLDER);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_strips_placeholder_and_converts_dates() {
        let record = LocalRecord::new()
            .with(Field::CeoName, ceo::PLACEHOLDER)
            .with(Field::CeoRecordDate, "07.03.2024");
        let mut audit = AuditTrail::new();
        audit.record("address", "Tver");

        let out = prepare_for_submit(&record, &audit).unwrap();

        assert_eq!(out.record.text(Field::CeoName), "");
        assert_eq!(out.record.text(Field::CeoRecordDate), "2024-03-07");
        assert_eq!(out.was_notes, r#"{"address":"Tver"}"#);
    }

    #[test]
    fn submit_keeps_real_name_and_odd_dates() {
        let record = LocalRecord::new()
            .with(Field::CeoName, "Ivanov I.I.")
            .with(Field::CeoRecordDate, "March 2024");
        let out = prepare_for_submit(&record, &AuditTrail::new()).unwrap();
        assert_eq!(out.record.text(Field::CeoName), "Ivanov I.I.");
        assert_eq!(out.record.text(Field::CeoRecordDate), "March 2024");
        assert_eq!(out.was_notes, "{}");
    }

    #[test]
    fn display_restores_placeholder_for_restricted_records() {
        let record = LocalRecord::new()
            .with(Field::CeoRestricted, true)
            .with(Field::CeoRecordDate, "2024-03-07");
        let shown = prepare_for_display(&record);
        assert_eq!(shown.text(Field::CeoName), ceo::PLACEHOLDER);
        assert_eq!(shown.text(Field::CeoRecordDate), "07.03.2024");

        let saved = prepare_for_submit(&shown, &AuditTrail::new()).unwrap();
        assert_eq!(saved.record.text(Field::CeoName), "");
        assert_eq!(saved.record.text(Field::CeoRecordDate), "2024-03-07");
    }
}
