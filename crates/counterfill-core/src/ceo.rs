//! The CEO name field, which the registry may withhold.
//!
//! When the registry restricts access to the director's name, an empty field
//! shows a fixed placeholder. The placeholder is display-only: it yields to
//! any user edit and is stripped before the record is persisted.

use serde::Serialize;
use tracing::debug;

use crate::audit::{AuditTrail, was_note};
use crate::record::{Field, FieldValue, LocalRecord};

/// Display text substituted for a withheld name. Never persisted.
pub const PLACEHOLDER: &str = "ФИО скрыто ФНС";

pub const RESTRICTED_NOTE: &str = "ФИО руководителя скрыто ФНС (ограничение доступа)";

/// Audit-trail key for the CEO name.
pub const AUDIT_KEY: &str = "ceo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameState {
    Empty,
    /// Field holds [`PLACEHOLDER`] and is rendered highlighted.
    PlaceholderShown,
    RealValue,
}

impl NameState {
    pub fn of(value: &str) -> Self {
        match value.trim() {
            "" => Self::Empty,
            PLACEHOLDER => Self::PlaceholderShown,
            _ => Self::RealValue,
        }
    }

    pub fn of_record(record: &LocalRecord) -> Self {
        Self::of(&record.text(Field::CeoName))
    }

    pub fn is_highlighted(self) -> bool {
        self == Self::PlaceholderShown
    }
}

/// The user-entered or registry-supplied name, with the placeholder read as empty.
pub fn real_name(record: &LocalRecord) -> String {
    let value = record.text(Field::CeoName);
    if value == PLACEHOLDER { String::new() } else { value }
}

/// Apply the CEO part of a lookup response.
pub fn apply_lookup(
    record: &mut LocalRecord,
    restricted: bool,
    external_name: &str,
    audit: &mut AuditTrail,
) -> NameState {
    let state = NameState::of_record(record);
    let external_name = external_name.trim();

    let next = if restricted {
        if state == NameState::Empty {
            record.set(Field::CeoName, PLACEHOLDER);
            NameState::PlaceholderShown
        } else {
            state
        }
    } else if !external_name.is_empty() {
        let previous = real_name(record);
        if !previous.is_empty() && previous != external_name {
            audit.record(AUDIT_KEY, &previous);
        }
        record.set(Field::CeoName, external_name);
        NameState::RealValue
    } else if state == NameState::PlaceholderShown {
        // No longer restricted but nothing to show: drop the stale placeholder.
        record.set(Field::CeoName, "");
        NameState::Empty
    } else {
        state
    };

    debug!(from = ?state, to = ?next, restricted, "ceo name transition");
    next
}

/// A user edit of the name field.
pub fn on_user_edit(record: &mut LocalRecord, value: &str) -> NameState {
    record.set(Field::CeoName, value);
    NameState::of(value)
}

/// Strip the placeholder before persisting. Returns whether it was present.
pub fn clear_placeholder(record: &mut LocalRecord) -> bool {
    if NameState::of_record(record) == NameState::PlaceholderShown {
        record.set(Field::CeoName, FieldValue::Text(String::new()));
        true
    } else {
        false
    }
}

/// Note rendered under the name field.
pub fn note(restricted: bool, audit: &AuditTrail) -> Option<String> {
    if restricted {
        Some(RESTRICTED_NOTE.to_string())
    } else {
        audit.get(AUDIT_KEY).map(was_note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_empty_shows_placeholder() {
        let mut record = LocalRecord::new();
        let mut audit = AuditTrail::new();
        let state = apply_lookup(&mut record, true, "", &mut audit);
        assert_eq!(state, NameState::PlaceholderShown);
        assert_eq!(record.text(Field::CeoName), PLACEHOLDER);
        assert!(state.is_highlighted());
    }

    #[test]
    fn restricted_keeps_known_name() {
        let mut record = LocalRecord::new().with(Field::CeoName, "Сидоров С.С.");
        let mut audit = AuditTrail::new();
        let state = apply_lookup(&mut record, true, "", &mut audit);
        assert_eq!(state, NameState::RealValue);
        assert_eq!(record.text(Field::CeoName), "Сидоров С.С.");
    }

    #[test]
    fn user_edit_replaces_placeholder_and_submit_is_clean() {
        let mut record = LocalRecord::new();
        let mut audit = AuditTrail::new();
        apply_lookup(&mut record, true, "", &mut audit);

        assert_eq!(on_user_edit(&mut record, "Ivanov I.I."), NameState::RealValue);
        assert!(!clear_placeholder(&mut record));
        assert_eq!(record.text(Field::CeoName), "Ivanov I.I.");
    }

    #[test]
    fn submission_clears_untouched_placeholder() {
        let mut record = LocalRecord::new();
        let mut audit = AuditTrail::new();
        apply_lookup(&mut record, true, "", &mut audit);
        assert!(clear_placeholder(&mut record));
        assert_eq!(record.text(Field::CeoName), "");
    }

    #[test]
    fn new_name_audits_previous_one() {
        let mut record = LocalRecord::new().with(Field::CeoName, "Петров П.П.");
        let mut audit = AuditTrail::new();
        let state = apply_lookup(&mut record, false, "Иванов И.И.", &mut audit);
        assert_eq!(state, NameState::RealValue);
        assert_eq!(record.text(Field::CeoName), "Иванов И.И.");
        assert_eq!(audit.get(AUDIT_KEY), Some("Петров П.П."));
        assert_eq!(note(false, &audit).as_deref(), Some("Было: Петров П.П."));
    }

    #[test]
    fn same_name_is_not_audited() {
        let mut record = LocalRecord::new().with(Field::CeoName, "Иванов И.И.");
        let mut audit = AuditTrail::new();
        apply_lookup(&mut record, false, "Иванов И.И.", &mut audit);
        assert!(audit.is_empty());
    }

    #[test]
    fn placeholder_is_never_audited() {
        let mut record = LocalRecord::new().with(Field::CeoName, PLACEHOLDER);
        let mut audit = AuditTrail::new();
        apply_lookup(&mut record, false, "Иванов И.И.", &mut audit);
        assert!(audit.is_empty());
        assert_eq!(record.text(Field::CeoName), "Иванов И.И.");
    }

    #[test]
    fn lifted_restriction_without_name_drops_placeholder() {
        let mut record = LocalRecord::new().with(Field::CeoName, PLACEHOLDER);
        let mut audit = AuditTrail::new();
        assert_eq!(apply_lookup(&mut record, false, "", &mut audit), NameState::Empty);
        assert_eq!(record.text(Field::CeoName), "");
    }

    #[test]
    fn restricted_note_wins() {
        let mut audit = AuditTrail::new();
        audit.record(AUDIT_KEY, "Петров П.П.");
        assert_eq!(note(true, &audit).as_deref(), Some(RESTRICTED_NOTE));
        assert_eq!(note(false, &AuditTrail::new()), None);
    }
}
