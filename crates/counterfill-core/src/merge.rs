//! Non-destructive field merge.
//!
//! Applies a [`FieldRule`] table to one record. The rules never erase a
//! local value with an empty external one, never touch a present value of a
//! fill-if-empty field, and remember every overwritten narrative value in the
//! [`AuditTrail`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::audit::{AuditTrail, was_note};
use crate::composite::RegistrationCode;
use crate::date;
use crate::lookup::ExternalLookupResult;
use crate::policy::{FieldRule, MergePolicy};
use crate::record::{Field, FieldValue, LocalRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    /// Local value was empty.
    Filled,
    /// A present local value was replaced.
    Overwritten,
    /// A present local value was emptied.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: Field,
    pub action: FieldAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl FieldChange {
    pub(crate) fn filled(field: Field) -> Self {
        Self {
            field,
            action: FieldAction::Filled,
            previous: None,
        }
    }

    pub(crate) fn overwritten(field: Field, previous: String) -> Self {
        Self {
            field,
            action: FieldAction::Overwritten,
            previous: Some(previous),
        }
    }

    pub(crate) fn cleared(field: Field, previous: String) -> Self {
        Self {
            field,
            action: FieldAction::Cleared,
            previous: Some(previous),
        }
    }
}

/// Outcome of one merge pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub changes: Vec<FieldChange>,
    /// "Was" note per audited field for this pass. `None` clears a note left
    /// on screen by an earlier pass.
    pub notes: BTreeMap<Field, Option<String>>,
}

impl MergeReport {
    pub fn changed(&self, field: Field) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }
}

/// Merge `external` into `record` field by field according to `rules`.
pub fn merge_fields(
    record: &mut LocalRecord,
    external: &ExternalLookupResult,
    audit: &mut AuditTrail,
    rules: &[FieldRule],
) -> MergeReport {
    let mut report = MergeReport::default();

    for rule in rules {
        let field = rule.field;
        let next = external.get(field);
        let change = match rule.policy {
            MergePolicy::Overwrite => overwrite(record, field, next, audit),
            MergePolicy::Composite => overwrite_composite(record, field, next, audit),
            MergePolicy::FillIfEmpty => fill_if_empty(record, field, next, false),
            MergePolicy::FillDate => fill_if_empty(record, field, next, true),
        };

        if rule.policy.is_audited() {
            let note = change
                .as_ref()
                .and_then(|c| c.previous.as_deref())
                .map(was_note);
            report.notes.insert(field, note);
        }

        if let Some(change) = change {
            debug!(field = %change.field, action = ?change.action, "field merged");
            report.changes.push(change);
        }
    }

    report
}

fn overwrite(
    record: &mut LocalRecord,
    field: Field,
    next: &FieldValue,
    audit: &mut AuditTrail,
) -> Option<FieldChange> {
    let next = next.text();
    if next.is_empty() {
        return None;
    }
    let prev = record.text(field);
    if prev == next {
        return None;
    }

    record.set(field, next);
    if prev.is_empty() {
        Some(FieldChange::filled(field))
    } else {
        audit.record(field.key(), &prev);
        Some(FieldChange::overwritten(field, prev))
    }
}

fn overwrite_composite(
    record: &mut LocalRecord,
    field: Field,
    next: &FieldValue,
    audit: &mut AuditTrail,
) -> Option<FieldChange> {
    let next_raw = next.text();
    if next_raw.is_empty() {
        return None;
    }
    let next = RegistrationCode::parse(&next_raw);
    if next.is_empty() {
        return None;
    }

    let prev_raw = record.text(field);
    let prev = RegistrationCode::parse(&prev_raw);
    if !prev.is_empty() && !prev.differs_meaningfully(&next) {
        return None;
    }

    record.set(field, next.format());
    if prev_raw.is_empty() {
        Some(FieldChange::filled(field))
    } else {
        audit.record(field.key(), &prev_raw);
        Some(FieldChange::overwritten(field, prev_raw))
    }
}

fn fill_if_empty(
    record: &mut LocalRecord,
    field: Field,
    next: &FieldValue,
    is_date: bool,
) -> Option<FieldChange> {
    if !record.is_blank(field) || next.is_empty() {
        return None;
    }

    let value = match next {
        FieldValue::Text(_) if is_date => FieldValue::Text(date::to_display(&next.text())),
        FieldValue::Text(_) => FieldValue::Text(next.text()),
        other => other.clone(),
    };
    record.set(field, value);
    Some(FieldChange::filled(field))
}
