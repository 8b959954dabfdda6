//! Declarative per-field merge policy.

use crate::record::Field;

/// How an external value may replace a local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// User-visible narrative text: replace when different, remembering the
    /// old value in the audit trail. Never erased by an empty external value.
    Overwrite,
    /// Like [`MergePolicy::Overwrite`] but compared on decoded KPP / OKPO.
    Composite,
    /// Administrative metadata: written only while the local value is empty.
    FillIfEmpty,
    /// [`MergePolicy::FillIfEmpty`] for dates; a filled value is shown in
    /// display format.
    FillDate,
}

impl MergePolicy {
    /// Policies whose fields carry a "was" note.
    pub fn is_audited(self) -> bool {
        matches!(self, Self::Overwrite | Self::Composite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub policy: MergePolicy,
}

const fn rule(field: Field, policy: MergePolicy) -> FieldRule {
    FieldRule { field, policy }
}

/// The standard rule set, applied in order.
///
/// `tax_id` is never merged. The CEO name and the restriction flag are owned
/// by [`crate::ceo`]; the structured risk payload is replaced wholesale.
pub const FIELD_POLICY: &[FieldRule] = &[
    rule(Field::Ogrn, MergePolicy::FillIfEmpty),
    rule(Field::TaxRegime, MergePolicy::FillIfEmpty),
    rule(Field::OkvedCode, MergePolicy::FillIfEmpty),
    rule(Field::OkvedName, MergePolicy::FillIfEmpty),
    rule(Field::OkvedVersion, MergePolicy::FillIfEmpty),
    rule(Field::OkopfCode, MergePolicy::FillIfEmpty),
    rule(Field::RiskDisqPersons, MergePolicy::FillIfEmpty),
    rule(Field::RiskMassDirectors, MergePolicy::FillIfEmpty),
    rule(Field::RiskMassFounders, MergePolicy::FillIfEmpty),
    rule(Field::RiskIllegalFin, MergePolicy::FillIfEmpty),
    rule(Field::RiskIllegalFinStatus, MergePolicy::FillIfEmpty),
    rule(Field::RiskSanctions, MergePolicy::FillIfEmpty),
    rule(Field::RiskSanctionsCountries, MergePolicy::FillIfEmpty),
    rule(Field::RiskSanctionedFounder, MergePolicy::FillIfEmpty),
    rule(Field::Website, MergePolicy::Overwrite),
    rule(Field::Country, MergePolicy::Overwrite),
    rule(Field::Address, MergePolicy::Overwrite),
    rule(Field::Region, MergePolicy::Overwrite),
    rule(Field::FullName, MergePolicy::Overwrite),
    rule(Field::RegistrationCode, MergePolicy::Composite),
    rule(Field::OkopfName, MergePolicy::Overwrite),
    rule(Field::CeoPost, MergePolicy::FillIfEmpty),
    rule(Field::CeoRecordDate, MergePolicy::FillDate),
];

pub fn policy_for(field: Field) -> Option<MergePolicy> {
    FIELD_POLICY
        .iter()
        .find(|r| r.field == field)
        .map(|r| r.policy)
}

/// Fields holding dates in storage format once persisted.
pub fn date_fields() -> impl Iterator<Item = Field> {
    FIELD_POLICY
        .iter()
        .filter(|r| r.policy == MergePolicy::FillDate)
        .map(|r| r.field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_field_has_one_rule() {
        let unique: HashSet<Field> = FIELD_POLICY.iter().map(|r| r.field).collect();
        assert_eq!(unique.len(), FIELD_POLICY.len());
    }

    #[test]
    fn identifiers_are_never_overwritten() {
        assert_eq!(policy_for(Field::TaxId), None);
        assert_eq!(policy_for(Field::Ogrn), Some(MergePolicy::FillIfEmpty));
        assert_eq!(policy_for(Field::CeoName), None);
    }

    #[test]
    fn audited_fields() {
        let audited: Vec<Field> = FIELD_POLICY
            .iter()
            .filter(|r| r.policy.is_audited())
            .map(|r| r.field)
            .collect();
        assert_eq!(
            audited,
            vec![
                Field::Website,
                Field::Country,
                Field::Address,
                Field::Region,
                Field::FullName,
                Field::RegistrationCode,
                Field::OkopfName,
            ]
        );
    }

    #[test]
    fn only_record_date_is_a_date() {
        assert_eq!(date_fields().collect::<Vec<_>>(), vec![Field::CeoRecordDate]);
    }
}
