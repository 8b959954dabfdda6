//! One reconciliation pass: `(record, lookup, audit) -> (record, audit, entity type)`.
//!
//! The pass is pure. Inputs are borrowed and never modified; the caller
//! receives a complete new snapshot or an error, never a partial update.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::audit::AuditTrail;
use crate::ceo::{self, NameState};
use crate::error::ReconcileError;
use crate::identifier::{EntityType, TaxId, classify_with_lookup};
use crate::lookup::ExternalLookupResult;
use crate::merge::{FieldChange, merge_fields};
use crate::policy::{FIELD_POLICY, FieldRule};
use crate::record::{Field, LocalRecord};
use crate::seed::{SeedReport, SeedTarget, seed_financial_years};
use crate::visibility::Visibility;

/// Classification written for a private individual.
pub const INDIVIDUAL_LABEL: &str = "Физическое лицо";

pub const PHYSICAL_PERSON_NOTICE: &str =
    "По данным ФНС организация или ИП не найдены. Предполагается физическое лицо.";

/// Result of a pass, including everything the presentation layer derives
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub record: LocalRecord,
    pub audit: AuditTrail,
    pub entity_type: EntityType,
    pub visibility: Visibility,
    pub ceo_state: NameState,
    pub ceo_note: Option<String>,
    /// "Was" notes for audited fields; `None` clears a stale note.
    pub notes: BTreeMap<Field, Option<String>>,
    pub changes: Vec<FieldChange>,
    pub seeded: SeedReport,
    /// The stored risk payload differs from the one passed in.
    pub risk_replaced: bool,
    /// Data came from a successful registry lookup.
    pub looked_up: bool,
    pub notice: Option<String>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.seeded.values_written == 0 && !self.risk_replaced
    }
}

/// The reconciliation engine, parameterised by its field policy table.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    rules: &'static [FieldRule],
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_rules(FIELD_POLICY)
    }

    pub fn with_rules(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    /// Merge a lookup response into `local`.
    ///
    /// A not-found response for a 12-digit identifier takes the
    /// physical-person fallback; for a 10-digit one it is an error. A
    /// response carrying only an error message is handled like a transport
    /// failure.
    pub fn reconcile(
        &self,
        local: &LocalRecord,
        external: &ExternalLookupResult,
        audit: &AuditTrail,
        target: SeedTarget,
    ) -> Result<Reconciliation, ReconcileError> {
        let tax_id = TaxId::parse(&local.text(Field::TaxId))?;

        if external.is_failure() {
            let reason = external.error.clone().unwrap_or_default();
            return self.reconcile_failure(local, audit, &reason);
        }

        if external.not_found {
            if tax_id.is_personal() {
                return Ok(physical_fallback(local, audit));
            }
            warn!(tax_id = %tax_id, "registry has no match for legal entity");
            return Err(ReconcileError::NotFound {
                tax_id: tax_id.to_string(),
            });
        }

        let mut record = local.clone();
        let mut audit = audit.clone();

        let report = merge_fields(&mut record, external, &mut audit, self.rules);
        let mut changes = report.changes;

        let risk_json = external
            .risk_json
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let risk_replaced = record.risk_json != risk_json;
        record.risk_json = risk_json;

        let was_restricted = record.get(Field::CeoRestricted).as_flag();
        record.set(Field::CeoRestricted, external.ceo_restricted);
        if was_restricted != external.ceo_restricted {
            changes.push(if external.ceo_restricted {
                FieldChange::filled(Field::CeoRestricted)
            } else {
                FieldChange::cleared(Field::CeoRestricted, "true".into())
            });
        }

        let name_before = record.text(Field::CeoName);
        let real_before = ceo::real_name(&record);
        let ceo_state = ceo::apply_lookup(
            &mut record,
            external.ceo_restricted,
            &external.text(Field::CeoName),
            &mut audit,
        );
        if record.text(Field::CeoName) != name_before {
            changes.push(match ceo_state {
                NameState::Empty => FieldChange::cleared(Field::CeoName, name_before),
                _ if real_before.is_empty() => FieldChange::filled(Field::CeoName),
                _ => FieldChange::overwritten(Field::CeoName, real_before),
            });
        }

        let seeded = seed_financial_years(
            &mut record.financial_years,
            &external.financial_years,
            target,
        );

        let entity_type = classify_with_lookup(&tax_id, external);
        info!(
            tax_id = %tax_id,
            entity = %entity_type,
            changed = changes.len(),
            seeded = seeded.slots_filled,
            "reconciled registry lookup"
        );

        Ok(Reconciliation {
            ceo_note: ceo::note(external.ceo_restricted, &audit),
            record,
            audit,
            entity_type,
            visibility: Visibility::for_entity(entity_type),
            ceo_state,
            notes: report.notes,
            changes,
            seeded,
            risk_replaced,
            looked_up: true,
            notice: None,
        })
    }

    /// The lookup never produced a response. A 12-digit identifier is then
    /// presumed to belong to a private individual; anything else leaves the
    /// record untouched and reports the failure.
    pub fn reconcile_failure(
        &self,
        local: &LocalRecord,
        audit: &AuditTrail,
        reason: &str,
    ) -> Result<Reconciliation, ReconcileError> {
        let tax_id = TaxId::parse(&local.text(Field::TaxId))?;
        if tax_id.is_personal() {
            warn!(tax_id = %tax_id, reason, "lookup failed, assuming physical person");
            Ok(physical_fallback(local, audit))
        } else {
            Err(ReconcileError::LookupTransportFailure(reason.to_string()))
        }
    }
}

/// Private individual: derive names from the raw name field and mark the
/// record as an individual.
fn physical_fallback(local: &LocalRecord, audit: &AuditTrail) -> Reconciliation {
    let mut record = local.clone();
    let audit = audit.clone();
    let mut changes = Vec::new();

    let titled = title_case(&record.text(Field::Name));
    if !titled.is_empty() {
        let full_name = record.text(Field::FullName);
        if full_name != titled {
            // Derived locally, so the replaced name is not audited.
            record.set(Field::FullName, titled.as_str());
            changes.push(if full_name.is_empty() {
                FieldChange::filled(Field::FullName)
            } else {
                FieldChange::overwritten(Field::FullName, full_name)
            });
        }
        if ceo::real_name(&record).is_empty() {
            record.set(Field::CeoName, titled.as_str());
            changes.push(FieldChange::filled(Field::CeoName));
        }
    }

    if record.is_blank(Field::OkopfName) {
        record.set(Field::OkopfName, INDIVIDUAL_LABEL);
        changes.push(FieldChange::filled(Field::OkopfName));
    }
    let okopf_code = record.text(Field::OkopfCode);
    if !okopf_code.is_empty() {
        record.set(Field::OkopfCode, "");
        changes.push(FieldChange::cleared(Field::OkopfCode, okopf_code));
    }

    info!(changed = changes.len(), "applied physical person fallback");

    Reconciliation {
        ceo_state: NameState::of_record(&record),
        ceo_note: ceo::note(false, &audit),
        record,
        audit,
        entity_type: EntityType::PhysicalPerson,
        visibility: Visibility::for_entity(EntityType::PhysicalPerson),
        notes: BTreeMap::new(),
        changes,
        seeded: SeedReport::default(),
        risk_replaced: false,
        looked_up: false,
        notice: Some(PHYSICAL_PERSON_NOTICE.to_string()),
    }
}

/// `"иВАНОВ  иван"` → `"Иванов Иван"`.
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
