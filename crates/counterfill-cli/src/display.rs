//! Vertical card display for counterparty records.
//!
//! Renders a record as grouped sections, honouring the visibility rules of
//! its entity type and printing a "was" note under every audited field.

use counterfill_core::ceo::{self, NameState};
use counterfill_core::engine::INDIVIDUAL_LABEL;
use counterfill_core::{
    AuditTrail, EntityType, Field, FinancialYearRecord, LocalRecord, Reconciliation, TaxId,
    Visibility,
};

const MAX_YEARS: usize = 10;

// ── Section groupings ──

const IDENTITY: &[Field] = &[
    Field::TaxId,
    Field::Name,
    Field::FullName,
    Field::Ogrn,
    Field::RegistrationCode,
    Field::Website,
    Field::Country,
    Field::Region,
    Field::Address,
];

const CLASSIFICATION: &[Field] = &[
    Field::TaxRegime,
    Field::OkvedCode,
    Field::OkvedName,
    Field::OkvedVersion,
    Field::OkopfCode,
    Field::OkopfName,
];

const MANAGEMENT: &[Field] = &[
    Field::CeoName,
    Field::CeoPost,
    Field::CeoRecordDate,
    Field::ManagerIsOrg,
];

const RISK: &[Field] = &[
    Field::RiskDisqPersons,
    Field::RiskMassDirectors,
    Field::RiskMassFounders,
    Field::RiskIllegalFin,
    Field::RiskIllegalFinStatus,
    Field::RiskSanctions,
    Field::RiskSanctionsCountries,
    Field::RiskSanctionedFounder,
];

// ── Public API ──

/// Entity type of a stored record, without a lookup at hand.
pub fn entity_type_of(record: &LocalRecord) -> EntityType {
    if record.text(Field::OkopfName) == INDIVIDUAL_LABEL {
        return EntityType::PhysicalPerson;
    }
    TaxId::parse(&record.text(Field::TaxId))
        .map(|id| id.entity_type())
        .unwrap_or(EntityType::LegalEntity)
}

/// Print a stored record as a card.
pub fn print_record_card(record: &LocalRecord, audit: &AuditTrail) {
    let entity = entity_type_of(record);
    let visibility = Visibility::for_entity(entity);
    let restricted = record.get(Field::CeoRestricted).as_flag();

    print_header(record, entity);
    print_fields(record, audit, &visibility, restricted);
}

/// Print the outcome of a reconciliation pass.
pub fn print_reconciliation(out: &Reconciliation) {
    print_header(&out.record, out.entity_type);
    if let Some(notice) = &out.notice {
        println!("! {notice}");
        println!();
    }
    let restricted = out.record.get(Field::CeoRestricted).as_flag();
    print_fields(&out.record, &out.audit, &out.visibility, restricted);

    if out.is_noop() {
        println!("No changes.");
        return;
    }
    println!("Changes");
    for change in &out.changes {
        match &change.previous {
            Some(prev) => println!("  {:<26} {:?} (was {prev})", change.field.key(), change.action),
            None => println!("  {:<26} {:?}", change.field.key(), change.action),
        }
    }
    if out.risk_replaced {
        println!("  {:<26} replaced", "risk_json");
    }
    let seeded = &out.seeded;
    if seeded.blocked_by_persisted {
        println!("  financial years            kept, already saved");
    } else if seeded.slots_filled > 0 {
        print!(
            "  financial years            {} slots, {} values",
            seeded.slots_filled, seeded.values_written
        );
        if seeded.skipped_without_year > 0 {
            print!(" ({} without year skipped)", seeded.skipped_without_year);
        }
        println!();
    }
}

// ── Section rendering ──

fn print_header(record: &LocalRecord, entity: EntityType) {
    let title = [Field::FullName, Field::Name, Field::TaxId]
        .into_iter()
        .map(|f| record.text(f))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "(unnamed)".to_string());
    println!("=== {title} ===");
    println!("{entity}");
    println!();
}

fn print_fields(
    record: &LocalRecord,
    audit: &AuditTrail,
    visibility: &Visibility,
    restricted: bool,
) {
    let hidden = visibility.hidden_fields();
    let shown = |fields: &[Field]| -> Vec<Field> {
        fields.iter().copied().filter(|f| !hidden.contains(f)).collect()
    };

    print_section(record, audit, visibility, "Identity", &shown(IDENTITY));
    print_section(record, audit, visibility, "Classification", &shown(CLASSIFICATION));
    print_management(record, audit, visibility, restricted, &shown(MANAGEMENT));
    print_section(record, audit, visibility, "Risk", RISK);
    print_years(&record.financial_years);
}

fn print_section(
    record: &LocalRecord,
    audit: &AuditTrail,
    visibility: &Visibility,
    header: &str,
    fields: &[Field],
) {
    if fields.iter().all(|&f| record.is_blank(f) && !audit.contains(f.key())) {
        return;
    }
    println!("{header}");
    for &field in fields {
        print_field(record, visibility, field);
        if let Some(note) = audit.note(field.key()) {
            println!("  {:<26} {note}", "");
        }
    }
    println!();
}

fn print_management(
    record: &LocalRecord,
    audit: &AuditTrail,
    visibility: &Visibility,
    restricted: bool,
    fields: &[Field],
) {
    if fields.iter().all(|&f| record.is_blank(f))
        && !restricted
        && !audit.contains(ceo::AUDIT_KEY)
    {
        return;
    }
    println!("Management");
    for &field in fields {
        if field == Field::CeoName {
            let value = record.text(field);
            let marker = if NameState::of(&value).is_highlighted() { " *" } else { "" };
            println!("  {:<26} {value}{marker}", label(visibility, field));
            let note = ceo::note(restricted && visibility.ceo_restricted_note, audit);
            if let Some(note) = note {
                println!("  {:<26} {note}", "");
            }
        } else {
            print_field(record, visibility, field);
        }
    }
    println!();
}

fn print_field(record: &LocalRecord, visibility: &Visibility, field: Field) {
    let value = record.get(field);
    if value.is_empty() {
        return;
    }
    let text = if value.as_flag() {
        "yes".to_string()
    } else {
        value.text()
    };
    println!("  {:<26} {text}", label(visibility, field));
}

fn label(visibility: &Visibility, field: Field) -> &'static str {
    match field {
        Field::Ogrn => visibility.registration_number_label,
        Field::RegistrationCode => visibility.registration_code_label,
        _ => field.key(),
    }
}

// ── Financial years ──

fn print_years(years: &[FinancialYearRecord]) {
    let filled: Vec<&FinancialYearRecord> = years.iter().filter(|fy| !fy.is_blank()).collect();
    if filled.is_empty() {
        return;
    }
    println!("Financial years ({}):", filled.len());
    for fy in filled.iter().take(MAX_YEARS) {
        let year = fy.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
        print!("    {year:<6}");
        for (name, value) in [
            ("revenue", fy.revenue),
            ("net_profit", fy.net_profit),
            ("equity", fy.equity),
            ("payables", fy.payables),
        ] {
            if let Some(v) = value {
                print!("  {name}: {v}");
            }
        }
        println!();
    }
    if filled.len() > MAX_YEARS {
        println!("    ... and {} more", filled.len() - MAX_YEARS);
    }
}
