//! One-time seeding of the financial-year slots.
//!
//! A counterparty that already has saved financial years is never
//! auto-populated. Otherwise the first `capacity` external years go into the
//! form's slots in service order, each slot taking values only for its empty
//! fields.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::financial::FinancialYearRecord;

/// Slot counts supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTarget {
    /// Slots present in the editable form.
    pub capacity: usize,
    /// Financial years saved before this editing session.
    pub persisted: usize,
}

impl SeedTarget {
    pub fn new(capacity: usize, persisted: usize) -> Self {
        Self { capacity, persisted }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Slots that received an external record.
    pub slots_filled: usize,
    /// Individual figures written across all slots.
    pub values_written: usize,
    /// External records dropped for lacking a year.
    pub skipped_without_year: usize,
    /// Seeding did not run because years were already persisted.
    pub blocked_by_persisted: bool,
}

/// Fill `slots` from `external`.
///
/// `slots` mirrors the form. Only existing slots are filled; none are added,
/// even when there are fewer than `target.capacity`.
pub fn seed_financial_years(
    slots: &mut [FinancialYearRecord],
    external: &[FinancialYearRecord],
    target: SeedTarget,
) -> SeedReport {
    let mut report = SeedReport::default();
    if target.persisted > 0 {
        debug!(persisted = target.persisted, "financial years already saved, not seeding");
        report.blocked_by_persisted = true;
        return report;
    }

    let count = target.capacity.min(slots.len()).min(external.len());
    for (idx, record) in external.iter().take(count).enumerate() {
        if record.year.is_none() {
            warn!(slot = idx, "skipping financial year without a year");
            report.skipped_without_year += 1;
            continue;
        }
        report.values_written += slots[idx].fill_from(record);
        report.slots_filled += 1;
    }

    debug!(
        slots = report.slots_filled,
        values = report.values_written,
        "financial years seeded"
    );
    report
}
