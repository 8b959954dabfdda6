//! Field reconciliation engine: merges a registry lookup into a locally held
//! counterparty record without destroying what the user entered.

pub mod audit;
pub mod ceo;
pub mod composite;
pub mod date;
pub mod engine;
mod error;
pub mod financial;
pub mod identifier;
pub mod lookup;
pub mod merge;
pub mod policy;
pub mod record;
pub mod seed;
pub mod submission;
pub mod visibility;

pub use audit::AuditTrail;
pub use ceo::NameState;
pub use composite::RegistrationCode;
pub use engine::{Engine, Reconciliation};
pub use error::{ReconcileError, RecordError};
pub use financial::FinancialYearRecord;
pub use identifier::{EntityType, TaxId, classify};
pub use lookup::ExternalLookupResult;
pub use record::{Field, FieldValue, LocalRecord};
pub use seed::SeedTarget;
pub use submission::{Submission, prepare_for_display, prepare_for_submit};
pub use visibility::Visibility;
