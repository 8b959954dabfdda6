//! Entity classification from the shape of the tax identifier (INN).
//!
//! - 10 digits: legal entity
//! - 12 digits: sole proprietor, or a private individual when the registry
//!   has no match

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::lookup::ExternalLookupResult;

pub const LEGAL_ENTITY_DIGITS: usize = 10;
pub const PERSONAL_DIGITS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    LegalEntity,
    SoleProprietor,
    PhysicalPerson,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegalEntity => "legal_entity",
            Self::SoleProprietor => "sole_proprietor",
            Self::PhysicalPerson => "physical_person",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized tax identifier: ASCII digits only, 10 or 12 of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxId(String);

impl TaxId {
    /// Strip everything but digits and check the length.
    pub fn parse(raw: &str) -> Result<Self, ReconcileError> {
        let digits = digits_only(raw);
        match digits.len() {
            LEGAL_ENTITY_DIGITS | PERSONAL_DIGITS => Ok(Self(digits)),
            n => Err(ReconcileError::InvalidIdentifier { digits: n }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 12-digit form, shared by sole proprietors and private individuals.
    pub fn is_personal(&self) -> bool {
        self.0.len() == PERSONAL_DIGITS
    }

    /// Classification from shape alone.
    pub fn entity_type(&self) -> EntityType {
        if self.is_personal() {
            EntityType::SoleProprietor
        } else {
            EntityType::LegalEntity
        }
    }
}

impl std::fmt::Display for TaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Classify a raw identifier as typed. Called on every identifier edit.
pub fn classify(raw: &str) -> Result<EntityType, ReconcileError> {
    TaxId::parse(raw).map(|id| id.entity_type())
}

/// Entity type once a lookup response exists: the service's own flags take
/// precedence over the identifier shape.
pub fn classify_with_lookup(tax_id: &TaxId, result: &ExternalLookupResult) -> EntityType {
    if result.is_physical_person {
        EntityType::PhysicalPerson
    } else if result.is_sole_proprietor {
        EntityType::SoleProprietor
    } else {
        tax_id.entity_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_is_legal_entity() {
        assert_eq!(classify("7701234567"), Ok(EntityType::LegalEntity));
    }

    #[test]
    fn twelve_digits_is_sole_proprietor() {
        assert_eq!(classify("500100200300"), Ok(EntityType::SoleProprietor));
    }

    #[test]
    fn non_digits_are_stripped() {
        let id = TaxId::parse(" 77-0123 4567 ").unwrap();
        assert_eq!(id.as_str(), "7701234567");
    }

    #[test]
    fn other_lengths_are_invalid() {
        assert_eq!(
            classify("12345"),
            Err(ReconcileError::InvalidIdentifier { digits: 5 })
        );
        assert_eq!(
            classify("77012345671"),
            Err(ReconcileError::InvalidIdentifier { digits: 11 })
        );
        assert_eq!(
            classify(""),
            Err(ReconcileError::InvalidIdentifier { digits: 0 })
        );
    }

    #[test]
    fn lookup_flags_take_precedence() {
        let id = TaxId::parse("7701234567").unwrap();
        let mut result = ExternalLookupResult::default();
        assert_eq!(classify_with_lookup(&id, &result), EntityType::LegalEntity);

        result.is_sole_proprietor = true;
        assert_eq!(classify_with_lookup(&id, &result), EntityType::SoleProprietor);

        result.is_physical_person = true;
        assert_eq!(classify_with_lookup(&id, &result), EntityType::PhysicalPerson);
    }
}
