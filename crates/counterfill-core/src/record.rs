//! Counterparty record model.
//!
//! A [`LocalRecord`] is a flat map of named scalar fields (string, boolean,
//! number or null) plus two structured members: the risk payload snapshot and
//! the financial-year slots of the editable form. Field names are exposed as
//! the [`Field`] enum so policy tables can refer to them without string typos;
//! keys the engine does not know about are preserved untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;
use crate::financial::FinancialYearRecord;

/// A named field of a counterparty record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    TaxId,
    Ogrn,
    TaxRegime,
    OkvedCode,
    OkvedName,
    OkvedVersion,
    OkopfCode,
    OkopfName,
    /// Combined KPP / OKPO field, see [`crate::composite`].
    RegistrationCode,
    Website,
    Country,
    Address,
    Region,
    /// Raw free-text name as typed by the user.
    Name,
    FullName,
    CeoName,
    CeoPost,
    CeoRecordDate,
    CeoRestricted,
    ManagerIsOrg,
    RiskDisqPersons,
    RiskMassDirectors,
    RiskMassFounders,
    RiskIllegalFin,
    RiskIllegalFinStatus,
    RiskSanctions,
    RiskSanctionsCountries,
    RiskSanctionedFounder,
}

impl Field {
    pub const ALL: &[Field] = &[
        Field::TaxId,
        Field::Ogrn,
        Field::TaxRegime,
        Field::OkvedCode,
        Field::OkvedName,
        Field::OkvedVersion,
        Field::OkopfCode,
        Field::OkopfName,
        Field::RegistrationCode,
        Field::Website,
        Field::Country,
        Field::Address,
        Field::Region,
        Field::Name,
        Field::FullName,
        Field::CeoName,
        Field::CeoPost,
        Field::CeoRecordDate,
        Field::CeoRestricted,
        Field::ManagerIsOrg,
        Field::RiskDisqPersons,
        Field::RiskMassDirectors,
        Field::RiskMassFounders,
        Field::RiskIllegalFin,
        Field::RiskIllegalFinStatus,
        Field::RiskSanctions,
        Field::RiskSanctionsCountries,
        Field::RiskSanctionedFounder,
    ];

    /// Canonical storage key.
    pub fn key(self) -> &'static str {
        match self {
            Self::TaxId => "tax_id",
            Self::Ogrn => "ogrn",
            Self::TaxRegime => "tax_regime",
            Self::OkvedCode => "okved_code",
            Self::OkvedName => "okved_name",
            Self::OkvedVersion => "okved_version",
            Self::OkopfCode => "okopf_code",
            Self::OkopfName => "okopf_name",
            Self::RegistrationCode => "registration_code",
            Self::Website => "website",
            Self::Country => "country",
            Self::Address => "address",
            Self::Region => "region",
            Self::Name => "name",
            Self::FullName => "full_name",
            Self::CeoName => "ceo_name",
            Self::CeoPost => "ceo_post",
            Self::CeoRecordDate => "ceo_record_date",
            Self::CeoRestricted => "ceo_restricted",
            Self::ManagerIsOrg => "manager_is_org",
            Self::RiskDisqPersons => "risk_disq_persons",
            Self::RiskMassDirectors => "risk_mass_directors",
            Self::RiskMassFounders => "risk_mass_founders",
            Self::RiskIllegalFin => "risk_illegal_fin",
            Self::RiskIllegalFinStatus => "risk_illegal_fin_status",
            Self::RiskSanctions => "risk_sanctions",
            Self::RiskSanctionsCountries => "risk_sanctions_countries",
            Self::RiskSanctionedFounder => "risk_sanctioned_founder",
        }
    }

    /// Resolve a key to a field, accepting the lookup service's legacy spellings
    /// (`kpp`, `fullname`, `taxregime`, `ceo`, `adress`).
    pub fn from_key(key: &str) -> Option<Field> {
        if let Some(field) = Self::ALL.iter().copied().find(|f| f.key() == key) {
            return Some(field);
        }
        Self::from_alias(key)
    }

    /// Only the legacy spellings; `None` for canonical keys.
    pub fn from_alias(key: &str) -> Option<Field> {
        match key {
            "kpp" => Some(Self::RegistrationCode),
            "fullname" => Some(Self::FullName),
            "taxregime" => Some(Self::TaxRegime),
            "ceo" => Some(Self::CeoName),
            "adress" => Some(Self::Address),
            "inn" => Some(Self::TaxId),
            _ => None,
        }
    }
}

impl Serialize for Field {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Field::from_key(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown field name: {key}")))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A scalar field value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

static EMPTY: FieldValue = FieldValue::Empty;

impl FieldValue {
    /// Blank text, `false` and null all count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Flag(b) => !b,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Trimmed textual form. Flags render as empty text.
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
            Self::Empty | Self::Flag(_) => String::new(),
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Snapshot of the counterparty being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Structured risk detail, replaced wholesale by every successful lookup.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub risk_json: Value,
    /// Financial-year slots currently present in the form.
    #[serde(default)]
    pub financial_years: Vec<FinancialYearRecord>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl LocalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        self.fields.get(field.key()).unwrap_or(&EMPTY)
    }

    /// Trimmed text of a field; empty when absent.
    pub fn text(&self, field: Field) -> String {
        self.get(field).text()
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.get(field).is_empty()
    }

    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.fields.insert(field.key().to_string(), value.into());
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
