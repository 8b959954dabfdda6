//! Registry lookup payload.
//!
//! The payload is parsed leniently: any JSON document produces an
//! [`ExternalLookupResult`]. Values of an unexpected shape are dropped and
//! the merge treats them as absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::financial::{
    DEFAULT_YEARS_LIMIT, FinancialYearRecord, financial_years_from_statements,
};
use crate::record::{Field, FieldValue};

static EMPTY: FieldValue = FieldValue::Empty;

/// One lookup response, keyed by canonical field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ExternalLookupResult {
    pub not_found: bool,
    pub is_physical_person: bool,
    pub is_sole_proprietor: bool,
    pub ceo_restricted: bool,
    /// Error message reported by the service, if any.
    pub error: Option<String>,
    /// Structured risk detail, stored verbatim.
    pub risk_json: Option<Value>,
    /// Reporting years in service order.
    pub financial_years: Vec<FinancialYearRecord>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ExternalLookupResult {
    /// Builder-style setter used by tests and callers assembling results by hand.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.key().to_string(), value.into());
        self
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        self.fields.get(field.key()).unwrap_or(&EMPTY)
    }

    pub fn text(&self, field: Field) -> String {
        self.get(field).text()
    }

    /// The service answered with an error and without a not-found verdict.
    pub fn is_failure(&self) -> bool {
        !self.not_found && self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    pub fn from_json(json: &str) -> Self {
        serde_json::from_str::<Value>(json)
            .map(Self::from)
            .unwrap_or_default()
    }
}

impl From<Value> for ExternalLookupResult {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };

        let mut fields = BTreeMap::new();
        for (key, raw) in &obj {
            if is_envelope_key(key) {
                continue;
            }
            let Some(value) = coerce(raw) else {
                continue;
            };
            match Field::from_alias(key) {
                // Canonical spelling wins when the service sends both.
                Some(field) => {
                    fields.entry(field.key().to_string()).or_insert(value);
                }
                None => {
                    fields.insert(key.clone(), value);
                }
            }
        }

        // Raw year-keyed statements are accepted when no flattened list is sent.
        let financial_years = match obj.get("financial_years").and_then(Value::as_array) {
            Some(items) => items.iter().map(FinancialYearRecord::from_value).collect(),
            None => obj
                .get("finances")
                .map(|raw| financial_years_from_statements(raw, DEFAULT_YEARS_LIMIT))
                .unwrap_or_default(),
        };

        Self {
            not_found: flag(&obj, &["not_found"]),
            is_physical_person: flag(&obj, &["is_physical_person", "is_physical"]),
            is_sole_proprietor: flag(&obj, &["is_sole_proprietor", "is_ip"]),
            ceo_restricted: flag(&obj, &["ceo_restricted"]),
            error: obj
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string),
            risk_json: obj.get("risk_json").filter(|v| !v.is_null()).cloned(),
            financial_years,
            fields,
        }
    }
}

impl From<ExternalLookupResult> for Value {
    fn from(result: ExternalLookupResult) -> Self {
        let mut obj = Map::new();
        for (key, value) in result.fields {
            obj.insert(key, serde_json::to_value(value).unwrap_or(Value::Null));
        }
        obj.insert("not_found".into(), Value::Bool(result.not_found));
        obj.insert("is_physical_person".into(), Value::Bool(result.is_physical_person));
        obj.insert("is_sole_proprietor".into(), Value::Bool(result.is_sole_proprietor));
        obj.insert("ceo_restricted".into(), Value::Bool(result.ceo_restricted));
        if let Some(error) = result.error {
            obj.insert("error".into(), Value::String(error));
        }
        if let Some(risk) = result.risk_json {
            obj.insert("risk_json".into(), risk);
        }
        obj.insert(
            "financial_years".into(),
            serde_json::to_value(result.financial_years).unwrap_or(Value::Array(Vec::new())),
        );
        Value::Object(obj)
    }
}

fn is_envelope_key(key: &str) -> bool {
    matches!(
        key,
        "not_found"
            | "is_physical"
            | "is_physical_person"
            | "is_ip"
            | "is_sole_proprietor"
            | "ceo_restricted"
            | "error"
            | "risk_json"
            | "financial_years"
            | "finances"
    )
}

/// Scalar coercion: strings, numbers and booleans pass through, string
/// arrays are joined, everything else is absent.
fn coerce(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(FieldValue::Number(n.clone())),
        Value::Bool(b) => Some(FieldValue::Flag(*b)),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            Some(FieldValue::Text(parts.join(", ")))
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn flag(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| match obj.get(*key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_payload_is_canonicalized() {
        let result = ExternalLookupResult::from(json!({
            "fullname": "ООО \"РОМАШКА\"",
            "kpp": "770101001 / 12345678",
            "taxregime": "УСН",
            "ceo": "Иванов Иван Иванович",
            "ceo_name": "Иванов Иван Иванович",
            "is_ip": false,
            "ceo_restricted": false,
            "risk_sanctions": true,
            "financial_years": [{"year": 2023, "revenue": 10.0}]
        }));
        assert_eq!(result.text(Field::FullName), "ООО \"РОМАШКА\"");
        assert_eq!(result.text(Field::RegistrationCode), "770101001 / 12345678");
        assert_eq!(result.text(Field::TaxRegime), "УСН");
        assert_eq!(result.text(Field::CeoName), "Иванов Иван Иванович");
        assert!(result.get(Field::RiskSanctions).as_flag());
        assert!(!result.is_sole_proprietor);
        assert_eq!(result.financial_years.len(), 1);
        assert!(!result.fields.contains_key("kpp"));
    }

    #[test]
    fn canonical_name_beats_alias() {
        let result = ExternalLookupResult::from(json!({"ceo": "old", "ceo_name": "new"}));
        assert_eq!(result.text(Field::CeoName), "new");
    }

    #[test]
    fn physical_person_response() {
        let result = ExternalLookupResult::from_json(
            r#"{"not_found": true, "is_physical": true, "error": "не найдены"}"#,
        );
        assert!(result.not_found);
        assert!(result.is_physical_person);
        assert!(!result.is_failure());
    }

    #[test]
    fn error_without_not_found_is_failure() {
        let result = ExternalLookupResult::from(json!({"error": "Ошибка: timeout"}));
        assert!(result.is_failure());
    }

    #[test]
    fn malformed_payload_never_fails() {
        assert_eq!(ExternalLookupResult::from_json("not json"), ExternalLookupResult::default());
        assert_eq!(ExternalLookupResult::from(json!([1, 2])), ExternalLookupResult::default());

        let result = ExternalLookupResult::from(json!({
            "address": {"nested": true},
            "website": null,
            "financial_years": "oops",
            "risk_sanctions_countries": ["US", 5, "GB"],
            "ogrn": 1027700132195u64
        }));
        assert!(result.get(Field::Address).is_empty());
        assert!(result.get(Field::Website).is_empty());
        assert!(result.financial_years.is_empty());
        assert_eq!(result.text(Field::RiskSanctionsCountries), "US, GB");
        assert_eq!(result.text(Field::Ogrn), "1027700132195");
    }

    #[test]
    fn raw_statements_become_financial_years() {
        let result = ExternalLookupResult::from(json!({
            "finances": {"data": {
                "2021": {"2110": 1.0},
                "2023": {"2110": {"СумОтч": 3.0}},
                "2022": {"2110": 2.0},
                "2020": {"2110": 0.5}
            }}
        }));
        let years: Vec<_> = result.financial_years.iter().map(|fy| fy.year).collect();
        assert_eq!(years, vec![Some(2023), Some(2022), Some(2021)]);
        assert_eq!(result.financial_years[0].revenue, Some(3.0));
        assert!(!result.fields.contains_key("finances"));
    }

    #[test]
    fn flattened_years_win_over_statements() {
        let result = ExternalLookupResult::from(json!({
            "financial_years": [{"year": 2024}],
            "finances": {"2023": {"2110": 1.0}}
        }));
        assert_eq!(result.financial_years.len(), 1);
        assert_eq!(result.financial_years[0].year, Some(2024));
    }

    #[test]
    fn deserializes_through_serde() {
        let result: ExternalLookupResult =
            serde_json::from_str(r#"{"address": "Moscow", "is_ip": 1}"#).unwrap();
        assert_eq!(result.text(Field::Address), "Moscow");
        assert!(result.is_sole_proprietor);
    }
}
