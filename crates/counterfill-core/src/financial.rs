//! Financial-year figures and their extraction from accounting statements.
//!
//! The registry returns statements keyed by reporting year, each a map of
//! accounting line codes (RAS form lines) to values. Extended statements wrap
//! the value in an object, so a line may be `123.0` or `{"СумОтч": 123.0}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of most recent years the lookup service reports.
pub const DEFAULT_YEARS_LIMIT: usize = 3;

const REVENUE: &str = "2110";
const NET_PROFIT: &str = "2400";
const EQUITY: &str = "1300";
const SHARE_CAPITAL: &str = "1310";
const PAYABLES: &str = "1520";
const CF_OPERATING: &str = "4100";
const LIABILITIES_LONG: (&str, &[&str]) = ("1400", &["1410", "1420", "1430", "1440", "1450"]);
const LIABILITIES_SHORT: (&str, &[&str]) = ("1500", &["1510", "1520", "1530", "1540", "1550"]);

/// Keys tried, in order, when a line value is an object.
const NUMERIC_KEYS: &[&str] = &["СумОтч", "Итог", "Sum", "Value", "sum", "value"];

/// One reporting year. Every figure is optional; a record without `year` is
/// not meaningful and is never seeded into the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialYearRecord {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub net_profit: Option<f64>,
    #[serde(default)]
    pub equity: Option<f64>,
    #[serde(default)]
    pub share_capital: Option<f64>,
    #[serde(default)]
    pub liabilities_long: Option<f64>,
    #[serde(default)]
    pub liabilities_short: Option<f64>,
    #[serde(default)]
    pub payables: Option<f64>,
    #[serde(default)]
    pub cf_operating: Option<f64>,
}

impl FinancialYearRecord {
    /// Build a record from one year's statement lines.
    pub fn from_statement(year: i32, lines: &Map<String, Value>) -> Self {
        Self {
            year: Some(year),
            revenue: line_value(lines, REVENUE),
            net_profit: line_value(lines, NET_PROFIT),
            equity: line_value(lines, EQUITY),
            share_capital: line_value(lines, SHARE_CAPITAL),
            liabilities_long: line_total(lines, LIABILITIES_LONG.0, LIABILITIES_LONG.1),
            liabilities_short: line_total(lines, LIABILITIES_SHORT.0, LIABILITIES_SHORT.1),
            payables: line_value(lines, PAYABLES),
            cf_operating: line_value(lines, CF_OPERATING),
        }
    }

    /// Lenient construction from an arbitrary JSON value. Fields of the wrong
    /// type are treated as absent; `year` may be a number or a digit string.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let num = |key: &str| obj.get(key).and_then(as_number);
        Self {
            year: obj.get("year").and_then(as_year),
            revenue: num("revenue"),
            net_profit: num("net_profit"),
            equity: num("equity"),
            share_capital: num("share_capital"),
            liabilities_long: num("liabilities_long"),
            liabilities_short: num("liabilities_short"),
            payables: num("payables"),
            cf_operating: num("cf_operating"),
        }
    }

    /// True when no field, `year` included, carries a value.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every value of `other` into the fields of `self` that are still
    /// empty. Returns how many fields were written.
    pub fn fill_from(&mut self, other: &Self) -> usize {
        let mut written = 0;
        written += fill(&mut self.year, other.year);
        written += fill(&mut self.revenue, other.revenue);
        written += fill(&mut self.net_profit, other.net_profit);
        written += fill(&mut self.equity, other.equity);
        written += fill(&mut self.share_capital, other.share_capital);
        written += fill(&mut self.liabilities_long, other.liabilities_long);
        written += fill(&mut self.liabilities_short, other.liabilities_short);
        written += fill(&mut self.payables, other.payables);
        written += fill(&mut self.cf_operating, other.cf_operating);
        written
    }
}

fn fill<T: Copy>(slot: &mut Option<T>, value: Option<T>) -> usize {
    match (slot.is_none(), value) {
        (true, Some(v)) => {
            *slot = Some(v);
            1
        }
        _ => 0,
    }
}

/// Extract year-keyed statements, newest first, keeping at most `limit` years.
///
/// Accepts either `{"data": {"2023": {...}}}` or the year map itself.
/// Non-digit keys and non-object statements are ignored.
pub fn financial_years_from_statements(payload: &Value, limit: usize) -> Vec<FinancialYearRecord> {
    let data = match payload.get("data").and_then(Value::as_object) {
        Some(data) if has_year_keys(data) => data,
        _ => match payload.as_object() {
            Some(root) if has_year_keys(root) => root,
            _ => return Vec::new(),
        },
    };

    let mut years: Vec<i32> = data
        .keys()
        .filter(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|k| k.parse().ok())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));

    years
        .into_iter()
        .filter_map(|year| {
            data.get(&year.to_string())
                .and_then(Value::as_object)
                .map(|lines| FinancialYearRecord::from_statement(year, lines))
        })
        .take(limit)
        .collect()
}

fn has_year_keys(map: &Map<String, Value>) -> bool {
    map.keys()
        .any(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

fn line_value(lines: &Map<String, Value>, code: &str) -> Option<f64> {
    match lines.get(code)? {
        Value::Object(obj) => NUMERIC_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_f64))
            .or_else(|| obj.values().find_map(Value::as_f64)),
        other => other.as_f64(),
    }
}

/// The total line when present, otherwise the sum of whichever component
/// lines are present.
fn line_total(lines: &Map<String, Value>, total: &str, components: &[&str]) -> Option<f64> {
    if let Some(v) = line_value(lines, total) {
        return Some(v);
    }
    let parts: Vec<f64> = components
        .iter()
        .filter_map(|code| line_value(lines, code))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.iter().sum())
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_year(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statement_plain_and_extended_values() {
        let lines = json!({
            "2110": 1000.0,
            "2400": {"СумОтч": 150.0, "СумПред": 90.0},
            "1300": {"other": 7.0},
            "1520": 40.0
        });
        let fy = FinancialYearRecord::from_statement(2023, lines.as_object().unwrap());
        assert_eq!(fy.year, Some(2023));
        assert_eq!(fy.revenue, Some(1000.0));
        assert_eq!(fy.net_profit, Some(150.0));
        assert_eq!(fy.equity, Some(7.0));
        assert_eq!(fy.payables, Some(40.0));
        assert_eq!(fy.cf_operating, None);
    }

    #[test]
    fn liabilities_fall_back_to_component_sum() {
        let lines = json!({"1410": 10.0, "1450": 5.0, "1500": 99.0, "1510": 1.0});
        let fy = FinancialYearRecord::from_statement(2022, lines.as_object().unwrap());
        assert_eq!(fy.liabilities_long, Some(15.0));
        assert_eq!(fy.liabilities_short, Some(99.0));
    }

    #[test]
    fn years_newest_first_and_limited() {
        let payload = json!({"data": {
            "2019": {"2110": 1.0},
            "2021": {"2110": 3.0},
            "2020": {"2110": 2.0},
            "2022": {"2110": 4.0},
            "meta": {"2110": 0.0}
        }});
        let years = financial_years_from_statements(&payload, DEFAULT_YEARS_LIMIT);
        let order: Vec<_> = years.iter().map(|fy| fy.year.unwrap()).collect();
        assert_eq!(order, vec![2022, 2021, 2020]);
        assert_eq!(years[0].revenue, Some(4.0));
    }

    #[test]
    fn years_at_root_are_accepted() {
        let payload = json!({"2023": {"2110": 5.0}});
        assert_eq!(financial_years_from_statements(&payload, 3).len(), 1);
        assert!(financial_years_from_statements(&json!({"data": []}), 3).is_empty());
    }

    #[test]
    fn lenient_value_parsing() {
        let fy = FinancialYearRecord::from_value(&json!({
            "year": "2021",
            "revenue": "12.5",
            "net_profit": [1],
            "equity": null
        }));
        assert_eq!(fy.year, Some(2021));
        assert_eq!(fy.revenue, Some(12.5));
        assert_eq!(fy.net_profit, None);
        assert_eq!(fy.equity, None);
        assert!(FinancialYearRecord::from_value(&json!("junk")).is_blank());
    }

    #[test]
    fn fill_only_writes_empty_fields() {
        let mut slot = FinancialYearRecord {
            revenue: Some(1.0),
            ..Default::default()
        };
        let ext = FinancialYearRecord {
            year: Some(2023),
            revenue: Some(2.0),
            equity: Some(3.0),
            ..Default::default()
        };
        assert_eq!(slot.fill_from(&ext), 2);
        assert_eq!(slot.revenue, Some(1.0));
        assert_eq!(slot.year, Some(2023));
        assert_eq!(slot.equity, Some(3.0));
        assert_eq!(slot.fill_from(&ext), 0);
    }
}
