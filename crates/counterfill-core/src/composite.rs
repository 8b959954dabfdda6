//! The combined registration-code field.
//!
//! A legal entity's form shows KPP (9 digits) and OKPO in one text field,
//! `"770101001 / 12345678"`; a sole proprietor has only OKPO. Users and the
//! registry both produce either order, or a single code.
//!
//! # Disambiguation
//!
//! - One part: 9 digits is KPP, anything else is OKPO.
//! - Two parts: whichever part alone has 9 digits is KPP.
//! - Two parts where both or neither have 9 digits: positional, first is KPP.
//!   This fallback is best-effort and can mis-assign.

use serde::{Deserialize, Serialize};

pub const DELIMITER: char = '/';
pub const KPP_DIGITS: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCode {
    pub kpp: String,
    pub okpo: String,
}

impl RegistrationCode {
    pub fn parse(text: &str) -> Self {
        let raw = text.trim();
        if raw.is_empty() {
            return Self::default();
        }

        let mut parts = raw.split(DELIMITER).map(digits);
        let first = parts.next().unwrap_or_default();
        let Some(second) = parts.next() else {
            return if first.len() == KPP_DIGITS {
                Self {
                    kpp: first,
                    okpo: String::new(),
                }
            } else {
                Self {
                    kpp: String::new(),
                    okpo: first,
                }
            };
        };

        match (first.len() == KPP_DIGITS, second.len() == KPP_DIGITS) {
            (false, true) => Self {
                kpp: second,
                okpo: first,
            },
            _ => Self {
                kpp: first,
                okpo: second,
            },
        }
    }

    /// `"KPP / OKPO"`, or whichever code is present, or empty.
    pub fn format(&self) -> String {
        let kpp = digits(&self.kpp);
        let okpo = digits(&self.okpo);
        match (kpp.is_empty(), okpo.is_empty()) {
            (false, false) => format!("{kpp} / {okpo}"),
            (false, true) => kpp,
            (true, false) => okpo,
            (true, true) => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kpp.is_empty() && self.okpo.is_empty()
    }

    /// Whether replacing `self` with `next` changes something meaningful:
    /// a different KPP, or an OKPO replaced by a different OKPO. Gaining or
    /// losing only an OKPO is not a meaningful change.
    pub fn differs_meaningfully(&self, next: &Self) -> bool {
        let kpp_changed = self.kpp != next.kpp;
        let okpo_replaced =
            !self.okpo.is_empty() && !next.okpo.is_empty() && self.okpo != next.okpo;
        kpp_changed || okpo_replaced
    }
}

impl std::fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
