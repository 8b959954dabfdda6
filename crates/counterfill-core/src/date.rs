//! Storage (`YYYY-MM-DD`) and display (`DD.MM.YYYY`) date formats.
//!
//! Conversion is purely textual. Input that does not match the source
//! pattern is returned unchanged, which callers read as "not convertible".

use std::sync::LazyLock;

use regex::Regex;

static STORAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("storage date regex is valid")
});

static DISPLAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("display date regex is valid")
});

pub fn is_storage_format(s: &str) -> bool {
    STORAGE_RE.is_match(s)
}

pub fn is_display_format(s: &str) -> bool {
    DISPLAY_RE.is_match(s)
}

/// `2024-03-07` → `07.03.2024`.
pub fn to_display(s: &str) -> String {
    match STORAGE_RE.captures(s) {
        Some(c) => format!("{}.{}.{}", &c[3], &c[2], &c[1]),
        None => s.to_string(),
    }
}

/// `07.03.2024` → `2024-03-07`.
pub fn to_storage(s: &str) -> String {
    match DISPLAY_RE.captures(s) {
        Some(c) => format!("{}-{}-{}", &c[3], &c[2], &c[1]),
        None => s.to_string(),
    }
}
