/// Deterministic group colors and titles
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tab group colors, in hash-index order. Reordering changes every
/// non-overridden domain's color.
pub const PALETTE: [&str; 9] = [
    "blue", "red", "yellow", "green", "pink", "purple", "cyan", "orange", "grey",
];

/// Title and color applied to a tab group, shaped like `tabGroups.update` properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStyle {
    pub title: String,
    pub color: String,
}

impl GroupStyle {
    pub fn for_domain(
        domain: &str,
        colors: &HashMap<String, String>,
        names: &HashMap<String, String>,
    ) -> GroupStyle {
        GroupStyle {
            title: title_for_domain(domain, names),
            color: color_for_domain(domain, colors),
        }
    }
}

fn override_for<'a>(domain: &str, overrides: &'a HashMap<String, String>) -> Option<&'a str> {
    overrides
        .get(domain)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Color for a domain: the user's override verbatim, else a palette entry
/// picked by a stable string hash.
///
/// Overrides are not checked against `PALETTE`.
pub fn color_for_domain(domain: &str, overrides: &HashMap<String, String>) -> String {
    if let Some(color) = override_for(domain, overrides) {
        return color.to_string();
    }

    let index = (domain_hash(domain).unsigned_abs() % PALETTE.len() as u64) as usize;
    PALETTE[index].to_string()
}

/// Rolling `hash = (hash << 5) - hash + unit` over UTF-16 code units.
///
/// Only the shift operand is truncated to 32 bits; the running sum is not,
/// so it is carried in an i64 and can leave the i32 range before the modulo.
fn domain_hash(domain: &str) -> i64 {
    domain.encode_utf16().fold(0i64, |hash, unit| {
        i64::from((hash as i32).wrapping_shl(5)) - hash + i64::from(unit)
    })
}

/// Title for a domain: the user's override, else the domain minus its last label.
///
/// - mail.google.com → mail.google
/// - localhost → localhost
pub fn title_for_domain(domain: &str, overrides: &HashMap<String, String>) -> String {
    if let Some(name) = override_for(domain, overrides) {
        return name.to_string();
    }

    match domain.rsplit_once('.') {
        Some((rest, _tld)) => rest.to_string(),
        None => domain.to_string(),
    }
}
