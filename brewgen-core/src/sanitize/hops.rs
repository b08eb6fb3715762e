//! Hop list corrections: separating non-hops, kettle-sour re-tagging and
//! first wort hopping.

use super::SanitizeReport;
use crate::rules::addons::{contains_word, FRUIT_NAMES};
use crate::types::{Extra, ExtraType, Hop};
use crate::units::leading_number;

/// Names that can never be a hop, whatever alpha value the draft claims.
pub const NON_HOP_KEYWORDS: &[&str] = &[
    "puree", "purée", "fruit", "lactose", "sugar", "honey", "syrup", "extract", "essence",
];

pub const FIRST_WORT_LABEL: &str = "First Wort";
const FIRST_WORT_NOTE: &str =
    "First wort hopping: add to the kettle as the wort runs off for a smoother bitterness.";

const PRE_BOIL_KEYWORDS: &[&str] = &["first wort", "fwh", "mash"];

fn has_non_hop_keyword(name: &str) -> bool {
    let name = name.to_lowercase();
    NON_HOP_KEYWORDS.iter().any(|k| contains_word(&name, k))
}

/// A hop must have a positive alpha acid value and a plausible name.
pub fn is_true_hop(hop: &Hop) -> bool {
    hop.alpha.is_some_and(|a| a.is_finite() && a > 0.0) && !has_non_hop_keyword(&hop.name)
}

fn is_fruit_like(name: &str) -> bool {
    let name = name.to_lowercase();
    ["puree", "purée", "fruit"]
        .iter()
        .chain(FRUIT_NAMES)
        .any(|k| contains_word(&name, k))
}

/// Split "500 g" into ("500", "g"). Text without a leading number stays whole.
fn split_amount(amount: &str) -> (String, String) {
    let trimmed = amount.trim();
    let number_end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ',' || c == '/'))
        .unwrap_or(trimmed.len());
    if number_end == 0 {
        return (trimmed.to_string(), String::new());
    }
    (
        trimmed[..number_end].to_string(),
        trimmed[number_end..].trim().to_string(),
    )
}

fn boil_minutes(hop: &Hop) -> Option<f64> {
    hop.boil_time.or_else(|| {
        let time = hop.time.to_lowercase();
        time.contains("min").then(|| leading_number(&time)).flatten()
    })
}

fn relocated_extra(hop: Hop) -> Extra {
    let (amount, unit) = split_amount(&hop.amount);
    let label = hop.time.to_lowercase();
    let usage = if ["dry", "secondary", "ferment", "day"]
        .iter()
        .any(|k| label.contains(k))
    {
        "secondary"
    } else {
        "boil"
    };
    let time = if !hop.time.trim().is_empty() {
        hop.time.clone()
    } else if let Some(minutes) = hop.boil_time {
        format!("{} min", crate::units::format_decimal(minutes))
    } else {
        String::new()
    };
    Extra {
        kind: if is_fruit_like(&hop.name) {
            ExtraType::Fruit
        } else {
            ExtraType::Other
        },
        name: hop.name,
        amount,
        unit,
        usage: usage.to_string(),
        time,
        description: hop.explanation,
    }
}

/// Move entries that are not hops into the extras list.
pub fn separate_hops(
    hops: Vec<Hop>,
    extras: &mut Vec<Extra>,
    report: &mut SanitizeReport,
) -> Vec<Hop> {
    let (kept, relocated): (Vec<Hop>, Vec<Hop>) = hops.into_iter().partition(is_true_hop);
    report.hops_relocated += relocated.len();
    extras.extend(relocated.into_iter().map(relocated_extra));
    kept
}

fn is_pre_boil(hop: &Hop) -> bool {
    let time = hop.time.to_lowercase();
    PRE_BOIL_KEYWORDS.iter().any(|k| time.contains(k))
}

/// Kettle souring: everything added before the boil becomes a 60 minute boil addition.
pub fn retag_pre_boil_hops(hops: &mut [Hop], report: &mut SanitizeReport) {
    for hop in hops.iter_mut().filter(|h| is_pre_boil(h)) {
        hop.time = "60 min".to_string();
        hop.boil_time = Some(60.0);
        report.hops_retagged_for_souring += 1;
    }
}

fn is_sixty_minute(hop: &Hop) -> bool {
    boil_minutes(hop).is_some_and(|m| (m - 60.0).abs() < 0.5)
}

/// Re-tag 60 minute additions as first wort hops.
pub fn promote_first_wort(hops: &mut [Hop], report: &mut SanitizeReport) {
    for hop in hops.iter_mut().filter(|h| is_sixty_minute(h)) {
        hop.time = FIRST_WORT_LABEL.to_string();
        hop.boil_time = Some(0.0);
        if !hop.explanation.to_lowercase().contains("first wort") {
            hop.explanation = if hop.explanation.trim().is_empty() {
                FIRST_WORT_NOTE.to_string()
            } else {
                format!("{} {}", hop.explanation.trim_end(), FIRST_WORT_NOTE)
            };
        }
        report.first_wort_promoted += 1;
    }
}
