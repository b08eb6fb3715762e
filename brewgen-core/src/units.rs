//! Unit conversions and fixed brewing constants.
//!
//! Everything in the engine works in metric internally (litres, grams,
//! degrees Celsius). Conversions to the user's display units happen only at
//! the edges: when rendering prompts and when writing sanitized values back
//! into a recipe.

use serde::{Deserialize, Serialize};

pub const LITERS_PER_GALLON: f64 = 3.785_411_784;
pub const GRAMS_PER_OZ: f64 = 28.349_523_125;
pub const GRAMS_PER_LB: f64 = 453.592_37;
pub const GRAMS_PER_KG: f64 = 1000.0;

/// ppm as CaCO3 per German degree of hardness (°dH).
pub const PPM_CACO3_PER_DH: f64 = 17.848;

/// Mash-out is a fixed enzymatic stop, independent of display preferences.
pub const MASH_OUT_TEMP_C: f64 = 78.0;
/// Strike water sits this far above the first saccharification rest.
pub const STRIKE_OFFSET_C: f64 = 3.0;
pub const SACCHARIFICATION_MIN_C: f64 = 60.0;
pub const SACCHARIFICATION_MAX_C: f64 = 75.0;
pub const DEFAULT_SACCHARIFICATION_C: f64 = 66.0;
pub const DEFAULT_REST_MINUTES: u32 = 60;
pub const PROTEIN_REST_C: f64 = 55.0;
pub const MASH_IN_MINUTES: u32 = 10;
pub const MASH_OUT_MINUTES: u32 = 10;

pub const ABV_COEFFICIENT: f64 = 131.25;

/// Measurement system used for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Temperature scale used for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TempUnit {
    #[default]
    C,
    F,
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn gallons_to_liters(gallons: f64) -> f64 {
    gallons * LITERS_PER_GALLON
}

pub fn liters_to_gallons(liters: f64) -> f64 {
    liters / LITERS_PER_GALLON
}

/// Convert a batch size given in the user's system to litres.
pub fn batch_liters(batch_size: f64, system: UnitSystem) -> f64 {
    match system {
        UnitSystem::Metric => batch_size,
        UnitSystem::Imperial => gallons_to_liters(batch_size),
    }
}

/// Convert German degrees of hardness to ppm as CaCO3.
pub fn hardness_dh_to_ppm(degrees: f64) -> f64 {
    degrees * PPM_CACO3_PER_DH
}

/// Alcohol by volume from original and final gravity.
pub fn abv(og: f64, fg: f64) -> f64 {
    (og - fg) * ABV_COEFFICIENT
}

/// Grams represented by one unit of the given mass unit name, if known.
fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "g" | "gr" | "gram" | "grams" | "gramm" => Some(1.0),
        "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" | "kilogramm" => Some(GRAMS_PER_KG),
        "lb" | "lbs" | "pound" | "pounds" => Some(GRAMS_PER_LB),
        "oz" | "ounce" | "ounces" => Some(GRAMS_PER_OZ),
        _ => None,
    }
}

/// Parse an amount string into a decimal value.
///
/// Handles:
/// - Integers: "8" → 8.0
/// - Decimals with either separator: "2.5" / "2,5" → 2.5
/// - Fractions: "1/2" → 0.5
/// - Mixed numbers: "1 1/2" → 1.5
pub fn parse_amount(amount: &str) -> Option<f64> {
    let amount = amount.trim().replace(',', ".");

    if amount.is_empty() {
        return None;
    }

    let parts: Vec<&str> = amount.split_whitespace().collect();
    if parts.len() == 2 {
        let whole: f64 = parts[0].parse().ok()?;
        let frac = parse_fraction(parts[1])?;
        return Some(whole + frac);
    }

    if amount.contains('/') {
        return parse_fraction(&amount);
    }

    amount.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Parse a fraction string like "1/2" or "3/4".
fn parse_fraction(s: &str) -> Option<f64> {
    let (num, denom) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let denom: f64 = denom.trim().parse().ok()?;
    if denom == 0.0 {
        return None;
    }
    Some(num / denom)
}

/// First number appearing in free text ("67 °C", "ca. 152F", "66-67").
pub fn leading_number(text: &str) -> Option<f64> {
    number_span(text).map(|(value, _)| value)
}

/// First number in `text` and the byte offset just past it.
fn number_span(text: &str) -> Option<(f64, usize)> {
    let text = text.replace(',', ".");
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let value = rest[..end].trim_end_matches('.').parse().ok()?;
    Some((value, start + end))
}

/// Parse a display mass such as "4.5 kg", "10 lb 8 oz" or "500g" into grams.
///
/// Anything inside parentheses is ignored so "4.5 kg (9.9 lb)" is not
/// counted twice. Number/unit pairs with an unknown unit are skipped;
/// returns `None` when no pair could be read.
pub fn parse_mass_grams(text: &str) -> Option<f64> {
    let text = text
        .split('(')
        .next()
        .unwrap_or_default()
        .to_lowercase()
        .replace(',', ".");

    let mut total: Option<f64> = None;
    let mut rest = text.as_str();

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let after = &rest[start..];
        let num_len = after
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '/'))
            .unwrap_or(after.len());
        let value = parse_amount(&after[..num_len]);

        let tail = after[num_len..].trim_start();
        let unit_len = tail
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(tail.len());
        let unit = &tail[..unit_len];

        if let (Some(value), Some(factor)) = (value, grams_per_unit(unit)) {
            total = Some(total.unwrap_or(0.0) + value * factor);
        }

        rest = &tail[unit_len..];
    }

    total
}

/// Round to one decimal place and drop a trailing ".0".
pub fn format_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Format grams as a string.
/// For amounts under 10g, shows one decimal place for precision.
/// For larger amounts, rounds to nearest whole number.
pub fn format_grams(grams: f64) -> String {
    if grams < 10.0 {
        format_decimal(grams)
    } else {
        (grams.round() as i64).to_string()
    }
}

/// Format a Celsius temperature in the requested display unit.
pub fn format_temperature(celsius: f64, unit: TempUnit) -> String {
    match unit {
        TempUnit::C => format!("{}°C", format_decimal(celsius)),
        TempUnit::F => format!("{}°F", format_decimal(celsius_to_fahrenheit(celsius))),
    }
}

/// Format a litre volume in the requested unit system.
pub fn format_volume(liters: f64, system: UnitSystem) -> String {
    match system {
        UnitSystem::Metric => format!("{} L", format_decimal(liters)),
        UnitSystem::Imperial => format!("{} gal", format_decimal(liters_to_gallons(liters))),
    }
}

/// Format a gram mass in the requested unit system.
pub fn format_mass(grams: f64, system: UnitSystem) -> String {
    match system {
        UnitSystem::Metric if grams >= GRAMS_PER_KG => {
            format!("{} kg", format_decimal(grams / GRAMS_PER_KG))
        }
        UnitSystem::Metric => format!("{} g", format_grams(grams)),
        UnitSystem::Imperial if grams >= GRAMS_PER_LB => {
            format!("{} lb", format_decimal(grams / GRAMS_PER_LB))
        }
        UnitSystem::Imperial => format!("{} oz", format_decimal(grams / GRAMS_PER_OZ)),
    }
}

/// Read a temperature from display text and return it in Celsius.
///
/// The unit is the marker right after the leading number (or after a
/// range such as "66-67°C"), so "66°C (151°F)" stays Celsius. Without a
/// marker a value above 100 can only be Fahrenheit for mash temperatures,
/// and the user's preference breaks ties.
pub fn parse_temperature_c(text: &str, preferred: TempUnit) -> Option<f64> {
    let (value, end) = number_span(text)?;

    let is_fahrenheit = match unit_marker(&text[end..]) {
        Some(unit) => unit == TempUnit::F,
        None => value > 100.0 || preferred == TempUnit::F,
    };

    Some(if is_fahrenheit {
        fahrenheit_to_celsius(value)
    } else {
        value
    })
}

/// Unit marker at the start of `after`: "°C", " F", "ºF", "deg C", "Celsius".
fn unit_marker(after: &str) -> Option<TempUnit> {
    let mut s = after.trim_start();

    // Skip the upper bound of a range.
    if let Some(upper) = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('\u{2013}'))
        .or_else(|| s.strip_prefix("to "))
    {
        let upper = upper.trim_start();
        if upper.starts_with(|c: char| c.is_ascii_digit()) {
            s = upper.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ',');
            s = s.trim_start();
        }
    }

    let s = s
        .strip_prefix('°')
        .or_else(|| s.strip_prefix('º'))
        .or_else(|| s.strip_prefix("degrees"))
        .or_else(|| s.strip_prefix("deg"))
        .unwrap_or(s)
        .trim_start();

    let lower = s.to_lowercase();
    if lower.starts_with("celsius") {
        return Some(TempUnit::C);
    }
    if lower.starts_with("fahrenheit") {
        return Some(TempUnit::F);
    }

    let mut chars = s.chars();
    let unit = match chars.next()? {
        'C' | 'c' => TempUnit::C,
        'F' | 'f' => TempUnit::F,
        _ => return None,
    };
    // "66 for full body" is not a unit.
    match chars.next() {
        Some(c) if c.is_alphabetic() => None,
        _ => Some(unit),
    }
}
