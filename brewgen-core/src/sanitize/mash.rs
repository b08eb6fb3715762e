//! Mash schedule normalization.
//!
//! The draft supplies the temperature rests. Mash-in and mash-out are always
//! rebuilt here: the strike temperature is anchored to the lowest
//! saccharification rest and mash-out is fixed at 78 °C.

use super::SanitizeReport;
use crate::rules::MashMethod;
use crate::types::MashStep;
use crate::units::{
    format_temperature, parse_temperature_c, TempUnit, DEFAULT_REST_MINUTES,
    DEFAULT_SACCHARIFICATION_C, MASH_IN_MINUTES, MASH_OUT_MINUTES, MASH_OUT_TEMP_C,
    PROTEIN_REST_C, SACCHARIFICATION_MAX_C, SACCHARIFICATION_MIN_C, STRIKE_OFFSET_C,
};

pub const MASH_IN_NAME: &str = "Mash In";
pub const MASH_OUT_NAME: &str = "Mash Out";

const MASH_IN_KEYWORDS: &[&str] = &[
    "mash in",
    "mash-in",
    "mashin",
    "dough in",
    "dough-in",
    "strike",
    "einmaischen",
];

const MASH_OUT_KEYWORDS: &[&str] = &["mash out", "mash-out", "mashout", "abmaischen"];

const PROTEIN_REST_MINUTES: u32 = 15;

fn matches_any(name: &str, keywords: &[&str]) -> bool {
    let name = name.to_lowercase();
    keywords.iter().any(|k| name.contains(k))
}

pub fn is_mash_in(step: &MashStep) -> bool {
    matches_any(&step.step, MASH_IN_KEYWORDS)
}

pub fn is_mash_out(step: &MashStep) -> bool {
    matches_any(&step.step, MASH_OUT_KEYWORDS)
}

fn in_saccharification_band(celsius: f64) -> bool {
    (SACCHARIFICATION_MIN_C..=SACCHARIFICATION_MAX_C).contains(&celsius)
}

/// A rest with its temperature read back to Celsius, when readable.
struct Rest {
    step: MashStep,
    celsius: Option<f64>,
}

impl Rest {
    fn new(step: MashStep, unit: TempUnit) -> Self {
        let celsius = parse_temperature_c(&step.temp, unit);
        Self { step, celsius }
    }

    fn fixed(name: &str, celsius: f64, minutes: u32, description: &str) -> Self {
        Self {
            step: MashStep {
                step: name.to_string(),
                temp: String::new(),
                time: format!("{minutes} min"),
                description: description.to_string(),
            },
            celsius: Some(celsius),
        }
    }

    fn is_saccharification(&self) -> bool {
        self.celsius.is_some_and(in_saccharification_band)
    }
}

fn default_rest() -> Rest {
    Rest::fixed(
        "Saccharification Rest",
        DEFAULT_SACCHARIFICATION_C,
        DEFAULT_REST_MINUTES,
        "Main conversion rest for a balanced, moderately fermentable wort.",
    )
}

fn protein_rest() -> Rest {
    Rest::fixed(
        "Protein Rest",
        PROTEIN_REST_C,
        PROTEIN_REST_MINUTES,
        "Improves head retention and clarity.",
    )
}

fn enforce_method(mut rests: Vec<Rest>, method: MashMethod, report: &mut SanitizeReport) -> Vec<Rest> {
    if rests.is_empty() {
        rests.push(default_rest());
        report.mash_rests_added += 1;
    }

    match method {
        MashMethod::SingleInfusion if rests.len() > 1 => {
            let keep = rests
                .iter()
                .position(Rest::is_saccharification)
                .unwrap_or(0);
            report.mash_rests_removed += rests.len() - 1;
            vec![rests.swap_remove(keep)]
        }
        MashMethod::MultiStep if rests.len() < 2 => {
            rests.insert(0, protein_rest());
            report.mash_rests_added += 1;
            rests
        }
        _ => rests,
    }
}

/// Strike temperature in Celsius for a set of rests.
fn strike_temperature(rests: &[Rest]) -> f64 {
    let anchor = rests
        .iter()
        .filter_map(|r| r.celsius.filter(|c| in_saccharification_band(*c)))
        .min_by(|a, b| a.total_cmp(b))
        .or_else(|| rests.iter().find_map(|r| r.celsius))
        .unwrap_or(DEFAULT_SACCHARIFICATION_C);
    anchor + STRIKE_OFFSET_C
}

/// Rebuild the mash schedule around the draft's rests.
pub fn normalize_mash(
    steps: Vec<MashStep>,
    method: MashMethod,
    unit: TempUnit,
    report: &mut SanitizeReport,
) -> Vec<MashStep> {
    let (boundaries, rests): (Vec<MashStep>, Vec<MashStep>) = steps
        .into_iter()
        .partition(|s| is_mash_in(s) || is_mash_out(s));
    report.mash_steps_stripped += boundaries.len();

    let rests: Vec<Rest> = rests.into_iter().map(|s| Rest::new(s, unit)).collect();
    let rests = enforce_method(rests, method, report);
    let strike = strike_temperature(&rests);

    let mut schedule = Vec::with_capacity(rests.len() + 2);
    schedule.push(MashStep {
        step: MASH_IN_NAME.to_string(),
        temp: format_temperature(strike, unit),
        time: format!("{MASH_IN_MINUTES} min"),
        description: format!(
            "Heat strike water to {} and stir in the grain to settle at the first rest.",
            format_temperature(strike, unit)
        ),
    });
    schedule.extend(rests.into_iter().map(|rest| {
        let mut step = rest.step;
        if let Some(celsius) = rest.celsius {
            step.temp = format_temperature(celsius, unit);
        }
        step
    }));
    schedule.push(MashStep {
        step: MASH_OUT_NAME.to_string(),
        temp: format_temperature(MASH_OUT_TEMP_C, unit),
        time: format!("{MASH_OUT_MINUTES} min"),
        description: "Raise the mash to stop enzyme activity before lautering.".to_string(),
    });
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, temp: &str) -> MashStep {
        MashStep {
            step: name.to_string(),
            temp: temp.to_string(),
            time: "60 min".to_string(),
            description: String::new(),
        }
    }

    fn names(schedule: &[MashStep]) -> Vec<&str> {
        schedule.iter().map(|s| s.step.as_str()).collect()
    }

    #[test]
    fn test_duplicate_boundaries_collapsed() {
        let mut report = SanitizeReport::default();
        let draft = vec![
            step("Mash In", "70°C"),
            step("Dough-in", "69°C"),
            step("Saccharification", "67°C"),
            step("Mash-Out", "76°C"),
            step("Abmaischen", "78°C"),
        ];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::C, &mut report);
        assert_eq!(names(&schedule), vec!["Mash In", "Saccharification", "Mash Out"]);
        assert_eq!(report.mash_steps_stripped, 4);
        assert_eq!(schedule[0].temp, "70°C");
        assert_eq!(schedule[2].temp, "78°C");
    }

    #[test]
    fn test_german_mash_in() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Einmaischen", "60°C"), step("Verzuckerung", "64°C")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::C, &mut report);
        assert_eq!(names(&schedule), vec!["Mash In", "Verzuckerung", "Mash Out"]);
    }

    #[test]
    fn test_empty_schedule_gets_default_rest() {
        let mut report = SanitizeReport::default();
        let schedule = normalize_mash(Vec::new(), MashMethod::SingleInfusion, TempUnit::C, &mut report);
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[1].temp, "66°C");
        assert_eq!(schedule[0].temp, "69°C");
        assert_eq!(report.mash_rests_added, 1);
    }

    #[test]
    fn test_single_infusion_keeps_one_rest() {
        let mut report = SanitizeReport::default();
        let draft = vec![
            step("Protein Rest", "52°C"),
            step("Beta Rest", "63°C"),
            step("Alpha Rest", "72°C"),
        ];
        let schedule = normalize_mash(draft, MashMethod::SingleInfusion, TempUnit::C, &mut report);
        assert_eq!(names(&schedule), vec!["Mash In", "Beta Rest", "Mash Out"]);
        assert_eq!(report.mash_rests_removed, 2);
        assert_eq!(schedule[0].temp, "66°C");
    }

    #[test]
    fn test_multi_step_gains_protein_rest() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Saccharification", "67°C")];
        let schedule = normalize_mash(draft, MashMethod::MultiStep, TempUnit::C, &mut report);
        assert_eq!(
            names(&schedule),
            vec!["Mash In", "Protein Rest", "Saccharification", "Mash Out"]
        );
        assert_eq!(schedule[1].temp, "55°C");
        // Strike is anchored to the saccharification rest, not the protein rest.
        assert_eq!(schedule[0].temp, "70°C");
    }

    #[test]
    fn test_fahrenheit_rendering() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Saccharification", "152°F"), step("Mash Out", "168°F")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::F, &mut report);
        assert_eq!(schedule.last().unwrap().temp, "172.4°F");
        assert_eq!(schedule[1].temp, "152°F");
        // 152 °F = 66.67 °C, strike 69.67 °C = 157.4 °F
        assert_eq!(schedule[0].temp, "157.4°F");
    }

    #[test]
    fn test_celsius_draft_fahrenheit_user() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Saccharification", "65°C")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::F, &mut report);
        assert_eq!(schedule[1].temp, "149°F");
        assert_eq!(schedule[2].temp, "172.4°F");
    }

    #[test]
    fn test_unreadable_temperature_kept_verbatim() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Rest", "warm")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::C, &mut report);
        assert_eq!(schedule[1].temp, "warm");
        assert_eq!(schedule[0].temp, "69°C");
    }

    #[test]
    fn test_dual_unit_rest_keeps_celsius() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Saccharification", "66°C / 151°F")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::C, &mut report);
        assert_eq!(
            names(&schedule),
            vec!["Mash In", "Saccharification", "Mash Out"]
        );
        assert_eq!(schedule[1].temp, "66°C");
        assert_eq!(schedule[0].temp, "69°C");
        assert_eq!(schedule[2].temp, "78°C");
    }

    #[test]
    fn test_fahrenheit_first_dual_unit_rest() {
        let mut report = SanitizeReport::default();
        let draft = vec![step("Saccharification", "152°F (67°C)")];
        let schedule = normalize_mash(draft, MashMethod::BrewersChoice, TempUnit::F, &mut report);
        assert_eq!(schedule[1].temp, "152°F");
        assert_eq!(schedule[0].temp, "157.4°F");
    }
}
