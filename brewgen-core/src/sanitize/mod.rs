//! Recipe sanitizer: turns an untrusted draft into a [`SanitizedRecipe`].
//!
//! The passes run in a fixed order and each one records what it changed in
//! a [`SanitizeReport`]. Nothing here fails; anomalies are corrected or left
//! as they were.

pub mod addons;
pub mod hops;
pub mod mash;
pub mod volumes;

use serde::Serialize;

use crate::rules::{DerivedConstraints, WaterDirective};
use crate::types::{Expertise, ExtraType, Recipe, RecipeRequest, SanitizedRecipe};
use crate::units::leading_number;
use crate::water::calculate_additions;

/// IBU at or above which 60 minute additions become first wort hops.
pub const FIRST_WORT_IBU_THRESHOLD: f64 = 50.0;

/// Statistics about the corrections applied to one draft.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SanitizeReport {
    pub mash_steps_stripped: usize,
    pub mash_rests_added: usize,
    pub mash_rests_removed: usize,
    pub hops_relocated: usize,
    pub add_on_entries_removed: usize,
    pub hops_retagged_for_souring: usize,
    pub first_wort_promoted: usize,
    pub carbonation_defaulted: bool,
    pub conditioning_adjusted: bool,
    pub water_agents_replaced: usize,
    pub water_agents_added: usize,
}

impl SanitizeReport {
    /// Number of individual corrections, volumes excluded since they are
    /// always recalculated.
    pub fn total_corrections(&self) -> usize {
        self.mash_steps_stripped
            + self.mash_rests_added
            + self.mash_rests_removed
            + self.hops_relocated
            + self.add_on_entries_removed
            + self.hops_retagged_for_souring
            + self.first_wort_promoted
            + usize::from(self.carbonation_defaulted)
            + usize::from(self.conditioning_adjusted)
            + self.water_agents_replaced
            + self.water_agents_added
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOutput {
    pub recipe: SanitizedRecipe,
    pub report: SanitizeReport,
}

fn wants_first_wort(request: &RecipeRequest, constraints: &DerivedConstraints, draft: &Recipe) -> bool {
    if constraints.is_kettle_sour() {
        return false;
    }
    let ibu = constraints
        .targets
        .ibu
        .or_else(|| leading_number(&draft.specs.ibu));
    request.expertise == Expertise::Expert || ibu.is_some_and(|i| i >= FIRST_WORT_IBU_THRESHOLD)
}

fn apply_carbonation(recipe: &mut Recipe, constraints: &DerivedConstraints, report: &mut SanitizeReport) {
    let valid = recipe
        .specs
        .carbonation
        .is_some_and(|c| c.is_finite() && c > 0.0);
    if !valid {
        recipe.specs.carbonation = Some(constraints.style.rules.carbonation);
        report.carbonation_defaulted = true;
    }
}

fn apply_conditioning(recipe: &mut Recipe, constraints: &DerivedConstraints, report: &mut SanitizeReport) {
    let bounds = constraints.conditioning;
    let mut min = recipe.conditioning_days_min.unwrap_or(bounds.min_days);
    let mut max = recipe.conditioning_days_max.unwrap_or(bounds.max_days);
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    if recipe.conditioning_days_min != Some(min) || recipe.conditioning_days_max != Some(max) {
        report.conditioning_adjusted = true;
    }
    recipe.conditioning_days_min = Some(min);
    recipe.conditioning_days_max = Some(max);
}

fn apply_water_override(recipe: &mut Recipe, constraints: &DerivedConstraints, report: &mut SanitizeReport) {
    let WaterDirective::Exact { profile: source } = &constraints.water else {
        return;
    };
    let Some(target) = recipe.water_profile.as_ref().and_then(|w| w.to_minerals()) else {
        tracing::debug!("No complete target water profile in draft, keeping water agents");
        return;
    };

    let before = recipe.extras.len();
    recipe.extras.retain(|e| e.kind != ExtraType::WaterAgent);
    report.water_agents_replaced = before - recipe.extras.len();

    let additions = calculate_additions(source, &target, constraints.batch_liters);
    report.water_agents_added = additions.len();
    recipe.extras.extend(additions.into_iter().map(Into::into));
}

/// Run every correction pass over a draft.
pub fn sanitize(
    draft: Recipe,
    request: &RecipeRequest,
    constraints: &DerivedConstraints,
) -> SanitizedOutput {
    let mut report = SanitizeReport::default();
    let mut recipe = draft;

    recipe.mash_schedule = mash::normalize_mash(
        std::mem::take(&mut recipe.mash_schedule),
        constraints.mash.method,
        request.temp_unit,
        &mut report,
    );

    recipe.hops = hops::separate_hops(
        std::mem::take(&mut recipe.hops),
        &mut recipe.extras,
        &mut report,
    );

    addons::enforce_add_ons(&mut recipe, &constraints.excluded_add_ons, &mut report);
    if constraints.is_kettle_sour() {
        hops::retag_pre_boil_hops(&mut recipe.hops, &mut report);
    }

    if wants_first_wort(request, constraints, &recipe) {
        hops::promote_first_wort(&mut recipe.hops, &mut report);
    }

    let grain_kg = volumes::grain_mass_kg(&recipe.malts);
    let water = volumes::water_volumes(request.equipment, grain_kg, constraints.batch_liters);
    let (mash_water, sparge_water) = volumes::render_volumes(request.equipment, water, request.units);
    recipe.specs.mash_water = mash_water;
    recipe.specs.sparge_water = sparge_water;

    apply_carbonation(&mut recipe, constraints, &mut report);
    apply_conditioning(&mut recipe, constraints, &mut report);
    apply_water_override(&mut recipe, constraints, &mut report);

    tracing::info!(
        corrections = report.total_corrections(),
        mash_steps_stripped = report.mash_steps_stripped,
        hops_relocated = report.hops_relocated,
        add_on_entries_removed = report.add_on_entries_removed,
        first_wort_promoted = report.first_wort_promoted,
        water_agents_added = report.water_agents_added,
        grain_kg,
        "Sanitized recipe draft"
    );

    SanitizedOutput {
        recipe: SanitizedRecipe::new(recipe),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::derive_constraints;
    use crate::types::{
        AddOnFlags, Equipment, Extra, Hop, Malt, MashStep, SourceWaterProfile, TargetValue,
        WaterProfile,
    };
    use crate::units::{TempUnit, UnitSystem};
    use crate::water::MineralProfile;

    fn request(style: &str, expertise: Expertise) -> RecipeRequest {
        RecipeRequest {
            expertise,
            equipment: Equipment::AllInOne,
            beer_style: style.to_string(),
            flavor_profile: String::new(),
            units: UnitSystem::Metric,
            temp_unit: TempUnit::C,
            batch_size: 20.0,
            target_abv: TargetValue::Auto,
            target_ibu: TargetValue::Auto,
            target_color: TargetValue::Auto,
            source_water_profile: None,
            add_ons: AddOnFlags::default(),
        }
    }

    fn hop(name: &str, time: &str, boil_time: f64) -> Hop {
        Hop {
            name: name.to_string(),
            amount: "20 g".to_string(),
            time: time.to_string(),
            boil_time: Some(boil_time),
            alpha: Some(10.0),
            ..Default::default()
        }
    }

    fn draft() -> Recipe {
        Recipe {
            name: "Test".to_string(),
            malts: vec![Malt {
                name: "Pale".to_string(),
                amount: "5 kg".to_string(),
                ..Default::default()
            }],
            hops: vec![
                hop("Magnum", "60 min", 60.0),
                hop("Citra", "Dry Hop Day 3", 0.0),
            ],
            mash_schedule: vec![MashStep {
                step: "Mash In".to_string(),
                temp: "72°C".to_string(),
                ..Default::default()
            }],
            conditioning_days_min: Some(21),
            conditioning_days_max: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_pass() {
        let request = request("American Pale Ale", Expertise::Intermediate);
        let constraints = derive_constraints(&request);
        let output = sanitize(draft(), &request, &constraints);
        let recipe = &output.recipe;

        assert_eq!(recipe.mash_schedule.len(), 3);
        assert_eq!(recipe.mash_schedule[0].temp, "69°C");
        assert_eq!(recipe.hops.len(), 1);
        assert_eq!(recipe.hops[0].time, "60 min");
        assert_eq!(recipe.specs.mash_water, "18.9 L");
        assert_eq!(recipe.specs.sparge_water, "8.1 L");
        assert_eq!(recipe.specs.carbonation, Some(4.6));
        assert_eq!(recipe.conditioning_days_min, Some(10));
        assert_eq!(recipe.conditioning_days_max, Some(21));

        let report = &output.report;
        assert_eq!(report.mash_steps_stripped, 1);
        assert_eq!(report.mash_rests_added, 1);
        assert_eq!(report.add_on_entries_removed, 1);
        assert!(report.carbonation_defaulted);
        assert!(report.conditioning_adjusted);
        assert_eq!(report.first_wort_promoted, 0);
    }

    #[test]
    fn test_expert_gets_first_wort() {
        let request = request("American Pale Ale", Expertise::Expert);
        let constraints = derive_constraints(&request);
        let output = sanitize(draft(), &request, &constraints);
        assert_eq!(output.recipe.hops[0].time, hops::FIRST_WORT_LABEL);
        assert_eq!(output.report.first_wort_promoted, 1);
    }

    #[test]
    fn test_high_ibu_draft_gets_first_wort() {
        let request = request("West Coast IPA", Expertise::Intermediate);
        let constraints = derive_constraints(&request);
        let mut recipe = draft();
        recipe.specs.ibu = "65 IBU".to_string();
        let output = sanitize(recipe, &request, &constraints);
        assert_eq!(output.report.first_wort_promoted, 1);
    }

    #[test]
    fn test_kettle_sour_never_first_wort() {
        let request = request("Berliner Weisse", Expertise::Expert);
        let constraints = derive_constraints(&request);
        assert!(constraints.is_kettle_sour());
        let mut recipe = draft();
        recipe.hops = vec![hop("Hallertau", "First Wort", 0.0)];
        let output = sanitize(recipe, &request, &constraints);
        assert_eq!(output.recipe.hops[0].time, "60 min");
        assert_eq!(output.report.hops_retagged_for_souring, 1);
        assert_eq!(output.report.first_wort_promoted, 0);
    }

    #[test]
    fn test_water_override() {
        let mut request = request("German Pilsner", Expertise::Expert);
        request.source_water_profile = Some(SourceWaterProfile::Expert(MineralProfile {
            ca: 10.0,
            mg: 2.0,
            na: 5.0,
            cl: 10.0,
            so4: 10.0,
            hco3: 20.0,
            ph: None,
        }));
        let constraints = derive_constraints(&request);

        let mut recipe = draft();
        recipe.extras = vec![
            Extra {
                name: "Gypsum".to_string(),
                amount: "12".to_string(),
                unit: "g".to_string(),
                kind: ExtraType::WaterAgent,
                ..Default::default()
            },
            Extra {
                name: "Yeast nutrient".to_string(),
                kind: ExtraType::Nutrient,
                ..Default::default()
            },
        ];
        recipe.water_profile = Some(WaterProfile {
            ca: Some(60.0),
            mg: Some(5.0),
            na: Some(10.0),
            cl: Some(60.0),
            so4: Some(60.0),
            hco3: Some(20.0),
            ..Default::default()
        });

        let output = sanitize(recipe, &request, &constraints);
        let expected: Vec<Extra> = calculate_additions(
            &MineralProfile {
                ca: 10.0,
                mg: 2.0,
                na: 5.0,
                cl: 10.0,
                so4: 10.0,
                hco3: 20.0,
                ph: None,
            },
            &output.recipe.water_profile.as_ref().unwrap().to_minerals().unwrap(),
            20.0,
        )
        .into_iter()
        .map(Into::into)
        .collect();
        assert!(!expected.is_empty());

        let agents: Vec<Extra> = output
            .recipe
            .extras
            .iter()
            .filter(|e| e.kind == ExtraType::WaterAgent)
            .cloned()
            .collect();
        assert_eq!(agents, expected);
        assert_eq!(output.report.water_agents_replaced, 1);
        assert!(output.recipe.extras.iter().any(|e| e.name == "Yeast nutrient"));
    }

    #[test]
    fn test_incomplete_target_keeps_agents() {
        let mut request = request("German Pilsner", Expertise::Expert);
        request.source_water_profile = Some(SourceWaterProfile::Expert(MineralProfile::default()));
        let constraints = derive_constraints(&request);
        let mut recipe = draft();
        recipe.extras = vec![Extra {
            name: "Gypsum".to_string(),
            kind: ExtraType::WaterAgent,
            ..Default::default()
        }];
        recipe.water_profile = Some(WaterProfile {
            ca: Some(60.0),
            ..Default::default()
        });
        let output = sanitize(recipe, &request, &constraints);
        assert_eq!(output.recipe.extras.len(), 1);
        assert_eq!(output.report.water_agents_replaced, 0);
    }
}
