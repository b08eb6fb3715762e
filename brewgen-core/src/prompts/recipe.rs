//! Prompt template for drafting a brewing recipe.
//!
//! The system text fixes the JSON shape of the draft. The user text renders
//! the derived directives as labelled blocks; blocks that do not apply to the
//! request are left out entirely.

use serde::Serialize;

use crate::rules::{
    AddOnDirective, AddOnStage, DerivedConstraints, MashMethod, MashWater, WaterDirective,
    YeastForm,
};
use crate::types::{AddOn, Expertise, RecipeRequest};
use crate::units::{
    format_decimal, format_mass, format_temperature, format_volume, TempUnit, UnitSystem,
    PROTEIN_REST_C,
};

/// Prompt name, used in logs.
pub const RECIPE_PROMPT_NAME: &str = "generate_recipe";

/// Model input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPrompt {
    pub system_text: String,
    pub user_text: String,
}

const SYSTEM_PROMPT: &str = r#"You are an experienced brewmaster writing precise, brewable beer recipes for homebrewers and professional brewers.

Return the recipe as a single JSON object with this exact structure:
{
  "name": "Recipe name",
  "description": "Two or three sentences about the beer",
  "specs": {
    "og": "1.052", "fg": "1.012", "abv": "5.3%", "ibu": "35", "srm": "6",
    "mash_water": "", "sparge_water": "",
    "carbonation": 5.0
  },
  "conditioning_days_min": 14,
  "conditioning_days_max": 21,
  "malts": [{"name": "Pale Ale malt", "amount": "4.5 kg", "amount_grams": 4500, "explanation": "Base malt"}],
  "hops": [{"name": "Cascade", "amount": "25 g", "amount_grams": 25, "time": "60 min", "boil_time": 60, "alpha": 6.5, "explanation": "Bittering"}],
  "yeast": {"name": "SafAle US-05", "type": "dry", "amount": "1 packet", "explanation": "Clean fermentation"},
  "extras": [{"name": "Gypsum", "amount": "2", "unit": "g", "type": "water_agent", "use": "mash", "time": "mash", "description": "Accentuates hop bitterness"}],
  "mash_schedule": [{"step": "Saccharification Rest", "temp": "66°C", "time": "60 min", "description": "Balanced fermentability"}],
  "waterProfile": {"ca": 80, "mg": 10, "na": 15, "cl": 60, "so4": 150, "hco3": 30, "ph": 5.4, "description": "Target profile"},
  "fermentation_instructions": ["Pitch at 18°C", "Hold for 10 days"],
  "fermentationSchedule": [{"step": "Primary", "temp": "18°C", "duration": "10 days", "description": "Main fermentation"}],
  "shopping_list": [{"name": "Pale Ale malt", "amount": "4.5 kg", "category": "malt"}],
  "notes": "Optional brewing tips"
}

Rules:
- Every hop entry must carry a numeric alpha acid percentage in "alpha". Fruit, sugars, lactose, syrups and extracts are extras, never hops.
- Extra "type" is one of: water_agent, process_aid, spice, herb, fruit, sugar, nutrient, other.
- "mash_schedule" lists only the temperature rests. Do not include mash-in or mash-out steps.
- Leave "mash_water" and "sparge_water" empty; they are calculated separately.
- Only include optional ingredients and techniques that the brewer explicitly requested.
- Return ONLY the JSON object, no other text"#;

fn expertise_label(expertise: Expertise) -> &'static str {
    match expertise {
        Expertise::Beginner => "beginner",
        Expertise::Intermediate => "intermediate",
        Expertise::Expert => "expert",
    }
}

fn overview_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> String {
    let mut lines = vec![
        format!("Create a {} recipe.", request.beer_style.trim()),
        format!(
            "Style category: {}",
            constraints.style.category.label()
        ),
    ];
    let flavor = request.flavor_profile.trim();
    if !flavor.is_empty() {
        lines.push(format!("Flavor profile: {flavor}"));
    }
    lines.push(format!(
        "Brewer: {}, brewhouse efficiency {}%",
        expertise_label(request.expertise),
        constraints.efficiency_pct
    ));
    lines.push(format!(
        "Batch size: {}",
        format_volume(constraints.batch_liters, request.units)
    ));
    lines.push(format!(
        "Write all amounts in {} units and all temperatures in °{}.",
        match request.units {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        },
        match request.temp_unit {
            TempUnit::C => "C",
            TempUnit::F => "F",
        }
    ));
    lines.join("\n")
}

fn targets_block(constraints: &DerivedConstraints) -> Option<String> {
    let targets = &constraints.targets;
    let mut lines = Vec::new();
    if let Some(abv) = targets.abv {
        lines.push(format!("- ABV: {}%", format_decimal(abv)));
    }
    if let Some(ibu) = targets.ibu {
        lines.push(format!("- IBU: {}", format_decimal(ibu)));
    }
    if let Some(color) = targets.color {
        lines.push(format!("- Color: {} SRM", format_decimal(color)));
    }
    (!lines.is_empty()).then(|| format!("TARGETS:\n{}", lines.join("\n")))
}

fn style_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> String {
    let rules = constraints.style.rules;
    let mut lines = vec![
        "STYLE GUIDELINES:".to_string(),
        format!("- Base malts: {}", rules.base_malts.join(", ")),
        format!(
            "- Specialty malts at most {}% of the grist",
            rules.specialty_malt_max_pct
        ),
        format!(
            "- Fermentation temperature {} to {}",
            format_temperature(rules.ferment_temp_c.0, request.temp_unit),
            format_temperature(rules.ferment_temp_c.1, request.temp_unit)
        ),
        format!("- IBU {}-{}, SRM {}-{}", rules.ibu_range.0, rules.ibu_range.1, rules.srm_range.0, rules.srm_range.1),
        format!("- Carbonation {} g CO2/L", format_decimal(rules.carbonation)),
    ];
    lines.extend(rules.notes.iter().map(|note| format!("- {note}")));
    lines.join("\n")
}

fn mash_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> String {
    let method = match constraints.mash.method {
        MashMethod::SingleInfusion => {
            "Single infusion mash: exactly one saccharification rest.".to_string()
        }
        MashMethod::MultiStep => format!(
            "Step mash with at least two rests (for example a protein rest at {} before saccharification).",
            format_temperature(PROTEIN_REST_C, request.temp_unit)
        ),
        MashMethod::BrewersChoice => "Choose the mash schedule that best suits the style.".to_string(),
    };
    let water = match constraints.mash.water {
        MashWater::FullVolume => "Full-volume mash in a single pot: no sparge.",
        MashWater::Sparge => "Mash and sparge; the water split is calculated for you.",
    };
    format!("MASH:\n- {method}\n- {water}")
}

fn yeast_block(constraints: &DerivedConstraints, request: &RecipeRequest) -> String {
    let yeast = &constraints.yeast;
    let mut lines = vec!["YEAST:".to_string()];
    if let Some(required) = yeast.required {
        lines.push(format!("- Use {required}."));
    } else {
        match yeast.form {
            YeastForm::DryOnly => lines.push(format!(
                "- Dry yeast only (for example {}). No liquid cultures.",
                yeast.category.dry_example()
            )),
            YeastForm::DryOrLiquid => lines.push(format!(
                "- Dry or liquid yeast (for example {} or {}).",
                yeast.category.dry_example(),
                yeast.category.liquid_example()
            )),
        }
    }
    if let Some(starter) = yeast.starter_liters {
        lines.push(format!(
            "- If using liquid yeast, make a {} starter.",
            format_volume(starter, request.units)
        ));
    }
    lines.join("\n")
}

fn hops_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> String {
    let hops = &constraints.hops;
    let mut lines = vec![
        "HOPS:".to_string(),
        format!("- {}", hops.technique.guidance()),
    ];
    if let Some(ceiling) = hops.ceiling_grams {
        lines.push(format!(
            "- Total hops must not exceed {}.",
            format_mass(ceiling, request.units)
        ));
    }
    if hops.boil_only_after_souring {
        lines.push(
            "- All hops go into the boil after kettle souring. No first wort or mash hops."
                .to_string(),
        );
    }
    lines.join("\n")
}

fn sour_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> Option<String> {
    let plan = constraints.sour_plan.as_ref()?;
    let mut lines = vec!["SOURING METHOD:".to_string(), plan.method.to_string()];
    lines.push("Fermentation schedule:".to_string());
    for step in &plan.steps {
        lines.push(format!(
            "- {}: {} for {}-{} days. {}",
            step.step,
            format_temperature(step.temp_c, request.temp_unit),
            step.days.0,
            step.days.1,
            step.description
        ));
    }
    Some(lines.join("\n"))
}

fn stage_text(stage: AddOnStage, request: &RecipeRequest) -> String {
    match stage {
        AddOnStage::Boil { minutes } => format!("boil, {minutes} min before flameout"),
        AddOnStage::Whirlpool { temp_c, minutes } => format!(
            "whirlpool at {} for {minutes} min",
            format_temperature(temp_c, request.temp_unit)
        ),
        AddOnStage::DryHop { day } => format!("dry hop on fermentation day {day}"),
        AddOnStage::Secondary => "secondary".to_string(),
        AddOnStage::Packaging => "at packaging".to_string(),
    }
}

fn add_on_line(directive: &AddOnDirective, request: &RecipeRequest) -> String {
    let amount = directive
        .amount_grams
        .map(|g| format!("{} ", format_mass(g, request.units)))
        .unwrap_or_default();
    format!(
        "- {}{} ({}). {}",
        amount,
        directive.ingredient,
        stage_text(directive.stage, request),
        directive.note
    )
}

fn add_ons_block(request: &RecipeRequest, constraints: &DerivedConstraints) -> Option<String> {
    if constraints.add_ons.is_empty() {
        return None;
    }
    let mut lines = vec!["REQUIRED ADDITIONS (include every one of these):".to_string()];
    lines.extend(
        constraints
            .add_ons
            .iter()
            .map(|directive| add_on_line(directive, request)),
    );
    Some(lines.join("\n"))
}

fn excluded_block(constraints: &DerivedConstraints) -> Option<String> {
    if constraints.excluded_add_ons.is_empty() {
        return None;
    }
    let names: Vec<&str> = constraints
        .excluded_add_ons
        .iter()
        .map(|add_on| add_on.label())
        .collect();
    let mut text = format!(
        "FORBIDDEN (the brewer did not ask for these, even if the style usually has them): {}.",
        names.join(", ")
    );
    if constraints.excluded_add_ons.contains(&AddOn::DryHop) {
        text.push_str(" Do not dry hop.");
    }
    Some(text)
}

fn water_block(constraints: &DerivedConstraints) -> Option<String> {
    let text = match &constraints.water {
        WaterDirective::Exact { profile } => format!(
            "Source water (lab report, ppm): Ca {}, Mg {}, Na {}, Cl {}, SO4 {}, HCO3 {}. \
Propose a target waterProfile for the style; salt additions are calculated from it.",
            format_decimal(profile.ca),
            format_decimal(profile.mg),
            format_decimal(profile.na),
            format_decimal(profile.cl),
            format_decimal(profile.so4),
            format_decimal(profile.hco3)
        ),
        WaterDirective::Basic { hardness_ppm, ph } => {
            let ph = ph
                .map(|ph| format!(", pH {}", format_decimal(ph)))
                .unwrap_or_default();
            format!(
                "Source water: total hardness about {} ppm as CaCO3{ph}. \
Suggest a target waterProfile and water_agent extras to reach it.",
                format_decimal(*hardness_ppm)
            )
        }
        WaterDirective::Location { location } => format!(
            "Source water: typical tap water in {location}. \
Estimate its profile, then suggest a target waterProfile and water_agent extras."
        ),
        WaterDirective::None => return None,
    };
    Some(format!("WATER:\n{text}"))
}

fn conditioning_block(constraints: &DerivedConstraints) -> String {
    format!(
        "CONDITIONING: between {} and {} days.",
        constraints.conditioning.min_days, constraints.conditioning.max_days
    )
}

/// Compose the system and user text for a recipe request.
pub fn compose_prompt(request: &RecipeRequest, constraints: &DerivedConstraints) -> ComposedPrompt {
    let blocks = [
        Some(overview_block(request, constraints)),
        targets_block(constraints),
        Some(style_block(request, constraints)),
        Some(mash_block(request, constraints)),
        Some(yeast_block(constraints, request)),
        Some(hops_block(request, constraints)),
        sour_block(request, constraints),
        add_ons_block(request, constraints),
        excluded_block(constraints),
        water_block(constraints),
        Some(conditioning_block(constraints)),
    ];

    let user_text = blocks.into_iter().flatten().collect::<Vec<_>>().join("\n\n");

    ComposedPrompt {
        system_text: SYSTEM_PROMPT.to_string(),
        user_text,
    }
}
