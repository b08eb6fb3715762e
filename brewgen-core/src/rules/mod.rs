//! Rule derivation: turn a request into structured brewing directives.
//!
//! [`derive_constraints`] decides *what* the recipe must respect. Rendering
//! those decisions into model input is the prompt composer's job.

pub mod addons;
pub mod sour;
pub mod style;

use serde::Serialize;

pub use addons::{AddOnContext, AddOnDirective, AddOnStage};
pub use sour::{FermentationTemplateStep, SourMode, SourPlan};
pub use style::{classify, HopTechnique, StyleCategory, StyleRules, YeastCategory};

use crate::types::{AddOn, Equipment, Expertise, RecipeRequest, SourceWaterProfile};
use crate::units::hardness_dh_to_ppm;
use crate::water::MineralProfile;

/// Beginner hop ceiling in grams per litre.
pub const BEGINNER_HOP_G_PER_L: f64 = 8.0;
/// Relaxed ceiling for hazy and juicy styles.
pub const BEGINNER_HAZY_HOP_G_PER_L: f64 = 15.0;
/// Litres of ale wort served by one litre of yeast starter.
pub const WORT_LITERS_PER_STARTER_LITER: f64 = 20.0;

const HAZY_WORDS: &[&str] = &["hazy", "juicy", "tropical"];

pub fn efficiency_pct(equipment: Equipment) -> u32 {
    match equipment {
        Equipment::Pot => 65,
        Equipment::AllInOne => 80,
        Equipment::Professional => 85,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MashMethod {
    SingleInfusion,
    MultiStep,
    BrewersChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MashWater {
    /// All water in the mash, no sparge.
    FullVolume,
    Sparge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MashDirective {
    pub method: MashMethod,
    pub water: MashWater,
}

impl MashDirective {
    pub fn min_rests(&self) -> usize {
        match self.method {
            MashMethod::MultiStep => 2,
            MashMethod::SingleInfusion | MashMethod::BrewersChoice => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YeastForm {
    DryOnly,
    DryOrLiquid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YeastDirective {
    pub form: YeastForm,
    pub category: YeastCategory,
    /// Starter volume in litres when liquid yeast is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_liters: Option<f64>,
    /// Fixed strain choice that overrides the category, e.g. from a sour plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopDirective {
    pub technique: HopTechnique,
    /// Total hop mass ceiling for the batch in grams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling_grams: Option<f64>,
    pub boil_only_after_souring: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FruitDirective {
    /// `None` means the model should pick a fruit.
    pub fruit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditioningBounds {
    pub min_days: u32,
    pub max_days: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Targets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaterDirective {
    Exact { profile: MineralProfile },
    Basic { hardness_ppm: f64, ph: Option<f64> },
    Location { location: String },
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleProfile {
    pub category: StyleCategory,
    pub rules: &'static StyleRules,
}

/// Everything rule derivation decided for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedConstraints {
    pub batch_liters: f64,
    pub efficiency_pct: u32,
    pub mash: MashDirective,
    pub yeast: YeastDirective,
    pub hops: HopDirective,
    pub add_ons: Vec<AddOnDirective>,
    pub excluded_add_ons: Vec<AddOn>,
    pub style: StyleProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sour_plan: Option<SourPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit: Option<FruitDirective>,
    pub conditioning: ConditioningBounds,
    pub targets: Targets,
    pub water: WaterDirective,
}

impl DerivedConstraints {
    pub fn allows(&self, add_on: AddOn) -> bool {
        self.add_ons.iter().any(|d| d.add_on == add_on)
    }

    pub fn is_kettle_sour(&self) -> bool {
        self.sour_plan.as_ref().is_some_and(SourPlan::is_kettle)
    }

    pub fn directive(&self, add_on: AddOn) -> Option<&AddOnDirective> {
        self.add_ons.iter().find(|d| d.add_on == add_on)
    }
}

fn is_hazy(category: StyleCategory, text: &str) -> bool {
    category == StyleCategory::NeIpa || HAZY_WORDS.iter().any(|w| text.contains(w))
}

fn mash_directive(expertise: Expertise, equipment: Equipment) -> MashDirective {
    let method = match expertise {
        Expertise::Beginner => MashMethod::SingleInfusion,
        Expertise::Intermediate => MashMethod::BrewersChoice,
        Expertise::Expert => MashMethod::MultiStep,
    };
    let water = match equipment {
        Equipment::Pot => MashWater::FullVolume,
        Equipment::AllInOne | Equipment::Professional => MashWater::Sparge,
    };
    MashDirective { method, water }
}

fn yeast_directive(
    expertise: Expertise,
    category: StyleCategory,
    batch_liters: f64,
    sour_plan: Option<&SourPlan>,
) -> YeastDirective {
    let rules = category.rules();
    let form = match expertise {
        Expertise::Beginner => YeastForm::DryOnly,
        Expertise::Intermediate | Expertise::Expert => YeastForm::DryOrLiquid,
    };
    let starter_liters = (expertise == Expertise::Expert).then(|| {
        let factor = if rules.yeast == YeastCategory::Lager { 2.0 } else { 1.0 };
        batch_liters / WORT_LITERS_PER_STARTER_LITER * factor
    });
    YeastDirective {
        form,
        category: rules.yeast,
        starter_liters,
        required: sour_plan.map(|plan| plan.yeast),
    }
}

fn water_directive(source: Option<&SourceWaterProfile>) -> WaterDirective {
    match source {
        Some(SourceWaterProfile::Expert(profile)) => WaterDirective::Exact {
            profile: *profile,
        },
        Some(SourceWaterProfile::Basic { hardness, ph }) => WaterDirective::Basic {
            hardness_ppm: hardness_dh_to_ppm(*hardness),
            ph: *ph,
        },
        Some(SourceWaterProfile::Location { location }) if !location.trim().is_empty() => {
            WaterDirective::Location {
                location: location.trim().to_string(),
            }
        }
        _ => WaterDirective::None,
    }
}

/// Derive every directive for a request. Pure and total.
pub fn derive_constraints(request: &RecipeRequest) -> DerivedConstraints {
    let text = request.style_text();
    let category = classify(&text);
    let rules = category.rules();
    let batch_liters = request.batch_liters();

    let named_fruit = addons::find_fruit(&text);
    let sour = category == StyleCategory::Sour;
    let fruit_allowed = request.add_ons.use_fruit || (sour && named_fruit.is_some());
    let fruit = fruit_allowed.then(|| FruitDirective {
        fruit: named_fruit.map(str::to_string),
    });

    let sour_plan = sour.then(|| {
        let fruit_label = fruit.as_ref().map(|f| {
            f.fruit
                .clone()
                .unwrap_or_else(|| "the fruit".to_string())
        });
        SourPlan::new(SourMode::for_expertise(request.expertise), fruit_label.as_deref())
    });

    let context = AddOnContext {
        batch_liters,
        category,
        expertise: request.expertise,
        fruit: named_fruit,
    };
    let (add_ons, excluded_add_ons) = addons::directives(
        |add_on| match add_on {
            AddOn::Fruit => fruit_allowed,
            other => request.add_ons.is_set(other),
        },
        &context,
    );

    let ceiling_grams = (request.expertise == Expertise::Beginner).then(|| {
        let rate = if is_hazy(category, &text) {
            BEGINNER_HAZY_HOP_G_PER_L
        } else {
            BEGINNER_HOP_G_PER_L
        };
        batch_liters * rate
    });

    DerivedConstraints {
        batch_liters,
        efficiency_pct: efficiency_pct(request.equipment),
        mash: mash_directive(request.expertise, request.equipment),
        yeast: yeast_directive(request.expertise, category, batch_liters, sour_plan.as_ref()),
        hops: HopDirective {
            technique: rules.hop_technique,
            ceiling_grams,
            boil_only_after_souring: sour_plan.as_ref().is_some_and(|p| p.hops_after_souring_only),
        },
        add_ons,
        excluded_add_ons,
        style: StyleProfile { category, rules },
        sour_plan,
        fruit,
        conditioning: ConditioningBounds {
            min_days: rules.conditioning_days.0,
            max_days: rules.conditioning_days.1,
        },
        targets: Targets {
            abv: request.target_abv.value(),
            ibu: request.target_ibu.value(),
            color: request.target_color.value(),
        },
        water: water_directive(request.source_water_profile.as_ref()),
    }
}
