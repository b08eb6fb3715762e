//! Souring plans.
//!
//! Sour styles get one of two fixed process templates. Fast souring ferments
//! with a single lactic-producing yeast strain; kettle souring holds the wort
//! with lactobacillus before a normal boil and clean fermentation.

use serde::Serialize;

use crate::types::Expertise;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourMode {
    Fast,
    Kettle,
}

impl SourMode {
    /// Expert brewers kettle sour; everyone else uses the single-strain route.
    pub fn for_expertise(expertise: Expertise) -> Self {
        match expertise {
            Expertise::Expert => SourMode::Kettle,
            Expertise::Beginner | Expertise::Intermediate => SourMode::Fast,
        }
    }
}

/// One row of a fermentation template. Temperatures are Celsius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FermentationTemplateStep {
    pub step: &'static str,
    pub temp_c: f64,
    pub days: (u32, u32),
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourPlan {
    pub mode: SourMode,
    pub method: &'static str,
    pub yeast: &'static str,
    pub steps: Vec<FermentationTemplateStep>,
    /// Hops are only allowed in the boil after souring.
    pub hops_after_souring_only: bool,
}

const FAST_METHOD: &str = "Fast biological souring: pitch a single lactic-acid-producing yeast \
strain into normally boiled wort. It sours and ferments in one step, with no bacteria to manage.";

const KETTLE_METHOD: &str = "Kettle souring: after the mash, bring the wort to a brief boil to \
sanitize it, cool to 37-40 °C, pitch Lactobacillus and hold at that temperature for 24-48 hours \
until pH 3.3-3.5. Then run a normal boil in which all hops are added, chill, and ferment with a \
clean ale yeast. No hops go into the wort before souring.";

const FAST_YEAST: &str = "LalBrew WildBrew Philly Sour (Lachancea)";
const KETTLE_YEAST: &str =
    "Lactobacillus plantarum for the kettle hold, then a clean ale yeast (SafAle US-05 or WLP001)";

impl SourPlan {
    pub fn new(mode: SourMode, fruit: Option<&str>) -> Self {
        let mut steps = match mode {
            SourMode::Fast => vec![
                FermentationTemplateStep {
                    step: "Primary (souring)",
                    temp_c: 22.0,
                    days: (10, 14),
                    description: "Sourness and fermentation develop together.".to_string(),
                },
                FermentationTemplateStep {
                    step: "Conditioning",
                    temp_c: 20.0,
                    days: (7, 14),
                    description: "Let the yeast clean up before packaging.".to_string(),
                },
            ],
            SourMode::Kettle => vec![
                FermentationTemplateStep {
                    step: "Kettle Souring",
                    temp_c: 38.0,
                    days: (1, 2),
                    description: "Hold with Lactobacillus until pH 3.3-3.5, then boil.".to_string(),
                },
                FermentationTemplateStep {
                    step: "Primary",
                    temp_c: 19.0,
                    days: (7, 10),
                    description: "Clean ale fermentation of the soured, boiled wort.".to_string(),
                },
                FermentationTemplateStep {
                    step: "Conditioning",
                    temp_c: 18.0,
                    days: (7, 14),
                    description: "Let the flavors settle before packaging.".to_string(),
                },
            ],
        };

        if let Some(fruit) = fruit {
            steps.push(FermentationTemplateStep {
                step: "Fruit Addition",
                temp_c: 20.0,
                days: (5, 7),
                description: format!("Add {fruit} once primary fermentation has slowed."),
            });
        }

        let (method, yeast) = match mode {
            SourMode::Fast => (FAST_METHOD, FAST_YEAST),
            SourMode::Kettle => (KETTLE_METHOD, KETTLE_YEAST),
        };

        Self {
            mode,
            method,
            yeast,
            steps,
            hops_after_souring_only: mode == SourMode::Kettle,
        }
    }

    pub fn is_kettle(&self) -> bool {
        self.mode == SourMode::Kettle
    }
}
