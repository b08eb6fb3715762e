//! Request and recipe types shared across the engine.

use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::lenient;
use crate::units::{TempUnit, UnitSystem};
use crate::water::MineralProfile;

/// Brewer experience tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Expertise {
    Beginner,
    Intermediate,
    Expert,
}

/// Brewhouse tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Equipment {
    #[serde(rename = "pot")]
    Pot,
    #[serde(rename = "all-in-one", alias = "allinone", alias = "all_in_one")]
    AllInOne,
    #[serde(rename = "professional")]
    Professional,
}

/// A numeric target or "auto" (let the style decide).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TargetValue {
    #[default]
    Auto,
    Value(f64),
}

impl TargetValue {
    pub fn value(self) -> Option<f64> {
        match self {
            TargetValue::Auto => None,
            TargetValue::Value(v) => Some(v),
        }
    }
}

impl Serialize for TargetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TargetValue::Auto => serializer.serialize_str("auto"),
            TargetValue::Value(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for TargetValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = lenient::opt_f64(deserializer)?;
        Ok(value.map(TargetValue::Value).unwrap_or_default())
    }
}

/// The brewer's source water, in one of three levels of detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SourceWaterProfile {
    /// Free-text place name; the model estimates the profile.
    Location { location: String },
    /// Total hardness in German degrees (°dH) plus optional pH.
    Basic {
        hardness: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ph: Option<f64>,
    },
    /// Full lab report, suitable for exact calculation.
    Expert(MineralProfile),
}

impl SourceWaterProfile {
    /// The exact mineral profile, when one was supplied.
    pub fn exact(&self) -> Option<&MineralProfile> {
        match self {
            SourceWaterProfile::Expert(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Optional ingredients and techniques the brewer explicitly opted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AddOn {
    Whirlpool,
    Fruit,
    IrishMoss,
    AscorbicAcid,
    Lactose,
    DryHop,
    Spices,
    Wood,
}

impl AddOn {
    pub const ALL: [AddOn; 8] = [
        AddOn::Whirlpool,
        AddOn::Fruit,
        AddOn::IrishMoss,
        AddOn::AscorbicAcid,
        AddOn::Lactose,
        AddOn::DryHop,
        AddOn::Spices,
        AddOn::Wood,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AddOn::Whirlpool => "whirlpool / hop stand",
            AddOn::Fruit => "fruit",
            AddOn::IrishMoss => "Irish moss",
            AddOn::AscorbicAcid => "ascorbic acid",
            AddOn::Lactose => "lactose",
            AddOn::DryHop => "dry hopping",
            AddOn::Spices => "spices",
            AddOn::Wood => "wood / oak",
        }
    }
}

/// Add-on checkboxes from the request form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AddOnFlags {
    #[serde(default)]
    pub use_whirlpool: bool,
    #[serde(default)]
    pub use_fruit: bool,
    #[serde(default)]
    pub use_irish_moss: bool,
    #[serde(default)]
    pub use_ascorbic_acid: bool,
    #[serde(default)]
    pub use_lactose: bool,
    #[serde(default)]
    pub use_dry_hop: bool,
    #[serde(default)]
    pub use_spices: bool,
    #[serde(default)]
    pub use_wood: bool,
}

impl AddOnFlags {
    pub fn is_set(&self, add_on: AddOn) -> bool {
        match add_on {
            AddOn::Whirlpool => self.use_whirlpool,
            AddOn::Fruit => self.use_fruit,
            AddOn::IrishMoss => self.use_irish_moss,
            AddOn::AscorbicAcid => self.use_ascorbic_acid,
            AddOn::Lactose => self.use_lactose,
            AddOn::DryHop => self.use_dry_hop,
            AddOn::Spices => self.use_spices,
            AddOn::Wood => self.use_wood,
        }
    }
}

/// Everything the brewer asked for. Built once per generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub expertise: Expertise,
    pub equipment: Equipment,
    pub beer_style: String,
    #[serde(default)]
    pub flavor_profile: String,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub temp_unit: TempUnit,
    /// Litres for metric requests, US gallons for imperial ones.
    pub batch_size: f64,
    #[serde(default)]
    pub target_abv: TargetValue,
    #[serde(default)]
    pub target_ibu: TargetValue,
    #[serde(default)]
    pub target_color: TargetValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_water_profile: Option<SourceWaterProfile>,
    #[serde(flatten)]
    pub add_ons: AddOnFlags,
}

impl RecipeRequest {
    /// Reject requests that cannot produce a sensible recipe.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.batch_size.is_finite() && self.batch_size > 0.0) {
            return Err(ValidationError::InvalidBatchSize(self.batch_size));
        }
        if self.beer_style.trim().is_empty() {
            return Err(ValidationError::MissingBeerStyle);
        }
        Ok(())
    }

    /// Batch size in litres regardless of the display system.
    pub fn batch_liters(&self) -> f64 {
        crate::units::batch_liters(self.batch_size, self.units)
    }

    /// Lowercased style and flavor text used for keyword matching.
    pub fn style_text(&self) -> String {
        format!("{} {}", self.beer_style, self.flavor_profile).to_lowercase()
    }
}

/// Headline numbers. Everything is display text except carbonation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Specs {
    #[serde(default, deserialize_with = "lenient::string")]
    pub og: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub fg: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub abv: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ibu: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub srm: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mash_water: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sparge_water: String,
    /// Target carbonation in grams CO2 per litre.
    #[serde(
        default,
        alias = "co2",
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub carbonation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Malt {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amount: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_grams: Option<f64>,
    #[serde(default, alias = "description", deserialize_with = "lenient::string")]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Hop {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amount: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_grams: Option<f64>,
    /// Display label such as "60 min", "Whirlpool" or "Dry Hop Day 3".
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub boil_time: Option<f64>,
    /// Alpha acid percentage.
    #[serde(
        default,
        alias = "alpha_acid",
        alias = "aa",
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub alpha: Option<f64>,
    #[serde(default, alias = "description", deserialize_with = "lenient::string")]
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExtraType {
    WaterAgent,
    ProcessAid,
    Spice,
    Herb,
    Fruit,
    Sugar,
    Nutrient,
    #[default]
    #[serde(other)]
    Other,
}

/// Anything that goes into the beer that is not malt, hops or yeast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Extra {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub unit: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub kind: ExtraType,
    #[serde(rename = "use", default, deserialize_with = "lenient::string")]
    pub usage: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MashStep {
    #[serde(default, alias = "name", deserialize_with = "lenient::string")]
    pub step: String,
    #[serde(default, alias = "temperature", deserialize_with = "lenient::string")]
    pub temp: String,
    #[serde(default, alias = "duration", deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

/// Target water profile proposed by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WaterProfile {
    #[serde(default, alias = "calcium", deserialize_with = "lenient::opt_f64")]
    pub ca: Option<f64>,
    #[serde(default, alias = "magnesium", deserialize_with = "lenient::opt_f64")]
    pub mg: Option<f64>,
    #[serde(default, alias = "sodium", deserialize_with = "lenient::opt_f64")]
    pub na: Option<f64>,
    #[serde(default, alias = "chloride", deserialize_with = "lenient::opt_f64")]
    pub cl: Option<f64>,
    #[serde(
        default,
        alias = "sulfate",
        alias = "sulphate",
        deserialize_with = "lenient::opt_f64"
    )]
    pub so4: Option<f64>,
    #[serde(default, alias = "bicarbonate", deserialize_with = "lenient::opt_f64")]
    pub hco3: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub ph: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

impl WaterProfile {
    /// A complete six-ion profile, or `None` if any ion is missing.
    pub fn to_minerals(&self) -> Option<MineralProfile> {
        Some(MineralProfile {
            ca: self.ca?,
            mg: self.mg?,
            na: self.na?,
            cl: self.cl?,
            so4: self.so4?,
            hco3: self.hco3?,
            ph: self.ph,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct YeastDetail {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub form: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amount: String,
    #[serde(default, alias = "description", deserialize_with = "lenient::string")]
    pub explanation: String,
}

/// Models return yeast either as a plain name or as an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum YeastSpec {
    Name(String),
    Detailed(YeastDetail),
}

impl YeastSpec {
    pub fn name(&self) -> &str {
        match self {
            YeastSpec::Name(name) => name,
            YeastSpec::Detailed(detail) => &detail.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FermentationStep {
    #[serde(default, alias = "stage", alias = "day", deserialize_with = "lenient::string")]
    pub step: String,
    #[serde(default, alias = "temperature", deserialize_with = "lenient::string")]
    pub temp: String,
    #[serde(default, alias = "days", alias = "time", deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum ShoppingItem {
    Text(String),
    Item {
        #[serde(default, deserialize_with = "lenient::string")]
        name: String,
        #[serde(default, deserialize_with = "lenient::string")]
        amount: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

/// A brewing recipe as the model drafts it. Nothing in here is trusted
/// until it has been through [`crate::sanitize::sanitize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Recipe {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub specs: Specs,
    #[serde(
        default,
        deserialize_with = "lenient::opt_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub conditioning_days_min: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub conditioning_days_max: Option<u32>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub malts: Vec<Malt>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub hops: Vec<Hop>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub yeast: Option<YeastSpec>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub extras: Vec<Extra>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub mash_schedule: Vec<MashStep>,
    #[serde(
        rename = "waterProfile",
        alias = "water_profile",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub water_profile: Option<WaterProfile>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub fermentation_instructions: Vec<String>,
    #[serde(
        rename = "fermentationSchedule",
        alias = "fermentation_schedule",
        default,
        deserialize_with = "lenient::vec"
    )]
    pub fermentation_schedule: Vec<FermentationStep>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub shopping_list: Vec<ShoppingItem>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
}

/// A recipe whose physical invariants have been enforced.
///
/// Only the sanitizer constructs these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct SanitizedRecipe(Recipe);

impl SanitizedRecipe {
    pub(crate) fn new(recipe: Recipe) -> Self {
        Self(recipe)
    }

    pub fn into_inner(self) -> Recipe {
        self.0
    }
}

impl Deref for SanitizedRecipe {
    type Target = Recipe;

    fn deref(&self) -> &Recipe {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_form_payload() {
        let request: RecipeRequest = serde_json::from_str(
            r#"{
                "expertise": "expert",
                "equipment": "all-in-one",
                "beerStyle": "Berliner Weisse",
                "units": "metric",
                "tempUnit": "F",
                "batchSize": 20,
                "targetAbv": "auto",
                "targetIbu": 8,
                "sourceWaterProfile": {"mode": "expert", "ca": 20, "mg": 5, "na": 10, "cl": 20, "so4": 15, "hco3": 10},
                "useFruit": true
            }"#,
        )
        .unwrap();

        assert_eq!(request.equipment, Equipment::AllInOne);
        assert_eq!(request.temp_unit, TempUnit::F);
        assert_eq!(request.target_abv, TargetValue::Auto);
        assert_eq!(request.target_ibu.value(), Some(8.0));
        assert!(request.add_ons.use_fruit);
        assert!(!request.add_ons.use_dry_hop);
        let exact = request.source_water_profile.as_ref().and_then(|p| p.exact());
        assert_eq!(exact.map(|p| p.hco3), Some(10.0));
    }

    #[test]
    fn test_basic_water_profile() {
        let profile: SourceWaterProfile =
            serde_json::from_str(r#"{"mode": "basic", "hardness": 12.5}"#).unwrap();
        assert_eq!(
            profile,
            SourceWaterProfile::Basic {
                hardness: 12.5,
                ph: None
            }
        );
        assert!(profile.exact().is_none());
    }

    #[test]
    fn test_validate() {
        let mut request: RecipeRequest = serde_json::from_str(
            r#"{"expertise": "beginner", "equipment": "pot", "beerStyle": "Pale Ale", "batchSize": 10}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        request.batch_size = 0.0;
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidBatchSize(_))
        ));

        request.batch_size = 10.0;
        request.beer_style = "  ".to_string();
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MissingBeerStyle)
        ));
    }

    #[test]
    fn test_lenient_draft() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "name": "Test",
                "specs": null,
                "conditioning_days_min": "14",
                "hops": [{"name": "Citra", "amount": "30 g", "alpha": "12.5", "boil_time": 10}],
                "extras": [{"name": "Whirlfloc", "type": "clarifier"}, {"name": "Salt", "type": null}],
                "yeast": {"name": "US-05", "type": "dry"},
                "waterProfile": {"calcium": 50, "mg": 5, "na": 10, "cl": 50, "so4": 100, "hco3": "20"},
                "shopping_list": ["Citra 100 g", {"name": "Pilsner malt", "amount": "5 kg"}]
            }"#,
        )
        .unwrap();

        assert_eq!(recipe.specs, Specs::default());
        assert_eq!(recipe.conditioning_days_min, Some(14));
        assert_eq!(recipe.hops[0].alpha, Some(12.5));
        assert_eq!(recipe.extras[0].kind, ExtraType::Other);
        assert_eq!(recipe.extras[1].kind, ExtraType::Other);
        assert_eq!(recipe.yeast.as_ref().map(|y| y.name()), Some("US-05"));
        let minerals = recipe.water_profile.as_ref().and_then(|w| w.to_minerals());
        assert_eq!(minerals.map(|m| m.hco3), Some(20.0));
        assert_eq!(recipe.shopping_list.len(), 2);
    }

    #[test]
    fn test_incomplete_water_profile() {
        let profile = WaterProfile {
            ca: Some(50.0),
            ..Default::default()
        };
        assert!(profile.to_minerals().is_none());
    }
}
