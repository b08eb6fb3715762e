//! Water chemistry calculator.
//!
//! Given a measured source water profile and a style target, proposes salt
//! and acid additions for the brewing liquor. The solver is a greedy pass
//! over a fixed agent order: each agent fills the deficit of one primary ion
//! while its secondary ion is kept within a tolerance band of the target.
//! Masses are floored to 0.1 g so rounding can never push an ion past the
//! band. Dilution is not supported, so ions already above target are left
//! alone.

use serde::{Deserialize, Serialize};

use crate::types::{Extra, ExtraType};
use crate::units::format_decimal;

/// How far past its target a secondary ion may be pushed, in ppm.
pub const TOLERANCE_PPM: f64 = 5.0;

/// Deficits smaller than this are not worth an addition.
const MIN_DEFICIT_PPM: f64 = 1.0;

/// 88% lactic acid: milliequivalents of acid per millilitre.
const LACTIC_MEQ_PER_ML: f64 = 11.8;
const HCO3_MG_PER_MEQ: f64 = 61.02;
const LACTIC_HCO3_PPM_PER_ML_PER_L: f64 = LACTIC_MEQ_PER_ML * HCO3_MG_PER_MEQ;

/// Six-ion water profile in ppm (mg/L).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MineralProfile {
    #[serde(alias = "calcium")]
    pub ca: f64,
    #[serde(alias = "magnesium")]
    pub mg: f64,
    #[serde(alias = "sodium")]
    pub na: f64,
    #[serde(alias = "chloride")]
    pub cl: f64,
    #[serde(alias = "sulfate", alias = "sulphate")]
    pub so4: f64,
    #[serde(alias = "bicarbonate")]
    pub hco3: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ion {
    Calcium,
    Magnesium,
    Sodium,
    Chloride,
    Sulfate,
    Bicarbonate,
}

impl Ion {
    pub const ALL: [Ion; 6] = [
        Ion::Calcium,
        Ion::Magnesium,
        Ion::Sodium,
        Ion::Chloride,
        Ion::Sulfate,
        Ion::Bicarbonate,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Ion::Calcium => "Ca",
            Ion::Magnesium => "Mg",
            Ion::Sodium => "Na",
            Ion::Chloride => "Cl",
            Ion::Sulfate => "SO4",
            Ion::Bicarbonate => "HCO3",
        }
    }
}

impl MineralProfile {
    pub fn get(&self, ion: Ion) -> f64 {
        match ion {
            Ion::Calcium => self.ca,
            Ion::Magnesium => self.mg,
            Ion::Sodium => self.na,
            Ion::Chloride => self.cl,
            Ion::Sulfate => self.so4,
            Ion::Bicarbonate => self.hco3,
        }
    }

    fn add(&mut self, ion: Ion, delta: f64) {
        let slot = match ion {
            Ion::Calcium => &mut self.ca,
            Ion::Magnesium => &mut self.mg,
            Ion::Sodium => &mut self.na,
            Ion::Chloride => &mut self.cl,
            Ion::Sulfate => &mut self.so4,
            Ion::Bicarbonate => &mut self.hco3,
        };
        *slot = (*slot + delta).max(0.0);
    }

    /// All six ions are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        Ion::ALL
            .iter()
            .all(|&ion| self.get(ion).is_finite() && self.get(ion) >= 0.0)
    }
}

/// Salts and acids the calculator knows how to dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WaterAgent {
    Gypsum,
    CalciumChloride,
    EpsomSalt,
    BakingSoda,
    CanningSalt,
    LacticAcid,
}

impl WaterAgent {
    pub fn display_name(self) -> &'static str {
        match self {
            WaterAgent::Gypsum => "Gypsum (CaSO4)",
            WaterAgent::CalciumChloride => "Calcium Chloride (CaCl2)",
            WaterAgent::EpsomSalt => "Epsom Salt (MgSO4)",
            WaterAgent::BakingSoda => "Baking Soda (NaHCO3)",
            WaterAgent::CanningSalt => "Canning Salt (NaCl)",
            WaterAgent::LacticAcid => "Lactic Acid 88%",
        }
    }

    /// ppm added per gram (or millilitre, for acid) per litre of water.
    pub fn contributions(self) -> &'static [(Ion, f64)] {
        match self {
            WaterAgent::Gypsum => &[(Ion::Calcium, 232.8), (Ion::Sulfate, 557.7)],
            WaterAgent::CalciumChloride => &[(Ion::Calcium, 272.6), (Ion::Chloride, 482.3)],
            WaterAgent::EpsomSalt => &[(Ion::Magnesium, 98.6), (Ion::Sulfate, 389.6)],
            WaterAgent::BakingSoda => &[(Ion::Sodium, 273.7), (Ion::Bicarbonate, 726.4)],
            WaterAgent::CanningSalt => &[(Ion::Sodium, 393.4), (Ion::Chloride, 606.6)],
            WaterAgent::LacticAcid => &[(Ion::Bicarbonate, -LACTIC_HCO3_PPM_PER_ML_PER_L)],
        }
    }

    fn unit(self) -> &'static str {
        match self {
            WaterAgent::LacticAcid => "ml",
            _ => "g",
        }
    }

    fn description(self) -> &'static str {
        match self {
            WaterAgent::Gypsum => "Raises calcium and sulfate; sharpens hop bitterness.",
            WaterAgent::CalciumChloride => "Raises calcium and chloride; rounds out malt body.",
            WaterAgent::EpsomSalt => "Raises magnesium and sulfate.",
            WaterAgent::BakingSoda => "Raises sodium and alkalinity for dark grists.",
            WaterAgent::CanningSalt => "Raises sodium and chloride for fullness.",
            WaterAgent::LacticAcid => "Neutralizes excess alkalinity to bring mash pH down.",
        }
    }

    fn per_unit(self, ion: Ion) -> f64 {
        self.contributions()
            .iter()
            .find(|(i, _)| *i == ion)
            .map(|(_, ppm)| *ppm)
            .unwrap_or(0.0)
    }
}

/// One proposed water treatment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WaterAddition {
    pub agent: WaterAgent,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    #[serde(rename = "type")]
    pub kind: ExtraType,
    #[serde(rename = "use")]
    pub usage: String,
    pub time: String,
    pub description: String,
}

impl WaterAddition {
    fn new(agent: WaterAgent, amount: f64) -> Self {
        Self {
            agent,
            name: agent.display_name().to_string(),
            amount,
            unit: agent.unit().to_string(),
            kind: ExtraType::WaterAgent,
            usage: "Mash".to_string(),
            time: "Mash In".to_string(),
            description: agent.description().to_string(),
        }
    }
}

impl From<WaterAddition> for Extra {
    fn from(addition: WaterAddition) -> Self {
        Extra {
            name: addition.name,
            amount: format_decimal(addition.amount),
            unit: addition.unit,
            kind: addition.kind,
            usage: addition.usage,
            time: addition.time,
            description: addition.description,
        }
    }
}

/// Primary-ion passes, in priority order. Calcium comes last so the anion
/// passes get first claim on gypsum and calcium chloride.
const PASSES: &[(WaterAgent, Ion)] = &[
    (WaterAgent::BakingSoda, Ion::Bicarbonate),
    (WaterAgent::EpsomSalt, Ion::Magnesium),
    (WaterAgent::Gypsum, Ion::Sulfate),
    (WaterAgent::CalciumChloride, Ion::Chloride),
    (WaterAgent::CanningSalt, Ion::Sodium),
    (WaterAgent::CalciumChloride, Ion::Calcium),
    (WaterAgent::Gypsum, Ion::Calcium),
];

fn floor_tenth(value: f64) -> f64 {
    (value * 10.0 + 1e-9).floor() / 10.0
}

/// How much more of `ion` may be added, in ppm.
///
/// Only ions that started below target may rise, and never past the band.
fn headroom(source: &MineralProfile, target: &MineralProfile, current: &MineralProfile, ion: Ion) -> f64 {
    if source.get(ion) >= target.get(ion) {
        return 0.0;
    }
    (target.get(ion) + TOLERANCE_PPM - current.get(ion)).max(0.0)
}

/// Compute salt and acid additions moving `source` toward `target`.
///
/// Returns an empty list for a non-positive volume or an invalid profile;
/// water treatment is an enhancement, never a hard requirement.
pub fn calculate_additions(
    source: &MineralProfile,
    target: &MineralProfile,
    batch_liters: f64,
) -> Vec<WaterAddition> {
    if !(batch_liters.is_finite() && batch_liters > 0.0) || !source.is_valid() || !target.is_valid()
    {
        return Vec::new();
    }

    let mut current = *source;
    let mut totals: Vec<(WaterAgent, f64)> = Vec::new();

    for &(agent, primary) in PASSES {
        let deficit = target.get(primary) - current.get(primary);
        if deficit < MIN_DEFICIT_PPM {
            continue;
        }

        let mut per_liter = deficit / agent.per_unit(primary);
        for &(ion, ppm) in agent.contributions() {
            if ion != primary {
                per_liter = per_liter.min(headroom(source, target, &current, ion) / ppm);
            }
        }

        let amount = floor_tenth(per_liter * batch_liters);
        if amount <= 0.0 {
            continue;
        }

        for &(ion, ppm) in agent.contributions() {
            current.add(ion, ppm * amount / batch_liters);
        }

        match totals.iter_mut().find(|(a, _)| *a == agent) {
            Some((_, total)) => *total += amount,
            None => totals.push((agent, amount)),
        }
    }

    let excess_alkalinity = current.hco3 - target.hco3;
    if excess_alkalinity > TOLERANCE_PPM {
        let ml = floor_tenth(excess_alkalinity * batch_liters / LACTIC_HCO3_PPM_PER_ML_PER_L);
        if ml > 0.0 {
            totals.push((WaterAgent::LacticAcid, ml));
        }
    }

    let additions: Vec<WaterAddition> = totals
        .into_iter()
        .map(|(agent, amount)| WaterAddition::new(agent, (amount * 10.0).round() / 10.0))
        .collect();

    tracing::debug!(
        batch_liters,
        additions = additions.len(),
        "Calculated water additions"
    );

    additions
}

/// Apply additions to a source profile, as the brewer would.
pub fn project_profile(
    source: &MineralProfile,
    additions: &[WaterAddition],
    batch_liters: f64,
) -> MineralProfile {
    let mut projected = *source;
    if !(batch_liters.is_finite() && batch_liters > 0.0) {
        return projected;
    }
    for addition in additions {
        for &(ion, ppm) in addition.agent.contributions() {
            projected.add(ion, ppm * addition.amount / batch_liters);
        }
    }
    projected
}
