//! Mash and sparge water volumes derived from the grist and equipment.

use crate::types::{Equipment, Malt};
use crate::units::{format_volume, parse_mass_grams, UnitSystem, GRAMS_PER_KG};

/// How an equipment tier loses and splits water.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentProfile {
    /// Litres retained per kilogram of grain.
    pub absorption_l_per_kg: f64,
    /// Share of the total water that goes into the mash.
    pub mash_fraction: f64,
    /// Boil-off, trub and dead space in litres.
    pub allowance_l: f64,
}

impl EquipmentProfile {
    pub fn for_equipment(equipment: Equipment) -> Self {
        let (absorption_l_per_kg, mash_fraction, allowance_l) = match equipment {
            Equipment::Pot => (0.6, 1.0, 4.0),
            Equipment::AllInOne => (0.8, 0.7, 3.0),
            Equipment::Professional => (1.0, 0.6, 4.0),
        };
        Self {
            absorption_l_per_kg,
            mash_fraction,
            allowance_l,
        }
    }
}

/// Total grain in kilograms. Entries that cannot be read count as zero.
pub fn grain_mass_kg(malts: &[Malt]) -> f64 {
    malts
        .iter()
        .filter_map(|m| parse_mass_grams(&m.amount).or(m.amount_grams))
        .filter(|g| g.is_finite() && *g > 0.0)
        .sum::<f64>()
        / GRAMS_PER_KG
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterVolumes {
    pub mash_liters: f64,
    pub sparge_liters: f64,
}

impl WaterVolumes {
    pub fn total_liters(&self) -> f64 {
        self.mash_liters + self.sparge_liters
    }
}

pub fn water_volumes(equipment: Equipment, grain_kg: f64, batch_liters: f64) -> WaterVolumes {
    let profile = EquipmentProfile::for_equipment(equipment);
    let total = batch_liters + grain_kg * profile.absorption_l_per_kg + profile.allowance_l;
    let mash_liters = total * profile.mash_fraction;
    WaterVolumes {
        mash_liters,
        sparge_liters: total - mash_liters,
    }
}

/// Display strings for `specs.mash_water` and `specs.sparge_water`.
pub fn render_volumes(
    equipment: Equipment,
    volumes: WaterVolumes,
    units: UnitSystem,
) -> (String, String) {
    let sparge = if equipment == Equipment::Pot {
        format_volume(0.0, units)
    } else {
        format_volume(volumes.sparge_liters, units)
    };
    (format_volume(volumes.mash_liters, units), sparge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malt(amount: &str, grams: Option<f64>) -> Malt {
        Malt {
            name: "Pale".to_string(),
            amount: amount.to_string(),
            amount_grams: grams,
            ..Default::default()
        }
    }

    #[test]
    fn test_grain_mass() {
        let malts = vec![
            malt("4.5 kg", None),
            malt("500 g (1.1 lb)", None),
            malt("a handful", Some(250.0)),
            malt("some", None),
        ];
        assert!((grain_mass_kg(&malts) - 5.25).abs() < 1e-9);
        assert_eq!(grain_mass_kg(&[]), 0.0);
    }

    #[test]
    fn test_pot_is_full_volume() {
        let volumes = water_volumes(Equipment::Pot, 5.0, 20.0);
        // 20 + 5 * 0.6 + 4
        assert!((volumes.mash_liters - 27.0).abs() < 1e-9);
        assert_eq!(volumes.sparge_liters, 0.0);
        let (mash, sparge) = render_volumes(Equipment::Pot, volumes, UnitSystem::Metric);
        assert_eq!(mash, "27 L");
        assert_eq!(sparge, "0 L");
        let (_, sparge) = render_volumes(Equipment::Pot, volumes, UnitSystem::Imperial);
        assert_eq!(sparge, "0 gal");
    }

    #[test]
    fn test_all_in_one_split() {
        let volumes = water_volumes(Equipment::AllInOne, 5.0, 20.0);
        // 20 + 4 + 3 = 27, 70% in the mash
        assert!((volumes.total_liters() - 27.0).abs() < 1e-9);
        assert!((volumes.mash_liters - 18.9).abs() < 1e-9);
        assert!((volumes.sparge_liters - 8.1).abs() < 1e-9);
        let (mash, sparge) = render_volumes(Equipment::AllInOne, volumes, UnitSystem::Metric);
        assert_eq!(mash, "18.9 L");
        assert_eq!(sparge, "8.1 L");
    }

    #[test]
    fn test_professional_split() {
        let volumes = water_volumes(Equipment::Professional, 10.0, 100.0);
        // 100 + 10 + 4 = 114, 60% in the mash
        assert!((volumes.mash_liters - 68.4).abs() < 1e-9);
        assert!((volumes.sparge_liters - 45.6).abs() < 1e-9);
    }

    #[test]
    fn test_total_grows_with_grain() {
        let light = water_volumes(Equipment::AllInOne, 4.0, 20.0).total_liters();
        let heavy = water_volumes(Equipment::AllInOne, 8.0, 20.0).total_liters();
        assert!(heavy > light);
    }
}
