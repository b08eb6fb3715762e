use anyhow::{bail, Result};
use brewgen_core::water::{calculate_additions, project_profile, MineralProfile};
use std::path::Path;

use crate::read_json;

pub fn additions(source_path: &Path, target_path: &Path, litres: f64) -> Result<()> {
    if !(litres.is_finite() && litres > 0.0) {
        bail!("--litres must be a positive number, got {litres}");
    }
    let source: MineralProfile = read_json(source_path)?;
    let target: MineralProfile = read_json(target_path)?;
    if !source.is_valid() || !target.is_valid() {
        bail!("Mineral values must be non-negative numbers");
    }

    let additions = calculate_additions(&source, &target, litres);
    let projected = project_profile(&source, &additions, litres);

    let output = serde_json::json!({
        "additions": additions,
        "projected": projected,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
