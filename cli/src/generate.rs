use anyhow::{Context, Result};
use brewgen_core::gateway::parse_draft;
use brewgen_core::{
    compose_prompt, derive_constraints, sanitize, RecipeEngine, RecipeRequest,
};
use std::fs;
use std::path::Path;

use crate::read_json;

/// Run a full generation against the configured provider.
pub async fn generate(request_path: &Path, owner: &str, verbose: bool) -> Result<()> {
    let request: RecipeRequest = read_json(request_path)?;
    let engine = RecipeEngine::from_env()?;

    eprintln!(
        "Generating {} with {} ({})...",
        request.beer_style,
        engine.gateway().provider().provider_name(),
        engine.gateway().provider().model_name()
    );

    let outcome = match engine.run(owner, &request).await {
        Ok(outcome) => outcome,
        Err(failure) => {
            let error_json = serde_json::json!({
                "error": failure.error.to_string(),
                "code": failure.error.code(),
                "stage": failure.stage,
            });
            println!("{}", serde_json::to_string_pretty(&error_json)?);
            // Return error so exit code is non-zero
            return Err(anyhow::anyhow!("Generation failed: {}", failure));
        }
    };

    if verbose {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome.recipe)?);
    }

    eprintln!(
        "{} corrections applied, persistence: {}",
        outcome.report.total_corrections(),
        serde_json::to_string(&outcome.persistence)?
    );
    Ok(())
}

/// Print derived constraints and the composed prompt.
pub fn constraints(request_path: &Path) -> Result<()> {
    let request: RecipeRequest = read_json(request_path)?;
    request.validate()?;

    let constraints = derive_constraints(&request);
    let prompt = compose_prompt(&request, &constraints);

    let output = serde_json::json!({
        "constraints": constraints,
        "prompt": prompt,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Sanitize a saved model response offline.
pub fn normalize(request_path: &Path, draft_path: &Path) -> Result<()> {
    let request: RecipeRequest = read_json(request_path)?;
    request.validate()?;

    let raw = fs::read_to_string(draft_path)
        .with_context(|| format!("Failed to read {}", draft_path.display()))?;
    let draft = parse_draft(&raw)?;

    let constraints = derive_constraints(&request);
    let output = sanitize(draft, &request, &constraints);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
