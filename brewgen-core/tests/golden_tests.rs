//! Golden file tests for draft sanitization.
//!
//! Each JSON file in `fixtures/drafts/` holds a request, a model draft and
//! the corrections the sanitizer is expected to make.

use brewgen_core::gateway::parse_draft;
use brewgen_core::types::ExtraType;
use brewgen_core::{calculate_additions, derive_constraints, sanitize, RecipeRequest};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// A test case loaded from a JSON fixture file
#[derive(Debug, Deserialize)]
struct TestCase {
    request: RecipeRequest,
    /// The draft object as the model would return it
    draft: serde_json::Value,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct ExpectedHop {
    name: String,
    time: String,
}

#[derive(Debug, Deserialize)]
struct Expected {
    mash_steps: Vec<String>,
    mash_in_temp: String,
    mash_out_temp: String,
    hops: Vec<ExpectedHop>,
    extras_present: Vec<String>,
    extras_absent: Vec<String>,
    mash_water: String,
    sparge_water: String,
    conditioning_days: (u32, u32),
    carbonation: f64,
    /// Lowercase snippets that must not appear anywhere in the recipe
    #[serde(default)]
    forbidden_text: Vec<String>,
    #[serde(default)]
    water_override: bool,
}

/// Load all test cases from the fixtures directory
fn load_test_cases() -> Vec<(String, TestCase)> {
    let pattern = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/drafts/*.json");
    let pattern = pattern.to_string_lossy().into_owned();

    let mut cases = Vec::new();
    for path in glob::glob(&pattern).expect("Invalid fixture pattern") {
        let path = path.expect("Failed to read fixture path");
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: TestCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
        cases.push((name, case));
    }

    assert!(!cases.is_empty(), "No test fixtures found for {}", pattern);
    cases
}

#[test]
fn test_sanitizer_golden_files() {
    for (name, case) in load_test_cases() {
        println!("Testing: {}", name);

        // Models usually fence their JSON; make sure that path is covered too.
        let raw = format!("```json\n{}\n```", case.draft);
        let draft = parse_draft(&raw).unwrap_or_else(|e| panic!("Parse failed for {}: {}", name, e));

        let constraints = derive_constraints(&case.request);
        let output = sanitize(draft, &case.request, &constraints);
        let recipe = &output.recipe;
        let expected = &case.expected;

        let steps: Vec<&str> = recipe.mash_schedule.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(steps, expected.mash_steps, "Mash steps mismatch for {}", name);
        assert_eq!(recipe.mash_schedule[0].temp, expected.mash_in_temp, "Mash in for {}", name);
        assert_eq!(
            recipe.mash_schedule.last().unwrap().temp,
            expected.mash_out_temp,
            "Mash out for {}",
            name
        );

        let hops: Vec<(&str, &str)> = recipe
            .hops
            .iter()
            .map(|h| (h.name.as_str(), h.time.as_str()))
            .collect();
        let expected_hops: Vec<(&str, &str)> = expected
            .hops
            .iter()
            .map(|h| (h.name.as_str(), h.time.as_str()))
            .collect();
        assert_eq!(hops, expected_hops, "Hops mismatch for {}", name);
        for hop in &recipe.hops {
            assert!(hop.alpha.unwrap_or(0.0) > 0.0, "Non-hop {} kept for {}", hop.name, name);
        }

        for extra in &expected.extras_present {
            assert!(
                recipe.extras.iter().any(|e| &e.name == extra),
                "Missing extra {} for {}",
                extra,
                name
            );
        }
        for extra in &expected.extras_absent {
            assert!(
                recipe.extras.iter().all(|e| &e.name != extra),
                "Unexpected extra {} for {}",
                extra,
                name
            );
        }

        assert_eq!(recipe.specs.mash_water, expected.mash_water, "Mash water for {}", name);
        assert_eq!(recipe.specs.sparge_water, expected.sparge_water, "Sparge water for {}", name);
        assert_eq!(
            (recipe.conditioning_days_min, recipe.conditioning_days_max),
            (Some(expected.conditioning_days.0), Some(expected.conditioning_days.1)),
            "Conditioning mismatch for {}",
            name
        );
        assert_eq!(recipe.specs.carbonation, Some(expected.carbonation), "Carbonation for {}", name);

        let serialized = serde_json::to_string(recipe).unwrap().to_lowercase();
        for text in &expected.forbidden_text {
            assert!(
                !serialized.contains(text.as_str()),
                "Found forbidden text {:?} in {}",
                text,
                name
            );
        }

        if expected.water_override {
            let source = case
                .request
                .source_water_profile
                .as_ref()
                .and_then(|p| p.exact())
                .expect("water override fixtures need an expert source profile");
            let target = recipe.water_profile.as_ref().unwrap().to_minerals().unwrap();
            let additions: Vec<_> = calculate_additions(source, &target, constraints.batch_liters)
                .into_iter()
                .map(brewgen_core::types::Extra::from)
                .collect();
            assert!(!additions.is_empty(), "Calculator produced nothing for {}", name);

            let agents: Vec<_> = recipe
                .extras
                .iter()
                .filter(|e| e.kind == ExtraType::WaterAgent)
                .cloned()
                .collect();
            assert_eq!(agents, additions, "Water agents mismatch for {}", name);
        }
    }
}
