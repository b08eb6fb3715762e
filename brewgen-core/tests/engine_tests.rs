//! End-to-end generation tests against the fake provider.

use std::sync::Arc;

use brewgen_core::llm::FakeProvider;
use brewgen_core::rules::{MashMethod, YeastForm};
use brewgen_core::types::ExtraType;
use brewgen_core::{
    calculate_additions, CompletionGateway, EngineConfig, EngineError, GenerationStage,
    InMemoryRecipeStore, ModelParameters, PersistenceStatus, PlanLimitGate, RecipeEngine,
    RecipeRequest,
};

const IPA_DRAFT: &str = r#"Here is your recipe!
```json
{
  "name": "Coastline IPA",
  "description": "Crisp, bitter and piney.",
  "specs": {"og": "1.062", "fg": "1.010", "abv": "6.8%", "ibu": "60", "srm": "6"},
  "malts": [{"name": "2-Row", "amount": "5.5 kg"}, {"name": "Crystal 15", "amount": "250 g"}],
  "hops": [
    {"name": "Columbus", "amount": "25 g", "time": "60 min", "boil_time": 60, "alpha": 15},
    {"name": "Simcoe", "amount": "40 g", "time": "Dry Hop Day 5", "alpha": 13},
    {"name": "Centennial", "amount": "30 g", "time": "10 min", "boil_time": 10, "alpha": 10}
  ],
  "yeast": {"name": "SafAle US-05", "type": "dry", "amount": "1 packet"},
  "extras": [{"name": "Simcoe dry hop", "amount": "40", "unit": "g", "type": "other", "use": "dry hop", "time": "day 5"}],
  "mash_schedule": [
    {"step": "Dough In", "temp": "67°C", "time": "5 min"},
    {"step": "Beta Rest", "temp": "63°C", "time": "30 min"},
    {"step": "Alpha Rest", "temp": "70°C", "time": "30 min"},
    {"step": "Mash Out", "temp": "76°C", "time": "10 min"}
  ],
  "fermentation_instructions": ["Ferment at 19°C.", "Dry hop with Simcoe on day 5."]
}
```
Cheers!"#;

const BERLINER_DRAFT: &str = r#"{
  "name": "Tart Weisse",
  "specs": {"og": "1.030", "fg": "1.005", "abv": "3.3%", "ibu": "4", "srm": "2"},
  "malts": [{"name": "Pilsner malt", "amount": "40 kg"}, {"name": "Wheat malt", "amount": "40 kg"}],
  "hops": [
    {"name": "Hallertau", "amount": "200 g", "time": "First Wort", "boil_time": 0, "alpha": 4},
    {"name": "Tettnang", "amount": "100 g", "time": "Mash Hop", "alpha": 4.5}
  ],
  "yeast": "SafAle US-05",
  "extras": [
    {"name": "Calcium Chloride", "amount": "80", "unit": "g", "type": "water_agent", "use": "mash"},
    {"name": "Lactic acid 88%", "amount": "50", "unit": "ml", "type": "water_agent", "use": "mash"}
  ],
  "mash_schedule": [{"step": "Saccharification", "temp": "65°C", "time": "60 min"}],
  "waterProfile": {"ca": 50, "mg": 5, "na": 10, "cl": 60, "so4": 30, "hco3": 10}
}"#;

fn request(json: serde_json::Value) -> RecipeRequest {
    serde_json::from_value(json).unwrap()
}

fn engine(provider: Arc<FakeProvider>, store: Arc<InMemoryRecipeStore>) -> RecipeEngine {
    let gate = Arc::new(PlanLimitGate::new(store.clone(), 100));
    RecipeEngine::new(
        CompletionGateway::new(provider, ModelParameters::default()),
        store,
        gate,
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_beginner_west_coast_ipa() {
    let provider = Arc::new(FakeProvider::always(IPA_DRAFT));
    let store = Arc::new(InMemoryRecipeStore::new());
    let engine = engine(provider.clone(), store.clone());
    let request = request(serde_json::json!({
        "expertise": "beginner",
        "equipment": "pot",
        "beerStyle": "West Coast IPA",
        "batchSize": 20,
        "units": "metric",
        "useDryHop": false
    }));

    let outcome = engine.generate("alice", &request).await.unwrap();
    let recipe = &outcome.recipe;

    assert_eq!(outcome.constraints.mash.method, MashMethod::SingleInfusion);
    let steps: Vec<&str> = recipe.mash_schedule.iter().map(|s| s.step.as_str()).collect();
    assert_eq!(steps, vec!["Mash In", "Beta Rest", "Mash Out"]);

    assert_eq!(outcome.constraints.yeast.form, YeastForm::DryOnly);
    let prompt = provider.last_request().unwrap();
    assert!(prompt.messages[1].content.contains("Dry yeast only"));

    assert!(recipe.hops.iter().all(|h| !h.time.to_lowercase().contains("dry hop")));
    assert!(recipe.extras.iter().all(|e| !e.name.to_lowercase().contains("dry hop")));
    assert_eq!(recipe.fermentation_instructions, vec!["Ferment at 19°C.".to_string()]);
    assert_eq!(recipe.specs.sparge_water, "0 L");

    assert!(matches!(outcome.persistence, PersistenceStatus::Saved { .. }));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_expert_berliner_weisse_kettle_sour() {
    let provider = Arc::new(FakeProvider::always(BERLINER_DRAFT));
    let store = Arc::new(InMemoryRecipeStore::new());
    let engine = engine(provider.clone(), store);
    let request = request(serde_json::json!({
        "expertise": "expert",
        "equipment": "professional",
        "beerStyle": "Berliner Weisse",
        "batchSize": 200,
        "sourceWaterProfile": {"mode": "expert", "ca": 20, "mg": 5, "na": 10, "cl": 20, "so4": 15, "hco3": 10}
    }));

    let outcome = engine.generate("brewery-1", &request).await.unwrap();
    let recipe = &outcome.recipe;

    assert!(outcome.constraints.is_kettle_sour());
    assert!(outcome.constraints.hops.boil_only_after_souring);
    let prompt = provider.last_request().unwrap();
    assert!(prompt.messages[1].content.to_lowercase().contains("kettle"));

    for hop in &recipe.hops {
        assert_eq!(hop.time, "60 min", "{} should be a boil addition", hop.name);
        assert_eq!(hop.boil_time, Some(60.0));
    }
    assert_eq!(outcome.report.hops_retagged_for_souring, 2);
    assert_eq!(outcome.report.first_wort_promoted, 0);

    let source = request.source_water_profile.as_ref().unwrap().exact().unwrap();
    let target = recipe.water_profile.as_ref().unwrap().to_minerals().unwrap();
    let expected: Vec<_> = calculate_additions(source, &target, 200.0)
        .into_iter()
        .map(brewgen_core::types::Extra::from)
        .collect();
    let agents: Vec<_> = recipe
        .extras
        .iter()
        .filter(|e| e.kind == ExtraType::WaterAgent)
        .cloned()
        .collect();
    assert!(!expected.is_empty());
    assert_eq!(agents, expected);
}

#[tokio::test]
async fn test_malformed_response_persists_nothing() {
    let provider = Arc::new(FakeProvider::always("Sorry, I can only talk about wine."));
    let store = Arc::new(InMemoryRecipeStore::new());
    let engine = engine(provider, store.clone());
    let request = request(serde_json::json!({
        "expertise": "intermediate",
        "equipment": "all-in-one",
        "beerStyle": "Dry Stout",
        "batchSize": 23
    }));

    let failure = engine.run("alice", &request).await.unwrap_err();
    assert!(matches!(failure.error, EngineError::MalformedOutput { .. }));
    assert_eq!(failure.stage, GenerationStage::DraftReceived);
    assert_eq!(
        failure.trail,
        vec![
            GenerationStage::Requested,
            GenerationStage::ConstraintsDerived,
            GenerationStage::PromptComposed,
            GenerationStage::CompletionPending,
            GenerationStage::DraftReceived,
            GenerationStage::Failed,
        ]
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_concurrent_generations_are_independent() {
    let provider = Arc::new(FakeProvider::default());
    let store = Arc::new(InMemoryRecipeStore::new());
    let engine = Arc::new(engine(provider.clone(), store.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let request = request(serde_json::json!({
                "expertise": "intermediate",
                "equipment": "pot",
                "beerStyle": "Pale Ale",
                "batchSize": 10 + i
            }));
            engine.generate(&format!("owner-{i}"), &request).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.persistence.recipe_id().is_some());
    }
    assert_eq!(store.len(), 8);
    assert_eq!(provider.call_count(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_generations_respect_plan_limit() {
    let provider = Arc::new(FakeProvider::default());
    let store = Arc::new(InMemoryRecipeStore::new());
    let gate = Arc::new(PlanLimitGate::new(store.clone(), 3));
    let engine = Arc::new(RecipeEngine::new(
        CompletionGateway::new(provider, ModelParameters::default()),
        store.clone(),
        gate,
        EngineConfig::default(),
    ));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let request = request(serde_json::json!({
                "expertise": "intermediate",
                "equipment": "pot",
                "beerStyle": "Pale Ale",
                "batchSize": 20
            }));
            engine.generate("alice", &request).await
        }));
    }

    let mut saved = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap().persistence {
            PersistenceStatus::Saved { .. } => saved += 1,
            PersistenceStatus::LimitReached => limited += 1,
            other => panic!("unexpected persistence {other:?}"),
        }
    }
    assert_eq!(saved, 3);
    assert_eq!(limited, 7);
    assert_eq!(store.len(), 3);
}

const MIXED_UNIT_DRAFT: &str = r#"{
  "name": "Harbour Pale",
  "specs": {"og": "1.048", "fg": "1.010", "abv": "5.0%", "ibu": "32", "srm": "6"},
  "malts": [{"name": "Pale Ale malt", "amount": "4.2 kg"}],
  "hops": [
    {"name": "Magnum", "amount": "15 g", "time": "60 min", "boil_time": 60, "alpha": 12},
    {"name": "Citra", "amount": "30 g", "time": "Flameout", "boil_time": 0, "alpha": 12}
  ],
  "yeast": {"name": "SafAle US-05", "type": "dry", "amount": "1 packet"},
  "mash_schedule": [{"step": "Saccharification", "temp": "66°C (151°F)", "time": "60 min"}],
  "fermentation_instructions": [
    "Ferment at 18°C to keep fruity esters low.",
    "Soak nothing; cold crash at 2°C for 2 days."
  ]
}"#;

#[tokio::test]
async fn test_mixed_unit_mash_and_plain_instructions_survive() {
    let provider = Arc::new(FakeProvider::always(MIXED_UNIT_DRAFT));
    let store = Arc::new(InMemoryRecipeStore::new());
    let engine = engine(provider, store);
    let request = request(serde_json::json!({
        "expertise": "intermediate",
        "equipment": "pot",
        "beerStyle": "American Pale Ale",
        "batchSize": 20,
        "units": "metric"
    }));

    let outcome = engine.generate("alice", &request).await.unwrap();
    let recipe = &outcome.recipe;

    let temps: Vec<&str> = recipe.mash_schedule.iter().map(|s| s.temp.as_str()).collect();
    assert_eq!(temps, vec!["69°C", "66°C", "78°C"]);

    let hops: Vec<&str> = recipe.hops.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(hops, vec!["Magnum", "Citra"]);
    assert_eq!(
        recipe.fermentation_instructions,
        vec![
            "Ferment at 18°C to keep fruity esters low.".to_string(),
            "Soak nothing; cold crash at 2°C for 2 days.".to_string(),
        ]
    );
    assert_eq!(outcome.report.add_on_entries_removed, 0);
}
