//! Engine orchestrator: one request in, one sanitized recipe out.
//!
//! A generation walks a linear sequence of [`GenerationStage`]s. The only
//! suspension point is the completion call, which is bounded by the
//! configured timeout and never retried. Persistence happens after the
//! recipe is built and can only degrade the outcome, never fail it.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info_span, Instrument};

use crate::config::{ConfigError, EngineConfig, LlmConfig};
use crate::error::{EngineError, GenerationFailure, ValidationError};
use crate::gateway::{parse_draft, CompletionGateway, ModelParameters};
use crate::llm::{create_provider, LlmProvider, UnconfiguredProvider};
use crate::prompts::compose_prompt;
use crate::rules::{derive_constraints, DerivedConstraints};
use crate::sanitize::{sanitize, SanitizeReport, SanitizedOutput};
use crate::store::{BillingGate, InMemoryRecipeStore, PlanLimitGate, RecipeStore, StoredRecipe};
use crate::types::{Recipe, RecipeRequest, SanitizedRecipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Requested,
    ConstraintsDerived,
    PromptComposed,
    CompletionPending,
    DraftReceived,
    Sanitized,
    Done,
    Failed,
}

/// What happened to the recipe after it was generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceStatus {
    Saved { id: String },
    LimitReached,
    Failed { message: String },
}

impl PersistenceStatus {
    pub fn recipe_id(&self) -> Option<&str> {
        match self {
            PersistenceStatus::Saved { id } => Some(id),
            _ => None,
        }
    }

    pub fn limit_reached(&self) -> bool {
        matches!(self, PersistenceStatus::LimitReached)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub recipe: SanitizedRecipe,
    pub report: SanitizeReport,
    pub constraints: DerivedConstraints,
    pub stages: Vec<GenerationStage>,
    pub persistence: PersistenceStatus,
}

/// Stage bookkeeping for one generation.
#[derive(Debug, Default)]
struct Trail {
    stages: Vec<GenerationStage>,
}

impl Trail {
    fn advance(&mut self, stage: GenerationStage) {
        tracing::debug!(stage = ?stage, "Generation stage");
        self.stages.push(stage);
    }

    fn fail(mut self, error: impl Into<EngineError>) -> GenerationFailure {
        let error = error.into();
        let stage = self
            .stages
            .last()
            .copied()
            .unwrap_or(GenerationStage::Requested);
        tracing::warn!(stage = ?stage, code = error.code(), error = %error, "Recipe generation failed");
        self.stages.push(GenerationStage::Failed);
        GenerationFailure {
            stage,
            trail: self.stages,
            error,
        }
    }
}

fn validate_owner(owner_id: &str) -> Result<(), ValidationError> {
    if owner_id.trim().is_empty() {
        return Err(ValidationError::MissingOwner);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RecipeEngine {
    gateway: CompletionGateway,
    store: Arc<dyn RecipeStore>,
    gate: Arc<dyn BillingGate>,
    config: EngineConfig,
    /// Serializes gate check and save per owner within this engine.
    owner_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RecipeEngine {
    pub fn new(
        gateway: CompletionGateway,
        store: Arc<dyn RecipeStore>,
        gate: Arc<dyn BillingGate>,
        config: EngineConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            gate,
            config,
            owner_locks: Arc::new(DashMap::new()),
        }
    }

    /// Engine wired from the environment with an in-memory store and the
    /// free-plan gate.
    ///
    /// A missing or invalid LLM configuration is not fatal here: every
    /// generation then fails with [`EngineError::Configuration`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = EngineConfig::from_env()?;
        let (provider, parameters): (Arc<dyn LlmProvider>, ModelParameters) =
            match LlmConfig::from_env() {
                Ok(llm) => (create_provider(&llm), ModelParameters::from(&llm)),
                Err(e) => {
                    tracing::warn!(error = %e, "LLM provider is not configured");
                    (
                        Arc::new(UnconfiguredProvider::new(e.to_string())),
                        ModelParameters::default(),
                    )
                }
            };
        let store: Arc<dyn RecipeStore> = Arc::new(InMemoryRecipeStore::new());
        let gate = Arc::new(PlanLimitGate::new(store.clone(), config.free_recipe_limit));
        Ok(Self::new(
            CompletionGateway::new(provider, parameters),
            store,
            gate,
            config,
        ))
    }

    pub fn gateway(&self) -> &CompletionGateway {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate, sanitize and (best effort) save a recipe.
    pub async fn generate(
        &self,
        owner_id: &str,
        request: &RecipeRequest,
    ) -> Result<GenerationOutcome, EngineError> {
        self.run(owner_id, request).await.map_err(|failure| failure.error)
    }

    /// Like [`generate`](Self::generate), but a failure keeps the stage trail.
    pub async fn run(
        &self,
        owner_id: &str,
        request: &RecipeRequest,
    ) -> Result<GenerationOutcome, GenerationFailure> {
        let span = info_span!(
            "generate_recipe",
            owner_id,
            style = %request.beer_style,
            expertise = ?request.expertise,
        );
        self.run_stages(owner_id, request).instrument(span).await
    }

    async fn run_stages(
        &self,
        owner_id: &str,
        request: &RecipeRequest,
    ) -> Result<GenerationOutcome, GenerationFailure> {
        let mut trail = Trail::default();
        trail.advance(GenerationStage::Requested);

        if let Err(e) = validate_owner(owner_id).and_then(|()| request.validate()) {
            return Err(trail.fail(e));
        }

        let constraints = derive_constraints(request);
        trail.advance(GenerationStage::ConstraintsDerived);

        let prompt = compose_prompt(request, &constraints);
        trail.advance(GenerationStage::PromptComposed);

        trail.advance(GenerationStage::CompletionPending);
        let timeout = self.config.generation_timeout;
        let raw = match tokio::time::timeout(timeout, self.gateway.complete(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(trail.fail(e)),
            Err(_) => return Err(trail.fail(EngineError::Timeout(timeout))),
        };
        trail.advance(GenerationStage::DraftReceived);

        let draft = match parse_draft(&raw) {
            Ok(draft) => draft,
            Err(e) => return Err(trail.fail(e)),
        };

        let SanitizedOutput { recipe, report } = sanitize(draft, request, &constraints);
        trail.advance(GenerationStage::Sanitized);

        let persistence = self.persist(owner_id, &recipe).await;
        trail.advance(GenerationStage::Done);

        tracing::info!(
            recipe = %recipe.name,
            corrections = report.total_corrections(),
            saved = persistence.recipe_id().is_some(),
            "Recipe generated"
        );

        Ok(GenerationOutcome {
            recipe,
            report,
            constraints,
            stages: trail.stages,
            persistence,
        })
    }

    fn owner_lock(&self, owner_id: &str) -> Arc<Mutex<()>> {
        self.owner_locks
            .entry(owner_id.to_string())
            .or_default()
            .clone()
    }

    async fn persist(&self, owner_id: &str, recipe: &SanitizedRecipe) -> PersistenceStatus {
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;
        match self.gate.can_create_more(owner_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(owner_id, "Recipe limit reached, not saving");
                return PersistenceStatus::LimitReached;
            }
            Err(e) => {
                tracing::warn!(owner_id, error = %e, "Billing gate unavailable, not saving");
                return PersistenceStatus::Failed {
                    message: e.to_string(),
                };
            }
        }
        match self.store.save(owner_id, recipe).await {
            Ok(id) => PersistenceStatus::Saved { id },
            Err(e) => {
                tracing::warn!(owner_id, error = %e, "Failed to save generated recipe");
                PersistenceStatus::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Run the sanitizer over a recipe the caller already holds, so that
    /// only sanitized recipes reach the store.
    pub fn normalize(
        &self,
        request: &RecipeRequest,
        draft: Recipe,
    ) -> Result<SanitizedOutput, EngineError> {
        request.validate()?;
        let constraints = derive_constraints(request);
        Ok(sanitize(draft, request, &constraints))
    }

    /// Explicit save. Unlike generation, a denied gate is an error here.
    pub async fn save_recipe(
        &self,
        owner_id: &str,
        recipe: &SanitizedRecipe,
    ) -> Result<String, EngineError> {
        validate_owner(owner_id)?;
        let lock = self.owner_lock(owner_id);
        let _guard = lock.lock().await;
        if !self.gate.can_create_more(owner_id).await? {
            return Err(EngineError::LimitReached);
        }
        Ok(self.store.save(owner_id, recipe).await?)
    }

    pub async fn load_recipe(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<StoredRecipe>, EngineError> {
        validate_owner(owner_id)?;
        Ok(self.store.load(owner_id, id).await?)
    }
}
