pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
mod lenient;
pub mod llm;
pub mod prompts;
pub mod rules;
pub mod sanitize;
pub mod store;
pub mod types;
pub mod units;
pub mod water;

pub use config::{ConfigError, EngineConfig, LlmConfig, ProviderKind};
pub use engine::{GenerationOutcome, GenerationStage, PersistenceStatus, RecipeEngine};
pub use error::{EngineError, GatewayError, GenerationFailure, StoreError, ValidationError};
pub use gateway::{CompletionGateway, ModelParameters};
pub use prompts::{compose_prompt, ComposedPrompt};
pub use rules::{derive_constraints, DerivedConstraints};
pub use sanitize::{sanitize, SanitizeReport, SanitizedOutput};
pub use store::{
    BillingGate, InMemoryRecipeStore, PlanLimitGate, RecipeStore, StoredRecipe, UnlimitedGate,
};
pub use types::{Recipe, RecipeRequest, SanitizedRecipe};
pub use water::{calculate_additions, MineralProfile, WaterAddition};
