//! Prompt templates.

pub mod recipe;

pub use recipe::{compose_prompt, ComposedPrompt, RECIPE_PROMPT_NAME};
