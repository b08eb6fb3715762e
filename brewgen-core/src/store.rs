//! Persistence and billing collaborators.
//!
//! The engine only talks to these traits. [`InMemoryRecipeStore`] backs the
//! server and the tests; a database-backed store implements the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{Recipe, SanitizedRecipe};

/// A saved recipe as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StoredRecipe {
    pub id: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub recipe: Recipe,
}

#[async_trait]
pub trait RecipeStore: Send + Sync + std::fmt::Debug {
    /// Persist a recipe and return its new id.
    async fn save(&self, owner_id: &str, recipe: &SanitizedRecipe) -> Result<String, StoreError>;

    async fn load(&self, owner_id: &str, id: &str) -> Result<Option<StoredRecipe>, StoreError>;

    /// Number of recipes the owner has saved.
    async fn count(&self, owner_id: &str) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait BillingGate: Send + Sync + std::fmt::Debug {
    async fn can_create_more(&self, owner_id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
struct Document {
    created_at: DateTime<Utc>,
    body: serde_json::Value,
}

/// Recipe store kept in memory, keyed by (owner, id).
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    documents: DashMap<(String, String), Document>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total recipes across all owners.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn save(&self, owner_id: &str, recipe: &SanitizedRecipe) -> Result<String, StoreError> {
        let body = serde_json::to_value(recipe)?;
        let id = Uuid::new_v4().to_string();
        self.documents.insert(
            (owner_id.to_string(), id.clone()),
            Document {
                created_at: Utc::now(),
                body,
            },
        );
        tracing::debug!(owner_id, id = %id, "Saved recipe");
        Ok(id)
    }

    async fn load(&self, owner_id: &str, id: &str) -> Result<Option<StoredRecipe>, StoreError> {
        let Some(document) = self
            .documents
            .get(&(owner_id.to_string(), id.to_string()))
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };
        let recipe = serde_json::from_value(document.body)?;
        Ok(Some(StoredRecipe {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            created_at: document.created_at,
            recipe,
        }))
    }

    async fn count(&self, owner_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == owner_id)
            .count())
    }
}

/// Free-plan gate: an owner may hold at most `limit` saved recipes.
#[derive(Debug, Clone)]
pub struct PlanLimitGate {
    store: Arc<dyn RecipeStore>,
    limit: usize,
}

impl PlanLimitGate {
    pub fn new(store: Arc<dyn RecipeStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[async_trait]
impl BillingGate for PlanLimitGate {
    async fn can_create_more(&self, owner_id: &str) -> Result<bool, StoreError> {
        let saved = self.store.count(owner_id).await?;
        Ok(saved < self.limit)
    }
}

/// Gate that never denies, for subscribed owners and local tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedGate;

#[async_trait]
impl BillingGate for UnlimitedGate {
    async fn can_create_more(&self, _owner_id: &str) -> Result<bool, StoreError> {
        Ok(true)
    }
}
