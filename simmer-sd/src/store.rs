//! Recipe store
//!
//! Canonical recipe persistence: a single JSON array file under the data
//! folder, re-hydrated wholesale at startup and rewritten wholesale after
//! each mutation. Recipes are validated before they are accepted, so the
//! session engine only ever reads well-formed content.
//!
//! Session state is deliberately not persisted here (or anywhere): a
//! process restart loses in-progress cooking sessions.

use crate::error::Result;
use simmer_common::recipe::Recipe;
use simmer_common::time;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// File name of the recipe array inside the data folder
pub const RECIPES_FILE: &str = "recipes.json";

/// Shared handle to the recipe collection
#[derive(Clone)]
pub struct RecipeStore {
    recipes: Arc<RwLock<Vec<Recipe>>>,
    path: PathBuf,
}

impl RecipeStore {
    /// Load the store from `data_folder`, creating the folder if needed.
    /// A missing recipes file hydrates to an empty collection.
    pub async fn load(data_folder: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_folder).await?;
        let path = data_folder.join(RECIPES_FILE);

        let recipes: Vec<Recipe> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(simmer_common::Error::from)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} recipes from {}", recipes.len(), path.display());
        Ok(Self {
            recipes: Arc::new(RwLock::new(recipes)),
            path,
        })
    }

    /// Look up a recipe by id
    pub async fn get(&self, id: Uuid) -> Option<Recipe> {
        self.recipes.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// All recipes, in insertion order
    pub async fn list(&self) -> Vec<Recipe> {
        self.recipes.read().await.clone()
    }

    /// Insert or replace a recipe.
    ///
    /// Validates first; an existing entry keeps its original `created_at`
    /// and the update timestamp is refreshed.
    pub async fn upsert(&self, mut recipe: Recipe) -> Result<()> {
        recipe.validate().map_err(simmer_common::Error::from)?;
        recipe.updated_at = time::now();

        let mut recipes = self.recipes.write().await;
        match recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => {
                recipe.created_at = existing.created_at;
                *existing = recipe;
            }
            None => recipes.push(recipe),
        }
        self.persist(&recipes).await
    }

    /// Set the favorite flag. Returns false when the recipe is unknown.
    pub async fn set_favorite(&self, id: Uuid, favorite: bool) -> Result<bool> {
        let mut recipes = self.recipes.write().await;
        let Some(recipe) = recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        recipe.is_favorite = favorite;
        recipe.updated_at = time::now();
        self.persist(&recipes).await?;
        Ok(true)
    }

    /// Remove a recipe. Returns false when the recipe is unknown.
    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        if recipes.len() == before {
            return Ok(false);
        }
        self.persist(&recipes).await?;
        Ok(true)
    }

    /// Rewrite the whole array to disk
    async fn persist(&self, recipes: &[Recipe]) -> Result<()> {
        let json = serde_json::to_string_pretty(recipes).map_err(simmer_common::Error::from)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Persisted {} recipes to {}", recipes.len(), self.path.display());
        Ok(())
    }
}
