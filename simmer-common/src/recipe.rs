//! Recipe data model and save-time validation
//!
//! Recipes are immutable while a session references them: the session engine
//! only ever reads them, and step order is the cooking order. Validation
//! runs when a recipe is saved, so invalid step payloads never reach the
//! session engine.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recipe difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single recipe ingredient
///
/// Steps reference ingredients by id; the canonical list lives on the recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    /// Amount in `unit`, must be positive
    pub quantity: f64,
    /// Unit label ("g", "ml", "pcs", ...)
    pub unit: String,
}

/// Appliance settings for a cooking step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookSettings {
    /// Temperature in °C, valid range 40-200
    pub temperature: i32,
    /// Stir speed, valid range 1-5
    pub speed: u8,
}

/// Minimum cooking temperature in °C
pub const MIN_TEMPERATURE: i32 = 40;
/// Maximum cooking temperature in °C
pub const MAX_TEMPERATURE: i32 = 200;
/// Minimum stir speed
pub const MIN_SPEED: u8 = 1;
/// Maximum stir speed
pub const MAX_SPEED: u8 = 5;

/// Step payload, determined by the step type
///
/// The tagged representation makes "exactly one payload, matching the step
/// type" a type invariant: a cooking step carries appliance settings and
/// cannot reference ingredients, an instruction step references ingredients
/// and cannot carry appliance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepDetail {
    /// Timed appliance step
    Cooking {
        #[serde(rename = "cookingSettings")]
        cooking_settings: CookSettings,
    },
    /// Manual preparation step, referencing zero or more recipe ingredients
    Instruction {
        #[serde(rename = "ingredientIds", default)]
        ingredient_ids: Vec<Uuid>,
    },
}

impl StepDetail {
    /// True for appliance (cooking) steps
    pub fn is_cooking(&self) -> bool {
        matches!(self, StepDetail::Cooking { .. })
    }
}

/// One step in a recipe's ordered cooking sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: Uuid,
    pub description: String,
    /// Step duration in whole minutes, must be positive
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    #[serde(flatten)]
    pub detail: StepDetail,
}

impl RecipeStep {
    /// Step duration in seconds, the unit the session engine counts in
    pub fn duration_sec(&self) -> u32 {
        self.duration_minutes * 60
    }
}

/// A recipe: canonical ingredient list plus the ordered step sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    pub difficulty: Difficulty,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<RecipeStep>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Total cooking time in seconds, summed over all steps
    pub fn total_duration_sec(&self) -> u32 {
        self.steps.iter().map(RecipeStep::duration_sec).sum()
    }

    /// Validate the recipe for saving.
    ///
    /// Rejects empty titles, step-less recipes, zero durations, appliance
    /// settings out of range, non-positive ingredient quantities, and
    /// instruction steps referencing unknown ingredient ids.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("recipe title must not be empty".into()));
        }
        if self.steps.is_empty() {
            return Err(Error::InvalidInput(
                "recipe must have at least one step".into(),
            ));
        }
        for ingredient in &self.ingredients {
            if ingredient.quantity <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "ingredient '{}' must have a positive quantity",
                    ingredient.name
                )));
            }
        }
        for (index, step) in self.steps.iter().enumerate() {
            self.validate_step(index, step)?;
        }
        Ok(())
    }

    fn validate_step(&self, index: usize, step: &RecipeStep) -> Result<()> {
        if step.duration_minutes == 0 {
            return Err(Error::InvalidInput(format!(
                "step {} must have a positive duration",
                index + 1
            )));
        }
        match &step.detail {
            StepDetail::Cooking { cooking_settings } => {
                if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&cooking_settings.temperature) {
                    return Err(Error::InvalidInput(format!(
                        "step {}: temperature must be {}-{} °C",
                        index + 1,
                        MIN_TEMPERATURE,
                        MAX_TEMPERATURE
                    )));
                }
                if !(MIN_SPEED..=MAX_SPEED).contains(&cooking_settings.speed) {
                    return Err(Error::InvalidInput(format!(
                        "step {}: speed must be {}-{}",
                        index + 1,
                        MIN_SPEED,
                        MAX_SPEED
                    )));
                }
            }
            StepDetail::Instruction { ingredient_ids } => {
                for ingredient_id in ingredient_ids {
                    if !self.ingredients.iter().any(|i| i.id == *ingredient_id) {
                        return Err(Error::InvalidInput(format!(
                            "step {}: unknown ingredient id {}",
                            index + 1,
                            ingredient_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooking_step(duration_minutes: u32) -> RecipeStep {
        RecipeStep {
            id: Uuid::new_v4(),
            description: "Simmer the sauce".to_string(),
            duration_minutes,
            detail: StepDetail::Cooking {
                cooking_settings: CookSettings {
                    temperature: 95,
                    speed: 2,
                },
            },
        }
    }

    fn instruction_step(duration_minutes: u32, ingredient_ids: Vec<Uuid>) -> RecipeStep {
        RecipeStep {
            id: Uuid::new_v4(),
            description: "Chop the onions".to_string(),
            duration_minutes,
            detail: StepDetail::Instruction { ingredient_ids },
        }
    }

    fn sample_recipe() -> Recipe {
        let onion = Ingredient {
            id: Uuid::new_v4(),
            name: "Onion".to_string(),
            quantity: 2.0,
            unit: "pcs".to_string(),
        };
        let now = Utc::now();
        Recipe {
            id: Uuid::new_v4(),
            title: "Tomato Sauce".to_string(),
            cuisine: Some("Italian".to_string()),
            difficulty: Difficulty::Easy,
            steps: vec![instruction_step(2, vec![onion.id]), cooking_step(3)],
            ingredients: vec![onion],
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_recipe_passes() {
        assert!(sample_recipe().validate().is_ok());
    }

    #[test]
    fn test_total_duration() {
        // 2 min + 3 min = 300 seconds
        assert_eq!(sample_recipe().total_duration_sec(), 300);
    }

    #[test]
    fn test_rejects_empty_title() {
        let mut recipe = sample_recipe();
        recipe.title = "  ".to_string();
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_no_steps() {
        let mut recipe = sample_recipe();
        recipe.steps.clear();
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let mut recipe = sample_recipe();
        recipe.steps[1].duration_minutes = 0;
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_temperature_out_of_range() {
        let mut recipe = sample_recipe();
        recipe.steps[1].detail = StepDetail::Cooking {
            cooking_settings: CookSettings {
                temperature: 250,
                speed: 2,
            },
        };
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_speed_out_of_range() {
        let mut recipe = sample_recipe();
        recipe.steps[1].detail = StepDetail::Cooking {
            cooking_settings: CookSettings {
                temperature: 95,
                speed: 0,
            },
        };
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_unknown_ingredient_reference() {
        let mut recipe = sample_recipe();
        recipe.steps[0].detail = StepDetail::Instruction {
            ingredient_ids: vec![Uuid::new_v4()],
        };
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut recipe = sample_recipe();
        recipe.ingredients[0].quantity = 0.0;
        assert!(matches!(recipe.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_step_detail_wire_format() {
        let step = cooking_step(3);
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "cooking");
        assert_eq!(json["durationMinutes"], 3);
        assert_eq!(json["cookingSettings"]["temperature"], 95);

        let step = instruction_step(2, vec![]);
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "instruction");
        assert!(json["ingredientIds"].is_array());
    }

    #[test]
    fn test_recipe_round_trips_through_json() {
        let recipe = sample_recipe();
        let json = serde_json::to_string(&recipe).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recipe);
    }
}
