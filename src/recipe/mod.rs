//! Structured recipe data model.
//!
//! Recipes are produced by the AI extraction collaborator (or loaded from a
//! JSON file) and then enriched in place by the aligner: the keyword matcher
//! fills `video_references`, the step timer fills `predicted_time`. Nothing
//! else mutates an instruction after creation.

use serde::{Deserialize, Serialize};

pub mod extract;

pub use extract::RecipeExtractor;

/// Per-step keyword lists used to find the step in the video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub techniques: Vec<String>,

    #[serde(default)]
    pub equipment: Vec<String>,
}

impl KeywordSet {
    /// All keywords across the three lists, in ingredient/technique/equipment
    /// order.
    pub fn all(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .chain(self.techniques.iter())
            .chain(self.equipment.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.techniques.is_empty() && self.equipment.is_empty()
    }
}

/// One retained keyword hit in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub timestamp_seconds: u64,
    pub context: String,
}

/// Final predicted time window for a step, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedTime {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

/// One instruction step. `step` is 1-based and defines the total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub step: u32,

    pub text: String,

    #[serde(default)]
    pub keywords: KeywordSet,

    #[serde(default)]
    pub video_references: Vec<KeywordMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_time: Option<PredictedTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,

    #[serde(default)]
    pub quantity: Option<String>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A structured recipe extracted from a cooking video transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default = "default_has_recipe")]
    pub has_recipe: bool,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub video_id: String,

    #[serde(default)]
    pub video_url: String,

    #[serde(default)]
    pub upload_date: String,

    #[serde(default)]
    pub prep_time_minutes: Option<u32>,

    #[serde(default)]
    pub cook_time_minutes: Option<u32>,

    #[serde(default)]
    pub total_time_minutes: Option<u32>,

    #[serde(default)]
    pub servings: Option<u32>,

    #[serde(default, rename = "yield")]
    pub yield_text: Option<String>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    pub cuisine_type: Vec<String>,

    #[serde(default)]
    pub meal_type: Vec<String>,

    #[serde(default)]
    pub dietary_tags: Vec<String>,

    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    #[serde(default)]
    pub instructions: Vec<Instruction>,

    #[serde(default)]
    pub equipment: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub tips: Vec<String>,
}

fn default_has_recipe() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_all_preserves_order() {
        let set = KeywordSet {
            ingredients: vec!["butter".into()],
            techniques: vec!["fold".into()],
            equipment: vec!["spatula".into()],
        };
        assert_eq!(set.all(), vec!["butter", "fold", "spatula"]);
        assert!(!set.is_empty());
        assert!(KeywordSet::default().is_empty());
    }

    #[test]
    fn test_recipe_deserializes_from_snake_case_json() {
        let json = r#"{
            "has_recipe": true,
            "title": "Weeknight Carbonara",
            "instructions": [
                {
                    "step": 1,
                    "text": "Boil the spaghetti.",
                    "keywords": {
                        "ingredients": ["spaghetti"],
                        "techniques": ["boil"],
                        "equipment": ["pot"]
                    }
                }
            ]
        }"#;

        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.has_recipe);
        assert_eq!(recipe.instructions.len(), 1);
        assert_eq!(recipe.instructions[0].step, 1);
        assert!(recipe.instructions[0].video_references.is_empty());
        assert!(recipe.instructions[0].predicted_time.is_none());
    }

    #[test]
    fn test_predicted_time_serializes_in_seconds() {
        let inst = Instruction {
            step: 1,
            text: "Rest the meat.".into(),
            keywords: KeywordSet::default(),
            video_references: Vec::new(),
            predicted_time: Some(PredictedTime {
                start_seconds: 30,
                end_seconds: 90,
            }),
        };

        let json = serde_json::to_value(&inst).unwrap();
        assert_eq!(json["predicted_time"]["start_seconds"], 30);
        assert_eq!(json["predicted_time"]["end_seconds"], 90);
    }
}
