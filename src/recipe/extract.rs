//! AI-backed recipe extraction from a transcript.
//!
//! Sends the transcript and video metadata to an OpenAI chat-completions
//! endpoint and parses the structured JSON reply. A video that contains no
//! recipe (interview, Q&A) is a clean `None`, not an error.

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use crate::fetch::VideoMetadata;
use crate::{Result, StepscribeError};

use super::Recipe;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are an expert recipe extractor. Extract structured recipe data \
     from cooking video transcripts. Always use snake_case for JSON keys.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// OpenAI-backed recipe extractor.
pub struct RecipeExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl RecipeExtractor {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Extract a structured recipe from the transcript, or `None` when the
    /// video does not contain one.
    pub async fn extract(
        &self,
        metadata: &VideoMetadata,
        transcript_text: &str,
    ) -> Result<Option<Recipe>> {
        tracing::info!(video_id = %metadata.id, model = %self.model, "extracting recipe");

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(metadata, transcript_text) },
            ],
            "temperature": 0.3,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call recipe extraction API")?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(StepscribeError::RecipeExtractionFailed(format!(
                "HTTP {}: {}",
                status, detail
            ))
            .into());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to read recipe extraction response")?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                StepscribeError::RecipeExtractionFailed("empty response".to_string())
            })?;

        let recipe: Recipe =
            serde_json::from_str(content).context("Failed to parse extracted recipe JSON")?;

        if !recipe.has_recipe {
            tracing::info!(video_id = %metadata.id, "video contains no recipe");
            return Ok(None);
        }

        Ok(Some(recipe))
    }
}

fn build_prompt(metadata: &VideoMetadata, transcript_text: &str) -> String {
    let description: String = metadata.description.chars().take(200).collect();

    format!(
        r#"Extract a structured recipe from this cooking video transcript.

Video Title: {title}
Video ID: {id}
Upload Date: {upload_date}
Description: {description}

Please analyze the transcript and extract:
1. Recipe title (use video title if appropriate, or extract the dish name)
2. Complete ingredient list with quantities and units
3. Step-by-step instructions with keywords for each step
4. Prep time, cook time, total time (estimate from video)
5. Servings/yield
6. Tags (cuisine type, meal type, dietary restrictions, etc.)
7. Difficulty level (easy/medium/hard)
8. Required equipment

For each instruction step, identify keywords that would help find that step in the video:
- ingredients: ingredient names referenced in that step
- techniques: cooking techniques used (e.g., sear, fold, whisk, chop, simmer)
- equipment: equipment used in that step

If this video does NOT contain a recipe (e.g., it's an interview, Q&A, or non-cooking content), respond with {{"has_recipe": false}}.

Return ONLY a valid JSON object using snake_case keys, with this structure:
{{
  "has_recipe": true,
  "title": "Recipe Name",
  "description": "Brief description of the dish",
  "video_id": "{id}",
  "upload_date": "{upload_date}",
  "prep_time_minutes": 15,
  "cook_time_minutes": 30,
  "total_time_minutes": 45,
  "servings": 4,
  "yield": "4 servings",
  "difficulty": "medium",
  "cuisine_type": ["american"],
  "meal_type": ["dinner"],
  "dietary_tags": [],
  "ingredients": [
    {{ "item": "ingredient name", "quantity": "2", "unit": "cups", "notes": "optional notes" }}
  ],
  "instructions": [
    {{
      "step": 1,
      "text": "Detailed instruction text",
      "keywords": {{
        "ingredients": ["ingredient1"],
        "techniques": ["sear"],
        "equipment": ["skillet"]
      }}
    }}
  ],
  "equipment": ["skillet"],
  "tags": ["quick"],
  "tips": []
}}

Transcript:
{transcript}
"#,
        title = metadata.title,
        id = metadata.id,
        upload_date = metadata.upload_date,
        description = description,
        transcript = transcript_text,
    )
}
