use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::ExtractionData;
use crate::recipe::Recipe;

/// Render an extraction result in the requested format.
pub fn render_extraction(
    data: &ExtractionData,
    format: &OutputFormat,
    timestamps: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_extraction_text(data, timestamps)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
    }
}

/// Render an aligned recipe in the requested format.
pub fn render_recipe(recipe: &Recipe, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_recipe_text(recipe)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(recipe)?),
    }
}

/// Save rendered content to a file
pub async fn save_to_file(content: &str, path: &Path) -> Result<()> {
    fs_err::write(path, content)?;
    Ok(())
}

fn format_extraction_text(data: &ExtractionData, timestamps: bool) -> String {
    let Some(transcript) = &data.transcript else {
        return format!("(no captions available for {})\n", data.metadata.id);
    };

    if !timestamps {
        return transcript.plain_text.clone();
    }

    transcript
        .segments
        .iter()
        .map(|seg| format!("[{}] {}", format_clock(seg.start_time), seg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_recipe_text(recipe: &Recipe) -> String {
    let mut out = String::new();

    out.push_str(&recipe.title);
    out.push('\n');

    if !recipe.description.is_empty() {
        out.push_str(&recipe.description);
        out.push('\n');
    }

    if !recipe.ingredients.is_empty() {
        out.push_str("\nIngredients:\n");
        for ingredient in &recipe.ingredients {
            let mut line = String::from("  - ");
            if let Some(quantity) = &ingredient.quantity {
                line.push_str(quantity);
                line.push(' ');
            }
            if let Some(unit) = &ingredient.unit {
                line.push_str(unit);
                line.push(' ');
            }
            line.push_str(&ingredient.item);
            out.push_str(&line);
            out.push('\n');
        }
    }

    if !recipe.instructions.is_empty() {
        out.push_str("\nSteps:\n");
        for instruction in &recipe.instructions {
            match instruction.predicted_time {
                Some(time) => out.push_str(&format!(
                    "  {}. [{}-{}] {}\n",
                    instruction.step,
                    format_clock(time.start_seconds as f64),
                    format_clock(time.end_seconds as f64),
                    instruction.text
                )),
                None => out.push_str(&format!("  {}. {}\n", instruction.step, instruction.text)),
            }
        }
    }

    out
}

/// Format seconds as MM:SS, or H:MM:SS past the hour mark.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
