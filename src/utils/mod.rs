use url::Url;

use crate::{Result, StepscribeError};

/// Extract the video id from a supported video URL.
pub fn extract_video_id(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|_| StepscribeError::InvalidUrl(url.to_string()))?;

    let host = parsed
        .host_str()
        .unwrap_or_default()
        .trim_start_matches("www.");

    let id = match host {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        host if host == "youtube.com" || host.ends_with(".youtube.com") => {
            if parsed.path() == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
            } else {
                parsed.path_segments().and_then(|segments| {
                    let segments: Vec<&str> = segments.collect();
                    match segments.as_slice() {
                        ["embed", id] | ["v", id] => Some((*id).to_string()),
                        _ => None,
                    }
                })
            }
        }
        _ => None,
    };

    id.filter(|id| !id.is_empty())
        .ok_or_else(|| StepscribeError::InvalidUrl(url.to_string()).into())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for YouTube caption extraction".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
