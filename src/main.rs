use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stepscribe::cli::{Cli, Commands};
use stepscribe::config::Config;
use stepscribe::pipeline::AlignmentPipeline;
use stepscribe::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().await?;

    match cli.command {
        Commands::Extract {
            url,
            output,
            format,
            timestamps,
            skip_cache,
        } => {
            warn_missing_dependencies(&url).await;

            let pipeline = AlignmentPipeline::new(config).await?;

            tracing::info!("Starting extraction for: {}", url);
            let (data, report) = pipeline.extract(&url, skip_cache).await?;

            let content = output::render_extraction(&data, &format, timestamps)?;
            match output {
                Some(path) => {
                    output::save_to_file(&content, &path).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => println!("{}", content),
            }

            if !cli.quiet {
                let source = if report.cache_hit { "cache" } else { "fetch" };
                eprintln!(
                    "{} {} segments from {} ({})",
                    style("✓").green(),
                    report.segment_count,
                    source,
                    utils::format_duration(data.metadata.duration)
                );
            }
        }

        Commands::Align {
            url,
            recipe,
            output,
            format,
            skip_cache,
        } => {
            warn_missing_dependencies(&url).await;

            let provided = match recipe {
                Some(path) => {
                    let content = fs_err::read_to_string(&path)?;
                    Some(serde_json::from_str(&content)?)
                }
                None => None,
            };

            let pipeline = AlignmentPipeline::new(config).await?;

            tracing::info!("Starting alignment for: {}", url);
            let (aligned, report) = pipeline.align(&url, provided, skip_cache).await?;

            let content = output::render_recipe(&aligned, &format)?;
            match output {
                Some(path) => {
                    output::save_to_file(&content, &path).await?;
                    println!("Aligned recipe saved to: {}", path.display());
                }
                None => println!("{}", content),
            }

            if !cli.quiet {
                eprintln!(
                    "{} {} keyword matches across {} steps",
                    style("✓").green(),
                    report.matches_found,
                    report.steps_timed
                );
            }
        }

        Commands::Batch {
            file,
            concurrency,
            skip_cache,
        } => {
            let urls: Vec<String> = fs_err::read_to_string(&file)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect();

            if urls.is_empty() {
                println!("No URLs found in {}", file.display());
                return Ok(());
            }

            let concurrency = concurrency.unwrap_or(config.app.max_concurrent_jobs);
            let pipeline = AlignmentPipeline::new(config).await?;

            tracing::info!(count = urls.len(), concurrency, "starting batch extraction");
            let summary = pipeline.extract_batch(&urls, concurrency, skip_cache).await;

            println!("{}", style("Batch summary").bold());
            println!("  Processed: {}", summary.processed);
            println!("  Succeeded: {}", summary.succeeded);
            println!("  From cache: {}", summary.cached);
            println!("  Failed: {}", summary.failed.len());
            for (url, error) in &summary.failed {
                println!("    {} {}: {}", style("✗").red(), url, error);
            }
        }

        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.interactive_setup().await?;
            }
        }

        Commands::Platforms => {
            println!("Supported inputs:");
            println!("  • YouTube (youtube.com, youtu.be)");
            println!("  • Local caption files (.vtt)");
        }
    }

    Ok(())
}

/// Warn (non-fatally) when yt-dlp is missing and the input needs it.
async fn warn_missing_dependencies(input: &str) {
    if !input.starts_with("http://") && !input.starts_with("https://") {
        return;
    }

    let missing = utils::check_dependencies().await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
    }
}
