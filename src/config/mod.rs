use anyhow::{Context, Result};
use aws_config::Region;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AWS configuration (S3 extraction cache)
    pub aws: AwsConfig,

    /// OpenAI configuration (recipe extraction)
    pub openai: OpenAiConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,

    /// S3 bucket for the extraction cache; empty means cache locally
    pub s3_bucket: String,

    /// Optional S3 key prefix
    pub s3_key_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat model used for recipe extraction
    pub model: String,

    /// API key; falls back to the OPENAI_API_KEY environment variable
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local cache directory override
    pub cache_dir: Option<PathBuf>,

    /// Minimum fuzzy similarity (0-100) for keyword matches
    pub fuzzy_threshold: u8,

    /// Default output format
    pub default_output_format: String,

    /// Maximum concurrent extractions in batch mode
    pub max_concurrent_jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: AwsConfig {
                region: "us-east-1".to_string(),
                s3_bucket: "".to_string(),
                s3_key_prefix: Some("combined/".to_string()),
            },
            openai: OpenAiConfig {
                model: "gpt-4o".to_string(),
                api_key: None,
            },
            app: AppConfig {
                cache_dir: None,
                fuzzy_threshold: 80,
                default_output_format: "text".to_string(),
                max_concurrent_jobs: 3,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("stepscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if !self.aws.s3_bucket.is_empty() && self.aws.region.is_empty() {
            anyhow::bail!("AWS region must be configured when an S3 bucket is set");
        }

        if self.app.fuzzy_threshold > 100 {
            anyhow::bail!("Fuzzy threshold must be between 0 and 100");
        }

        if self.app.max_concurrent_jobs == 0 {
            anyhow::bail!("Max concurrent jobs must be at least 1");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  AWS Region: {}", self.aws.region);
        if self.aws.s3_bucket.is_empty() {
            println!("  Cache: local");
        } else {
            println!("  Cache: s3://{}", self.aws.s3_bucket);
            if let Some(prefix) = &self.aws.s3_key_prefix {
                println!("  S3 Prefix: {}", prefix);
            }
        }
        println!("  OpenAI Model: {}", self.openai.model);
        println!("  Fuzzy Threshold: {}", self.app.fuzzy_threshold);
        println!("  Default Format: {}", self.app.default_output_format);
        println!("  Max Concurrent Jobs: {}", self.app.max_concurrent_jobs);
    }

    /// Interactive configuration setup
    pub async fn interactive_setup(&self) -> Result<()> {
        println!("Interactive configuration setup coming soon!");
        println!("For now, please edit the config file manually:");
        println!("  {}", Self::config_path()?.display());
        Ok(())
    }

    /// Get AWS region
    pub fn aws_region(&self) -> Region {
        Region::new(self.aws.region.clone())
    }

    /// Resolve the OpenAI API key from config or environment
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}
