use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::export::ExportSettings;
use crate::models::design::FontFamily;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL under which uploaded assets are publicly reachable.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Generation is unavailable without it; everything else still works.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the TrueType file of every design font.
    pub font_dir: PathBuf,
    pub asset_timeout_ms: u64,
    pub export_settle_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let font_dir = PathBuf::from(require_env("FONT_DIR")?);
        check_font_dir(&font_dir)?;
        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone()),
            s3_endpoint,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            font_dir,
            asset_timeout_ms: parse_env("ASSET_TIMEOUT_MS", 5000)?,
            export_settle_ms: parse_env("EXPORT_SETTLE_MS", 250)?,
        })
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            asset_timeout: Duration::from_millis(self.asset_timeout_ms),
            settle: Duration::from_millis(self.export_settle_ms),
            ..ExportSettings::default()
        }
    }
}

/// Every design font must be present; PDF text cannot be drawn without it.
pub fn check_font_dir(dir: &Path) -> Result<()> {
    let missing: Vec<&str> = FontFamily::ALL
        .iter()
        .map(|family| family.font_file())
        .filter(|file| !dir.join(file).is_file())
        .collect();
    if !missing.is_empty() {
        bail!("FONT_DIR '{}' is missing {}", dir.display(), missing.join(", "));
    }
    Ok(())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_dir_must_hold_every_family() {
        let dir = std::env::temp_dir().join(format!("vitae-fonts-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let err = check_font_dir(&dir).unwrap_err().to_string();
        assert!(err.contains("Inter-Regular.ttf"), "got {err}");

        for family in FontFamily::ALL {
            std::fs::write(dir.join(family.font_file()), b"ttf").unwrap();
        }
        assert!(check_font_dir(&dir).is_ok());

        std::fs::remove_file(dir.join(FontFamily::Lato.font_file())).unwrap();
        let err = check_font_dir(&dir).unwrap_err().to_string();
        assert!(err.contains("Lato-Regular.ttf") && !err.contains("Inter"), "got {err}");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_font_dir_is_reported() {
        assert!(check_font_dir(Path::new("/nonexistent/vitae/fonts")).is_err());
    }
}
