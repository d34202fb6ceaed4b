use log::{debug, info};
use std::env;
use std::path::PathBuf;

use crate::models::PmEncoding;
use crate::utils::parse_firmware_version;

const DEFAULT_EXPORT_DIR: &str = "export";
const DEFAULT_DEVICE_MAC: &str = "unknown_mac";

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub history_files: Vec<PathBuf>,
    pub export_dir: PathBuf,
    pub pm_encoding: PmEncoding,
    pub device_mac: String,
    pub database_url: Option<String>,
}

impl EtlConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let history_files: Vec<PathBuf> = var("HISTORY_FILES")
            .ok_or("HISTORY_FILES environment variable not set")?
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .collect();

        if history_files.is_empty() {
            return Err("No history files configured. Please set HISTORY_FILES to a comma-separated list of paths".into());
        }

        let pm_encoding = match (var("DEVICE_FIRMWARE"), var("PM_FLAGGED_SINCE")) {
            (Some(firmware), Some(since)) => {
                let since = parse_firmware_version(since.trim());
                debug!(
                    "Selecting PM encoding from firmware {} (flagged since {:?})",
                    firmware, since
                );
                PmEncoding::for_firmware(Some(&firmware), since)
            }
            _ => match var("PM_ENCODING") {
                Some(name) => name.parse::<PmEncoding>()?,
                None => PmEncoding::default(),
            },
        };

        let config = EtlConfig {
            history_files,
            export_dir: PathBuf::from(var("EXPORT_DIR").unwrap_or_else(|| DEFAULT_EXPORT_DIR.to_string())),
            pm_encoding,
            device_mac: var("DEVICE_MAC")
                .map(|mac| mac.trim().to_uppercase())
                .unwrap_or_else(|| DEFAULT_DEVICE_MAC.to_string()),
            database_url: var("DATABASE_URL"),
        };

        info!("Total history files configured: {}", config.history_files.len());
        for path in &config.history_files {
            debug!("History file: {}", path.display());
        }
        info!(
            "PM encoding: {:?}, export dir: {}, database: {}",
            config.pm_encoding,
            config.export_dir.display(),
            if config.database_url.is_some() { "enabled" } else { "disabled" }
        );

        Ok(config)
    }
}
