use futures_util::stream::{self, StreamExt};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;

use atmotube_history::config::EtlConfig;
use atmotube_history::database::{store_history_records, RetryPolicy};
use atmotube_history::export::{spawn_csv_export, ExportOutcome};
use atmotube_history::history::read_history;
use atmotube_history::utils::format_timestamp;

const CONCURRENT_FILES: usize = 4;

#[derive(Debug)]
struct FileSummary {
    path: PathBuf,
    decoded: usize,
    valid: usize,
    stop_offset: usize,
    file_len: usize,
    exported: Option<PathBuf>,
    stored: u64,
}

fn csv_path(config: &EtlConfig, history_file: &Path) -> PathBuf {
    let stem = history_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    config
        .export_dir
        .join(format!("{}_{}.csv", config.device_mac.replace(':', ""), stem))
}

async fn process_file(
    config: &EtlConfig,
    path: PathBuf,
) -> Result<FileSummary, Box<dyn std::error::Error>> {
    let data = tokio::fs::read(&path).await?;
    info!("Read {} bytes from {}", data.len(), path.display());

    let scan = read_history(&data, config.pm_encoding);
    if !scan.is_complete(data.len()) {
        warn!(
            "Stopped parsing {} at offset {} of {} bytes",
            path.display(),
            scan.offset,
            data.len()
        );
    }

    let decoded = scan.records.len();
    let valid = scan.valid_records().count();
    let records = Arc::new(scan.records);

    let out_path = csv_path(config, &path);
    let exported = match spawn_csv_export(Arc::clone(&records), out_path.clone()).await? {
        ExportOutcome::Written { .. } => Some(out_path),
        ExportOutcome::NoValidRecords => None,
    };

    let stored = match &config.database_url {
        Some(database_url) => store_history_records(
            &config.device_mac,
            &records,
            database_url,
            RetryPolicy::default(),
        )
        .await
        .map_err(|e| format!("Failed to store records from {}: {}", path.display(), e))?,
        None => 0,
    };

    Ok(FileSummary {
        decoded,
        valid,
        stop_offset: scan.offset,
        file_len: data.len(),
        exported,
        stored,
        path,
    })
}

async fn run(config: EtlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = OffsetDateTime::now_utc();
    info!("Starting history export at: {}", format_timestamp(&start_time));

    tokio::fs::create_dir_all(&config.export_dir).await?;

    let results: Vec<_> = stream::iter(config.history_files.clone())
        .map(|path| {
            let config = &config;
            async move {
                let display = path.display().to_string();
                (display, process_file(config, path).await)
            }
        })
        .buffer_unordered(CONCURRENT_FILES)
        .collect()
        .await;

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(summary) => {
                info!("Summary for {}:", summary.path.display());
                info!("  Records decoded: {}", summary.decoded);
                info!("  Records with valid checksum: {}", summary.valid);
                info!(
                    "  Parsed {} of {} bytes",
                    summary.stop_offset, summary.file_len
                );
                match &summary.exported {
                    Some(csv) => info!("  Exported to {}", csv.display()),
                    None => warn!("  Nothing exported"),
                }
                if config.database_url.is_some() {
                    info!("  Stored {} rows", summary.stored);
                }
            }
            Err(e) => {
                failures += 1;
                error!("Failed to process {}: {}", path, e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} history file(s) failed", failures).into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match EtlConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Run the export or stop on Ctrl+C
    tokio::select! {
        result = run(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => {
                    error!("Fatal error: {}", e);
                    return Err(e);
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
