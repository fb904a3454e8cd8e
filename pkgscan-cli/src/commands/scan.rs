//! `pkgscan scan` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use pkgscan_sca_client::manifest::collect_manifest_files;
use pkgscan_sca_client::{
    ExecutionMode, ManifestDetector, ScaClientConfig, ScaScannerBuilder, ScanResult,
};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;

    let mut client_config = ScaClientConfig::from_core(&config.sca);
    apply_scan_args(&mut client_config, &args);
    client_config.execution_mode = ExecutionMode::resolve(client_config.execution_mode);

    let inputs = args.paths.clone();
    let files = tokio::task::spawn_blocking(move || {
        collect_manifest_files(&inputs, &ManifestDetector::new())
    })
    .await
    .map_err(|e| CliError::Command(format!("manifest discovery failed: {e}")))??;

    if files.is_empty() {
        return Err(CliError::Command(
            "no package manifests found in the given paths".to_owned(),
        ));
    }

    let scanner = ScaScannerBuilder::new().config(client_config).build()?;

    info!(files = files.len(), mode = scanner.mode().as_str(), "scanning package manifests");
    let results = scanner.scan(&files).await;

    let report = ScanReport::new(scanner.mode(), files, results);
    writer.render(&report)?;

    Ok(())
}

/// Apply command-line overrides on top of the configured scanner settings.
fn apply_scan_args(config: &mut ScaClientConfig, args: &ScanArgs) {
    if args.sequential {
        config.execution_mode = ExecutionMode::Sequential;
    }
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
}

/// Scan report: one entry per scanned file, in input order.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub mode: ExecutionMode,
    pub total: usize,
    pub with_results: usize,
    pub entries: Vec<ScanEntry>,
}

/// Result of scanning a single manifest.
#[derive(Debug, Serialize)]
pub struct ScanEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    /// Raw result document; empty when the scan produced no usable result.
    pub result: ScanResult,
}

impl ScanReport {
    pub fn new(mode: ExecutionMode, files: Vec<PathBuf>, results: Vec<ScanResult>) -> Self {
        let detector = ManifestDetector::new();
        let entries: Vec<ScanEntry> = files
            .into_iter()
            .zip(results)
            .map(|(path, result)| ScanEntry {
                ecosystem: detector.detect_ecosystem(&path).map(|e| e.to_string()),
                path: path.display().to_string(),
                result,
            })
            .collect();

        let with_results = entries.iter().filter(|e| !e.result.is_empty()).count();
        Self {
            mode,
            total: entries.len(),
            with_results,
            entries,
        }
    }
}

impl ScanEntry {
    /// Number of entries under `vulnerabilities`, when the document has that list.
    fn vulnerability_count(&self) -> Option<usize> {
        self.result
            .get("vulnerabilities")
            .and_then(|v| v.as_array())
            .map(Vec::len)
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Package Scan ({} mode): {} file(s), {} with results",
            self.mode.as_str(),
            self.total,
            self.with_results
        )?;
        writeln!(w)?;

        for entry in &self.entries {
            let ecosystem = entry.ecosystem.as_deref().unwrap_or("-");
            if entry.result.is_empty() {
                writeln!(
                    w,
                    "  {} {} [{}]",
                    "NO RESULT".yellow().bold(),
                    entry.path,
                    ecosystem
                )?;
                continue;
            }

            let detail = match entry.vulnerability_count() {
                Some(0) => "no vulnerabilities".green().to_string(),
                Some(n) => format!("{n} vulnerabilities").red().bold().to_string(),
                None => format!("{} field(s)", entry.result.as_map().len()),
            };
            writeln!(
                w,
                "  {} {} [{}] {}",
                "OK".green().bold(),
                entry.path,
                ecosystem,
                detail
            )?;
        }

        Ok(())
    }
}
