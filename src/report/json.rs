//! JSON report export

use crate::error::Result;
use crate::report::ParameterReport;
use std::path::Path;
use tracing::info;

/// Exports a parameter report as a JSON file
pub fn export(report: &ParameterReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(output_path, json)?;
    info!("JSON report saved to {}", output_path.display());
    Ok(())
}

/// Loads a ParameterReport from a JSON file
pub fn load(input_path: &Path) -> Result<ParameterReport> {
    let content = std::fs::read_to_string(input_path)?;
    let report: ParameterReport = serde_json::from_str(&content)?;
    Ok(report)
}
