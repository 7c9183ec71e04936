//! Model artifact inspection command

use anyhow::{Context, Result};
use colored::Colorize;
use predictor_lib::predictor::{GatewayConfig, PredictorGateway};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{format_bytes, print_record, short_digest, OutputFormat};

/// Row for the artifact table
#[derive(Tabled, Serialize)]
struct ArtifactRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "SHA256")]
    sha256: String,
}

/// Load the model and describe it
pub fn show_info(config: GatewayConfig, format: OutputFormat) -> Result<()> {
    let gateway = PredictorGateway::new(config);
    gateway.load()?;

    let info = gateway
        .info()
        .context("Model loaded but no artifact details were recorded")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(info)?);
        }
        OutputFormat::Table => {
            println!("{}", "Model Artifact".bold());
            let row = ArtifactRow {
                path: info.path.display().to_string(),
                kind: info.kind.clone(),
                size: format_bytes(info.size_bytes),
                sha256: short_digest(&info.sha256),
            };
            print_record(row, format)?;
        }
    }

    Ok(())
}
