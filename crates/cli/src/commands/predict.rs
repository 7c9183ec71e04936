//! Sales prediction command

use anyhow::Result;
use predictor_lib::predictor::{
    format_currency, format_prediction, GatewayConfig, PredictorGateway,
};
use predictor_lib::{PredictionOutcome, PredictionRequest};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_record, print_success, OutputFormat};

/// Row for the prediction table
#[derive(Tabled, Serialize)]
struct PredictionRow {
    #[tabled(rename = "Quantity")]
    quantity: u64,
    #[tabled(rename = "Price Each")]
    price: String,
    #[tabled(rename = "Predicted Sales")]
    predicted_sales: String,
}

/// Load the model and predict sales for one quantity/price pair
pub fn run_prediction(
    config: GatewayConfig,
    quantity: u64,
    price: f64,
    format: OutputFormat,
) -> Result<()> {
    let gateway = PredictorGateway::new(config);
    gateway.load()?;

    let request = PredictionRequest::new(quantity as f64, price);
    let outcome = gateway.predict_request(&request)?;

    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Table => {
            let row = PredictionRow {
                quantity,
                price: format_currency(price),
                predicted_sales: outcome.formatted.clone(),
            };
            print_record(row, format)?;
            print_success(&format_prediction(outcome.predicted_sales));
            Ok(())
        }
    }
}

fn print_json(outcome: &PredictionOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
