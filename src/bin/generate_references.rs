/// Binary to generate reference outputs for gapfill_delta testing
/// This is used by Python and WASM tests to verify their outputs match Rust
use log::{info, warn};
use serde_json::json;
use std::env;
use vector_delta::indicators::gapfill_delta::{gapfill_delta, GapfillDeltaInput, GapfillDeltaParams};
use vector_delta::utilities::data_loader::read_samples_from_csv;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 6 {
        eprintln!("Usage: {} <csv> <start> <end> <step> <range>", args[0]);
        eprintln!("All bounds and durations are in timestamp ticks (microseconds for the bundled fixtures)");
        std::process::exit(1);
    }

    let path = &args[1];
    let start: i64 = args[2].parse()?;
    let end: i64 = args[3].parse()?;
    let step: i64 = args[4].parse()?;
    let range: i64 = args[5].parse()?;

    let samples = read_samples_from_csv(path)?;
    info!("loaded {} samples from {}", samples.len(), path);
    if samples.is_empty() {
        warn!("{} holds no samples; every bucket will be absent", path);
    }

    let params = GapfillDeltaParams {
        step: Some(step),
        range: Some(range),
    };
    let input = GapfillDeltaInput::from_samples(&samples, start, end, params);
    let result = gapfill_delta(&input)?;

    let output = json!({
        "indicator": "gapfill_delta",
        "params": {
            "start": start,
            "end": end,
            "step": step,
            "range": range
        },
        "values": result.values,
        "present": result.present_count(),
        "length": result.values.len()
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
