use boxnms::{BBox, NmsConfig, Strategy, Suppressor};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "boxnms CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    #[default]
    Auto,
    Greedy,
    Bitmask,
}

impl From<StrategyConfig> for Strategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::Auto => Strategy::Auto,
            StrategyConfig::Greedy => Strategy::Greedy,
            StrategyConfig::Bitmask => Strategy::Bitmask,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    threshold: f32,
    limit: Option<usize>,
    strategy: StrategyConfig,
    parallel: bool,
    num_threads: Option<usize>,
    validate_threshold: bool,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        let cfg = NmsConfig::default();
        Self {
            threshold: cfg.threshold,
            limit: cfg.limit,
            strategy: StrategyConfig::Auto,
            parallel: cfg.parallel,
            num_threads: cfg.num_threads,
            validate_threshold: cfg.validate_threshold,
        }
    }
}

impl From<NmsConfigJson> for NmsConfig {
    fn from(value: NmsConfigJson) -> Self {
        Self {
            threshold: value.threshold,
            limit: value.limit,
            strategy: value.strategy.into(),
            parallel: value.parallel,
            num_threads: value.num_threads,
            validate_threshold: value.validate_threshold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    nms: NmsConfigJson,
}

/// Detector output: one `[x_min, y_min, x_max, y_max]` per box.
#[derive(Debug, Deserialize)]
struct Detections {
    boxes: Vec<[f32; 4]>,
    #[serde(default)]
    scores: Option<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    keep: Vec<usize>,
    boxes: Vec<[f32; 4]>,
}

fn run(config: Config, detections: Detections) -> Result<Output, Box<dyn std::error::Error>> {
    let boxes: Vec<BBox> = detections.boxes.iter().copied().map(BBox::from).collect();
    tracing::info!(boxes = boxes.len(), scored = detections.scores.is_some(), "loaded detections");

    let suppressor = Suppressor::new().with_config(config.nms.into());
    let keep = suppressor.run(&boxes, detections.scores.as_deref())?;
    let kept_boxes = keep.iter().map(|&idx| detections.boxes[idx]).collect();
    Ok(Output {
        count: keep.len(),
        keep,
        boxes: kept_boxes,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("boxnms=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }

    let input_text = fs::read_to_string(&config.input_path)?;
    let detections: Detections = serde_json::from_str(&input_text)?;
    let output_path = config.output_path.clone();
    let output = run(config, detections)?;
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
