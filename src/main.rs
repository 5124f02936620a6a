/// Load the fighters, derive their groups, then filter, search or train on them
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use plotters::prelude::*;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod encode;
mod error;
mod io;
mod model;
mod preprocess;
mod query;

use config::{Cli, Command};
use encode::FEATURE_NAMES;
use error::QueryError;
use io::load_csv;
use model::train_model;
use preprocess::{enrich, EnrichedTable};
use query::{filter, render_table, search};

/// Draws a horizontal bar chart of feature importances and saves it as a PNG
/// input: feature names with their importances, output path
/// logic: split names from values; set up the bitmap backend; label Y ticks with feature names;
/// draw one bar per feature starting at zero
fn plot_importances(results: &[(String, f64)], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    let values: Vec<f64> = results.iter().map(|(_, v)| *v).collect();
    let count = results.len();

    // Importances are non-negative, so the axis starts at zero
    let max_x = values.iter().cloned().fold(0.0_f64, f64::max);
    let x_range = 0.0..(max_x * 1.1).max(0.01);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature Importances", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(240)
        .build_cartesian_2d(x_range, 0..count)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(count)
        .y_label_formatter(&|idx| names.get(*idx).map(|n| n.to_string()).unwrap_or_default())
        .x_desc("Mean impurity decrease")
        .y_desc("Feature")
        .draw()?;

    chart.draw_series(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Rectangle::new([(0.0, i), (v, i + 1)], BLUE.mix(0.5).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn load_table(path: &Path) -> Result<EnrichedTable> {
    info!("Loading data from {}...", path.display());
    let raw = load_csv(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let table = enrich(raw);
    info!("Enriched {} fighters", table.len());
    Ok(table)
}

/// parse the command line, set up logging, load the table once and run one action on it
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let table = load_table(&cli.data)?;

    match cli.command {
        Command::Filter(args) => {
            let result = filter(&table, &args.criteria());
            println!("{}", render_table(&result).trim_end());
        }
        Command::Search { query } => match search(&table, &query) {
            Ok(result) => println!("{}", render_table(&result).trim_end()),
            Err(QueryError::EmptyQuery) => {
                warn!("{}", QueryError::EmptyQuery);
            }
        },
        Command::Train(args) => {
            let config = args.training_config();
            let report = train_model(&table, &config).context("Training failed")?;
            println!("Training Complete");
            println!("Model Accuracy: {:.2}", report.accuracy);
            println!(
                "({} rows trained, {} held out)",
                report.train_rows, report.test_rows
            );

            let importances = report.named_importances(&FEATURE_NAMES);
            println!("\nFeature importances:");
            for (name, value) in &importances {
                println!("{:<30} {:>8.4}", name, value);
            }

            if let Some(path) = args.plot.as_deref() {
                plot_importances(&importances, path)
                    .map_err(|e| anyhow::anyhow!("Failed to draw {}: {}", path.display(), e))?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
