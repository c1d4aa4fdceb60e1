use crate::server;
use civic_permits::error::AppError;
use civic_permits::workflows::mapping::geometry::format_area;
use civic_permits::workflows::mapping::measure_features;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Civic Permits",
    about = "Run the civic permits records API or measure zone boundaries offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the area of every polygon in a GeoJSON FeatureCollection
    Measure(MeasureArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load sample zoning, housing, occupancy and map records on startup
    #[arg(long)]
    pub(crate) seed: bool,
}

#[derive(Args, Debug)]
pub(crate) struct MeasureArgs {
    /// Path to a GeoJSON FeatureCollection with Polygon or MultiPolygon features
    #[arg(long)]
    pub(crate) geojson: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Measure(args) => run_measure(args),
    }
}

fn run_measure(args: MeasureArgs) -> Result<(), AppError> {
    let file = File::open(&args.geojson)?;
    let measured = measure_features(BufReader::new(file))?;

    if measured.is_empty() {
        println!("No polygon features found in {}", args.geojson.display());
        return Ok(());
    }

    println!("{:<40} {:>18} {:>14}", "Feature", "Area (sq m)", "Area");
    let mut total = 0.0;
    for feature in &measured {
        total += feature.area_sqm;
        println!(
            "{:<40} {:>18.2} {:>14}",
            feature.name,
            feature.area_sqm,
            format_area(feature.area_sqm)
        );
    }
    println!(
        "{:<40} {:>18.2} {:>14}",
        format!("Total ({} features)", measured.len()),
        total,
        format_area(total)
    );

    Ok(())
}
