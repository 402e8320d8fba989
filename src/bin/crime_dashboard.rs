//! Command-line front end for the crime dashboard
//!
//! Loads the crime table and boundary data once, then prints the trend,
//! the next-month prediction and both maps for the requested selection.

use area_atlas::BoundaryCache;
use clap::Parser;
use crime_dashboard::{logging, Dashboard, DashboardConfig, ReportRequest, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Chicago community-area crime trends, forecasts and maps
#[derive(Parser, Debug)]
#[command(name = "crime_dashboard", version)]
#[command(about = "Monthly crime trends, next-month forecasts and choropleth maps")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Crime table (CSV or Parquet), overrides [data].path
    #[arg(long)]
    data: Option<PathBuf>,

    /// Boundary GeoJSON file or URL, overrides [boundaries].source
    #[arg(long)]
    boundaries: Option<String>,

    /// Area for the trend and prediction (defaults to the first area)
    #[arg(long)]
    area: Option<String>,

    /// Category for the trend and prediction (defaults to the first category)
    #[arg(long)]
    category: Option<String>,

    /// Column to show on the observed map
    #[arg(long)]
    map_category: Option<String>,

    /// Category to show on the predicted map
    #[arg(long)]
    predict_map_category: Option<String>,

    /// Directory to write map GeoJSON and CSV files to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the available areas and categories and exit
    #[arg(long)]
    list: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(&cli.log_level) {
        eprintln!("{err}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data.path = Some(data);
    }
    if let Some(boundaries) = cli.boundaries {
        config.boundaries.source = Some(boundaries);
    }

    let mut cache = BoundaryCache::new();
    let dashboard = Dashboard::open(&config, &mut cache)?;

    if cli.list {
        println!("Areas:");
        for area in dashboard.area_choices() {
            println!("  {area}");
        }
        println!("Categories:");
        for category in dashboard.category_choices() {
            println!("  {category}");
        }
        println!("Map columns:");
        for column in dashboard.map_category_choices() {
            println!("  {column}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let request = ReportRequest {
        area: cli
            .area
            .or_else(|| dashboard.area_choices().into_iter().next()),
        category: cli
            .category
            .or_else(|| dashboard.category_choices().into_iter().next()),
        map_category: cli.map_category,
        predict_map_category: cli.predict_map_category,
    };

    let report = dashboard.report(&request);
    print!("{report}");

    if let Some(dir) = cli.export_dir {
        for path in report.export(&dir)? {
            println!("wrote {}", path.display());
        }
    }

    Ok(if report.has_failures() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}
