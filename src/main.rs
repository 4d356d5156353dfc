use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tree_carbon::{api, config::AppConfig, estimator, report, table::Table};

#[derive(Parser)]
#[command(name = "tree-carbon")]
#[command(about = "Estimate carbon storage of trees from circumference and height")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Directory for uploads, reports and charts
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
    /// Estimate a single tree
    Estimate {
        /// Trunk circumference in centimeters
        #[arg(short, long, allow_negative_numbers = true)]
        circumference: f64,

        /// Tree height in meters
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process a spreadsheet (xls, xlsx or csv) with Circumference and Height columns
    Batch {
        input: PathBuf,

        /// Write the CSV report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG chart of carbon storage per tree
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

/// Initialize tracing on stderr so command output on stdout stays clean
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tree_carbon=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(port: u16, upload_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(dir) = upload_dir {
        config.upload_dir = dir;
    }
    std::fs::create_dir_all(&config.upload_dir)?;
    tracing::info!("Storing uploads in {}", config.upload_dir.display());

    let app = api::create_router(config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("tree-carbon server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn estimate(circumference: f64, height: f64, json: bool) -> anyhow::Result<()> {
    let b = estimator::estimate(circumference, height)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&b)?);
        return Ok(());
    }

    println!("Circumference:             {} cm", circumference);
    println!("Height:                    {} m", height);
    println!("Diameter:                  {:.4} cm", b.diameter);
    println!("Stem biomass (WS):         {:.4} kg", b.above_ground_stem_biomass);
    println!("Branch biomass (WB):       {:.4} kg", b.above_ground_branch_biomass);
    println!("Leaf biomass (WL):         {:.4} kg", b.above_ground_leaf_biomass);
    println!("Above-ground biomass (WT): {:.4} kg", b.above_ground_total_biomass);
    println!("Below-ground biomass:      {:.4} kg", b.below_ground_biomass);
    println!("Total biomass:             {:.4} kg", b.total_biomass);
    println!("Carbon storage:            {:.4} kgCO2", b.carbon_storage);
    Ok(())
}

fn batch(input: PathBuf, output: Option<PathBuf>, chart_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let table = Table::read_path(&input)?;
    let (result, csv, svg) = report::render(&table, &config.chart)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => std::io::stdout().lock().write_all(&csv)?,
    }

    if let Some(path) = chart_path {
        std::fs::write(&path, svg)?;
        tracing::info!("Chart written to {}", path.display());
    }

    for row in &result.table.rows {
        eprintln!("{}: {:.4} kgCO2", row.label(), row.breakdown.carbon_storage);
    }
    eprintln!(
        "Total carbon storage of {} trees: {:.4} kgCO2",
        result.summary.tree_count, result.summary.total_carbon
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, upload_dir }) => serve(port, upload_dir).await?,
        Some(Commands::Estimate {
            circumference,
            height,
            json,
        }) => estimate(circumference, height, json)?,
        Some(Commands::Batch {
            input,
            output,
            chart,
        }) => batch(input, output, chart)?,
        None => serve(5000, None).await?,
    }

    Ok(())
}
