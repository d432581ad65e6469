use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolrec_api::RestApi;
use toolrec_core::{AttributeFilter, BuildConfig, RecommenderService};
use toolrec_storage::{ModelManager, ModelOrigin};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Content-based recommendations for a catalog of AI tools
#[derive(Parser, Debug)]
#[command(name = "toolrec")]
#[command(about = "Recommend similar AI tools", long_about = None)]
struct Args {
    /// Directory holding the model artifact
    #[arg(
        short,
        long,
        env = "TOOLREC_DATA_DIR",
        default_value = "./models",
        global = true
    )]
    data_dir: PathBuf,

    /// Catalog CSV used when the model has to be built
    #[arg(
        short,
        long,
        env = "TOOLREC_CATALOG",
        default_value = "./data/ai_tools.csv",
        global = true
    )]
    catalog: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Serve options used when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load (or build) the model and serve the REST API
    Serve(ServeArgs),
    /// Rebuild the model from the catalog and persist it
    Build {
        /// Tool used for the sample recommendation printed after the build
        #[arg(long, default_value = "ChatGPT")]
        sample: String,
    },
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "PORT", default_value_t = 5000)]
    http_port: u16,

    /// Number of HTTP workers (defaults to the number of cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Ignore any existing artifact and rebuild from the catalog
    #[arg(long)]
    rebuild: bool,
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting toolrec v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("Catalog: {:?}", args.catalog);

    let manager = ModelManager::new(&args.data_dir, BuildConfig::default())
        .with_context(|| format!("cannot use data directory {:?}", args.data_dir))?;

    match args.command {
        Some(Command::Build { sample }) => build(&manager, &args.catalog, &sample),
        Some(Command::Serve(serve_args)) => serve(&manager, &args.catalog, serve_args).await,
        None => serve(&manager, &args.catalog, args.serve).await,
    }
}

fn build(manager: &ModelManager, catalog: &Path, sample: &str) -> anyhow::Result<()> {
    let model = manager
        .build(catalog)
        .with_context(|| format!("failed to build model from {:?}", catalog))?;
    let service = RecommenderService::new(model);
    info!("Model persisted to {:?}", manager.store().model_path());

    match service.similar_to_item(sample, 5, &AttributeFilter::new()) {
        Ok(recommendations) => {
            println!("Tools similar to {}:", sample);
            for tool in recommendations {
                println!(
                    "  {:<30} {:<25} {:.3}",
                    tool.name,
                    tool.category,
                    tool.similarity_score.unwrap_or_default()
                );
            }
        }
        Err(e) => println!("No sample recommendation for {}: {}", sample, e),
    }
    Ok(())
}

async fn serve(manager: &ModelManager, catalog: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let (model, origin) = manager
        .load_or_build(catalog, args.rebuild)
        .context("failed to initialize the recommendation model")?;
    match origin {
        ModelOrigin::Loaded => info!("Model loaded from {:?}", manager.store().model_path()),
        ModelOrigin::Built => info!("Model built from {:?}", catalog),
    }

    let service = Arc::new(RecommenderService::new(model));
    info!("{} tools ready", service.tool_count());

    let ServeArgs {
        host,
        http_port,
        workers,
        ..
    } = args;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        RestApi::run(service, &host, http_port, workers)
    });

    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
            joined
                .context("HTTP server task failed")?
                .map_err(|_| anyhow!("HTTP server thread panicked"))?
                .context("HTTP server failed")?;
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
