use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod http_api;
mod paths;
mod server_security;
mod ui;

use commands::{delete, list, meta, search, upload, AppContext};

pub(crate) const METADATA_ENV: &str = "MEME_METADATA";
pub(crate) const IMAGES_DIR_ENV: &str = "MEME_IMAGES_DIR";

#[derive(Parser)]
#[command(name = "meme")]
#[command(about = "Meme management CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Local metadata file
    #[arg(
        long,
        global = true,
        env = METADATA_ENV,
        default_value = "meme/static/meme_metadata.json"
    )]
    metadata: PathBuf,

    /// Directory holding the pending/ and uploaded/ image folders
    #[arg(long, global = true, env = IMAGES_DIR_ENV, default_value = "_images")]
    images_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List all memes in the cloud
    List(list::ListArgs),

    /// Search memes in the cloud by keyword
    Search(search::SearchArgs),

    /// Manage tags and metadata for memes
    Meta(meta::MetaArgs),

    /// Delete images from the cloud
    Delete(delete::DeleteArgs),

    /// Upload images to the cloud
    Upload(upload::UploadArgs),

    /// Serve the meme API over HTTP
    ServeHttp(http_api::ServeArgs),
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper are noisy at debug
    if !cli.verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<()> {
    // Before parsing so `.env` values feed the clap env fallbacks
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli);
    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("Ignoring unreadable .env: {err}"),
    }

    let ctx = AppContext::new(cli.metadata, cli.images_dir);
    match cli.command {
        Commands::List(args) => list::run(args, &ctx).await,
        Commands::Search(args) => search::run(args, &ctx).await,
        Commands::Meta(args) => meta::run(args, &ctx).await,
        Commands::Delete(args) => delete::run(args, &ctx).await,
        Commands::Upload(args) => upload::run(args, &ctx).await,
        Commands::ServeHttp(args) => http_api::serve(args, &ctx).await,
    }
}
