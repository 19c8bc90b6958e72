use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use snapshot_phash::configuration::config::Config;
use snapshot_phash::external::ExternalLocation;
use snapshot_phash::registry::{register_phash_storage, StorageRegistry};
use snapshot_phash::storage::phash_storage::PROTOCOL_NAME;
use snapshot_phash::storage::{PerceptualHashStorage, StorageProtocol};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phash")]
#[command(version)]
#[command(about = "Inspect and manage perceptual-hash snapshot storage")]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true, env = "PHASH_CONFIG")]
    config: Option<PathBuf>,

    /// Storage root, overriding the configuration
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the reference an image would be stored under
    Hash { file: PathBuf },
    /// Store an image and print its reference
    Store { file: PathBuf },
    /// Print the stored path for a reference such as `phash:<stem>.png`
    Path { reference: String },
    /// Delete the artifact behind a reference
    Delete { reference: String },
    /// List stored artifacts
    List {
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Unable to load configuration: {}", e);
        std::process::exit(2);
    });

    // RUST_LOG still wins over the configured level
    env_logger::Builder::new()
        .filter_level(config.level_filter().unwrap_or(log::LevelFilter::Info))
        .parse_env(Env::default())
        .format_target(false)
        .init();

    let storage_dir = args.storage_dir.unwrap_or(config.storage_dir);
    info!("Using phash storage at {}", storage_dir.display());

    let mut registry = StorageRegistry::new();
    let storage = register_phash_storage(&mut registry, Some(storage_dir.as_path())).unwrap_or_else(|e| {
        error!("Unable to create phash storage: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = run(args.command, &registry, &storage) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(
    command: Command,
    registry: &StorageRegistry,
    storage: &PerceptualHashStorage,
) -> Result<(), Box<dyn Error>> {
    let empty = ExternalLocation::parse(&format!("{}:", PROTOCOL_NAME))?;
    match command {
        Command::Hash { file } => {
            let location = storage.new_location(&empty, &file)?;
            println!("{}", location);
        }
        Command::Store { file } => {
            let location = storage.new_location(&empty, &file)?;
            storage.store(&location, &file)?;
            println!("{}", location);
        }
        Command::Path { reference } => {
            let location = ExternalLocation::parse(&reference)?;
            let backend = registry.resolve(&location)?;
            let loaded = backend.load(&location)?;
            println!("{}", loaded.display());
        }
        Command::Delete { reference } => {
            let location = ExternalLocation::parse(&reference)?;
            registry.resolve(&location)?.delete(&location)?;
        }
        Command::List { json } => {
            let artifacts = storage.list_artifacts()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&artifacts)?);
            } else {
                for artifact in &artifacts {
                    println!("{}\t{}", artifact.location, artifact.size_bytes);
                }
            }
        }
    }
    Ok(())
}
