#![forbid(unsafe_code)]

//! Thin demo CLI exercising the library end to end. Not a product surface:
//! no query language, no network protocol.

use clap::{Parser, Subcommand};
use sirix_core::config::{DatabaseType, HashType};
use sirix_core::database::Databases;
use sirix_core::io::pipeline::PipelineComponent;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sirix-core", version, about = "Tree-versioning storage engine demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new database directory.
    CreateDatabase {
        #[arg(long, help = "Database directory path")]
        path: PathBuf,
        #[arg(long, help = "Database name")]
        name: String,
        #[arg(long, value_enum, default_value = "json")]
        database_type: CliDatabaseType,
    },
    /// Create a resource within an existing database.
    CreateResource {
        #[arg(long, help = "Database directory path")]
        path: PathBuf,
        #[arg(long, help = "Resource name")]
        name: String,
        #[arg(long, help = "Enable AES-256-GCM encryption for this resource")]
        encrypt: bool,
    },
    /// Open a resource and commit an empty revision (exercises the commit protocol).
    CommitEmpty {
        #[arg(long, help = "Database directory path")]
        path: PathBuf,
        #[arg(long, help = "Resource name")]
        name: String,
        #[arg(long, help = "Commit message")]
        message: Option<String>,
    },
    /// List resources registered in a database.
    ListResources {
        #[arg(long, help = "Database directory path")]
        path: PathBuf,
    },
    /// Print process-wide buffer manager cache statistics.
    CacheStats,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum CliDatabaseType {
    Xml,
    Json,
}

impl From<CliDatabaseType> for DatabaseType {
    fn from(value: CliDatabaseType) -> Self {
        match value {
            CliDatabaseType::Xml => Self::Xml,
            CliDatabaseType::Json => Self::Json,
        }
    }
}

fn run() -> sirix_core::EngineResult<()> {
    let cli = Cli::parse();
    let facade = Databases::global();

    match cli.command {
        Commands::CreateDatabase { path, name, database_type } => {
            facade.create_database(&path, name, database_type.into())?;
            println!("created database at {}", path.display());
        }
        Commands::CreateResource { path, name, encrypt } => {
            let db = facade.open_database(&path)?;
            let pipeline = if encrypt {
                vec![PipelineComponent::Compression, PipelineComponent::Encryption]
            } else {
                vec![PipelineComponent::Compression]
            };
            db.create_resource(&name, HashType::Rolled, pipeline)?;
            println!("created resource {name}");
        }
        Commands::CommitEmpty { path, name, message } => {
            let db = facade.open_database(&path)?;
            let session = db.open_resource(&name)?;
            let txn = session.begin_write()?;
            let revision = txn.commit(None, message)?;
            println!("committed revision {revision}");
        }
        Commands::ListResources { path } => {
            let db = facade.open_database(&path)?;
            for resource in db.list_resources() {
                println!("{resource}");
            }
        }
        Commands::CacheStats => {
            let bm = sirix_core::buffer_manager::global();
            println!("record_pages: {:?}", bm.record_pages.stats());
            println!("record_fragments: {:?}", bm.record_fragments.stats());
            println!("generic_pages: {:?}", bm.generic_pages.stats());
            println!("revision_roots: {:?}", bm.revision_roots.stats());
            println!("index_nodes: {:?}", bm.index_nodes.stats());
            println!("name_tables: {:?}", bm.name_tables.stats());
            println!("path_summaries: {:?}", bm.path_summaries.stats());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let _ = sirix_core::logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
