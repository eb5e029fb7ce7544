//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::reorder::Direction;

#[derive(Parser)]
#[command(name = "folio-rs")]
#[command(version)]
#[command(about = "Portfolio content engine with an ordered-list admin back office", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new portfolio site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// List categories, or the items of one category
    #[command(alias = "ls")]
    List {
        /// Category to list
        category: Option<String>,
    },

    /// Add an item to a category
    Add {
        /// Category to add to
        category: String,

        /// Title of the new item
        title: String,

        /// Extra fields as key=value
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Move an item one position up or down
    #[command(alias = "mv")]
    Move {
        /// Category of the item
        category: String,

        /// Current position of the item (0-based)
        index: usize,

        /// Direction to move (up, down)
        direction: Direction,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Category of the item
        category: String,

        /// Id of the item
        id: String,
    },

    /// Rewrite stored orders to 0..N-1
    Normalize {
        /// Category to normalize (defaults to all)
        category: Option<String>,
    },

    /// Build public/content.json
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Render the résumé
    Resume {
        /// Render HTML instead of Markdown
        #[arg(long)]
        html: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask the chat widget a question
    Chat {
        /// Message to send
        message: Vec<String>,
    },

    /// Start the admin and content server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing portfolio in {:?}", target_dir);
            folio_rs::commands::init::init_site(&target_dir)?;
            println!("Initialized portfolio in {:?}", target_dir);
        }

        Commands::List { category } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::list::run(&folio, category.as_deref()).await?;
        }

        Commands::Add {
            category,
            title,
            fields,
        } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let item = folio_rs::commands::add::run(&folio, &category, &title, &fields).await?;
            println!("Added {} to {}", item.id, category);
        }

        Commands::Move {
            category,
            index,
            direction,
        } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::reorder::run(&folio, &category, index, direction).await?;
        }

        Commands::Delete { category, id } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::delete::run(&folio, &category, &id).await?;
        }

        Commands::Normalize { category } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::normalize::run(&folio, category.as_deref()).await?;
        }

        Commands::Build { watch } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let path = folio_rs::commands::build::run(&folio).await?;
            println!("Built {:?}", path);

            if watch {
                folio_rs::commands::build::watch(&folio).await?;
            }
        }

        Commands::Resume { html, output } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::resume::run(&folio, html, output.as_deref()).await?;
        }

        Commands::Chat { message } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::chat::run(&folio, &message.join(" ")).await?;
        }

        Commands::Server { port, ip, open } => {
            let folio = folio_rs::Folio::new(&base_dir)?;

            // Keep content.json current for the static pages
            folio_rs::commands::build::run(&folio).await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio_rs::server::start(&folio, &ip, port, open).await?;
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
