//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version = "0.1.0")]
#[command(about = "A server-rendered blog front-end for Prismic repositories", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to _config.yml in the base directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read posts from a JSON fixtures file instead of the content repository
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List posts
    List {
        /// Follow "load more" until every post is listed
        #[arg(short, long)]
        all: bool,
    },

    /// Show a single post
    Show {
        /// Post identifier
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,tower_http=debug,info"
    } else {
        "spacetraveling=info"
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

    if let Commands::Version = cli.command {
        println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let blog = spacetraveling::Blog::new(&base_dir, cli.config.as_deref())?;
    let client = Arc::new(blog.client(cli.fixtures.as_deref())?);

    match cli.command {
        Commands::Server { port, ip, open } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, client, &ip, port, open).await?;
        }

        Commands::List { all } => {
            spacetraveling::commands::list::run(&blog, client, all, &mut std::io::stdout())
                .await?;
        }

        Commands::Show { slug } => {
            spacetraveling::commands::show::run(&blog, client, &slug, &mut std::io::stdout())
                .await?;
        }

        Commands::Version => {}
    }

    Ok(())
}
