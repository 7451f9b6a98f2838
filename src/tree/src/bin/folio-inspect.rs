//! Folio tree inspector
//!
//! Reads a JSON snapshot of a container tree and reports on it:
//! - integrity and acyclicity
//! - breadcrumbs between items
//! - the ACL of an item

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use folio_tree::{BreadcrumbResolver, InMemoryTreeStore, ItemId, SharedTree, Tree, TreeConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Folio tree inspector CLI
#[derive(Parser)]
#[command(name = "folio-inspect")]
#[command(about = "Inspect container tree snapshots")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check integrity and acyclicity
    Check {
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Print the breadcrumb from a root down to an item
    Path {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        item: ItemId,

        #[arg(long)]
        root: ItemId,

        /// Route the path through this container
        #[arg(long)]
        via: Option<ItemId>,
    },

    /// List the ACL entries of an item
    Acl {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        item: ItemId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => {
            let config = TreeConfig::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => TreeConfig::default(),
    };

    match cli.command {
        Command::Check { snapshot } => check(&snapshot, config),
        Command::Path {
            snapshot,
            item,
            root,
            via,
        } => {
            let tree = load(&snapshot, config.clone()).await?;
            let resolver = BreadcrumbResolver::from_config(&config);

            let path = tree.read(|tree| match via {
                Some(via) => resolver.breadcrumb_via(tree, item, via, root),
                None => resolver.breadcrumb(tree, item, root),
            })?;

            if path.is_empty() {
                println!("no path from {} to {}", root, item);
            } else {
                println!("{}", tree.read(|tree| path.names(tree)).join(" > "));
            }
            Ok(())
        }
        Command::Acl { snapshot, item } => {
            let tree = load(&snapshot, config).await?;
            let entries = tree.read(|tree| -> folio_tree::Result<Vec<String>> {
                Ok(tree.item(item)?.acl().iter().map(ToString::to_string).collect())
            })?;

            if entries.is_empty() {
                println!("(no entries)");
            }
            for entry in entries {
                println!("{}", entry);
            }
            Ok(())
        }
    }
}

fn read_snapshot(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read snapshot {:?}", path))
}

async fn load(path: &Path, config: TreeConfig) -> Result<SharedTree> {
    let store = InMemoryTreeStore::with_config(config);
    store.import_json(read_snapshot(path)?).await?;

    SharedTree::load(&store)
        .await
        .context("Failed to load snapshot")?
        .context("Snapshot is empty")
}

fn check(path: &Path, config: TreeConfig) -> Result<()> {
    let lenient = TreeConfig {
        verify_on_load: false,
        ..config
    };
    let tree = Tree::from_json(&read_snapshot(path)?, lenient).context("Failed to parse snapshot")?;

    println!("items:    {}", tree.len());
    println!("edges:    {}", tree.edge_count());
    println!("deferred: {}", tree.deferred_count());

    match tree.verify_acyclic() {
        Ok(()) => {
            println!("status:   ok");
            Ok(())
        }
        Err(e) => bail!("snapshot is inconsistent: {}", e),
    }
}
