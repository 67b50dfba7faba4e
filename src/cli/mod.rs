pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use crm_archive::{CompositeId, DateBucket, EntityType};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "crm-archive")]
#[command(about = "Browse, restore and purge archived CRM records", version)]
pub struct Cli {
    /// CRM REST API base url (overrides ARCHIVE_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Bearer token for the CRM REST API (overrides ARCHIVE_BACKEND_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the archive HTTP API over the CRM backend
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Serve the archive HTTP API over seeded in-memory data
    Demo {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Print one merged archive page
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        entity_type: Option<EntityType>,
        /// today, 7d or 30d
        #[arg(long)]
        date: Option<DateBucket>,
    },
    /// Restore one record, e.g. `customer:64f1c2`
    Restore { id: CompositeId },
    /// Permanently delete one record
    Delete { id: CompositeId },
    /// Permanently delete every archived record of every type
    Purge {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}
