use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdastore")]
#[command(about = "Manage records stored on a peer drive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $PDASTORE_HOME, then the platform data dir)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bookmarks in both roots
    #[command(alias = "ls")]
    List,

    /// Show one bookmark
    Get {
        href: String,
    },

    /// Add (or overwrite) a bookmark
    #[command(alias = "a")]
    Add {
        href: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Store under the public root
        #[arg(long)]
        public: bool,
    },

    /// Update a bookmark; creates it if missing
    #[command(alias = "u")]
    #[command(group(ArgGroup::new("visibility").args(["public", "private"])))]
    Update {
        /// Current href of the bookmark
        old_href: String,

        /// New href
        #[arg(long)]
        href: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Move to the public root
        #[arg(long)]
        public: bool,

        /// Move to the private root
        #[arg(long)]
        private: bool,
    },

    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove {
        href: String,
    },

    /// Import bookmarks from the legacy SQLite database
    Migrate {
        /// Database path (defaults to the configured legacy_db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print the slug and storage paths for an href
    Slug {
        href: String,
    },

    /// Show the effective configuration, or get/set one key
    Config {
        /// drive_root or legacy_db
        key: Option<String>,

        /// New value; an empty string restores the default
        value: Option<String>,
    },
}
