use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Inspect and soft-delete record collections",
    long_about = "Reads record collections from a SQLite store, applying administrative or public visibility rules."
)]
pub struct Cli {
    #[arg(
        long,
        env = "COLLECTIONS_DB",
        default_value = "collections.sqlite3",
        value_name = "PATH",
        help = "SQLite database file; created and migrated when missing"
    )]
    pub db: String,

    #[arg(
        long,
        env = "COLLECTIONS_LOG_LEVEL",
        value_name = "LEVEL",
        help = "Log level (trace|debug|info|warn|error); defaults by build mode"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        env = "COLLECTIONS_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; logging is off when unset"
    )]
    pub log_dir: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Serve reads as a public front-end request (hides hidden and out-of-window rows)"
    )]
    pub public: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "List every visible collection")]
    List,
    #[command(about = "Show one collection by id")]
    Show {
        #[arg(value_name = "ID")]
        id: i64,
    },
    #[command(about = "List collections grouping rows of one table")]
    ByTable {
        #[arg(value_name = "TABLE")]
        table: String,
    },
    #[command(about = "List collections of one type, optionally narrowed to a table")]
    ByType {
        #[arg(value_name = "TYPE")]
        type_tag: String,
        #[arg(long, value_name = "TABLE")]
        table: Option<String>,
    },
    #[command(about = "Soft-delete one collection by id")]
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
}
