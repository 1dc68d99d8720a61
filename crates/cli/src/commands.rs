use clap::{Args, Subcommand};
use engine_config::settings::import::DEFAULT_CSV_FILE;
use engine_core::controller::DEFAULT_TABLE;
use model::pagination::page::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Load a SIREN stock CSV file into the store
    Import(ImportArgs),

    /// Create the target table when it does not exist
    InitSchema,

    /// Check that the configured database answers
    TestConn,

    /// Look up legal units
    Entreprise {
        #[command(subcommand)]
        command: EntrepriseCommand,
    },

    /// Per-activity statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(long, default_value = DEFAULT_CSV_FILE, help = "CSV file to load")]
    pub csv_file: PathBuf,

    #[arg(long, default_value_t = 1000, help = "Records per INSERT statement")]
    pub batch_size: usize,

    #[arg(long, help = "Empty the target table before loading")]
    pub truncate: bool,

    #[arg(long, default_value = DEFAULT_TABLE, help = "Target table")]
    pub table: String,

    #[arg(
        long,
        default_value_t = 1,
        help = "Runs attempted in total when the store fails transiently"
    )]
    pub max_attempts: usize,

    #[arg(long, help = "Upper bound in seconds for a single batch insert")]
    pub batch_timeout_secs: Option<u64>,

    #[arg(long, default_value = ",", help = "Field delimiter (single character or \\t)")]
    pub delimiter: String,

    #[arg(
        long,
        help = "If specified, writes the JSON run report to this file instead of stdout"
    )]
    pub report: Option<PathBuf>,
}

#[derive(Args, Clone, Copy)]
pub struct PageArgs {
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u64,

    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u64,
}

#[derive(Subcommand)]
pub enum EntrepriseCommand {
    /// One legal unit by its 9-digit SIREN
    Siren { siren: String },

    /// Legal units sharing a main activity code
    Activite {
        code: String,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Legal units whose name contains a term
    Search {
        #[arg(long)]
        nom: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
pub enum StatsCommand {
    /// Number of legal units per activity code
    Count {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Count for a single activity code
    Filter { code: String },

    /// Most represented activity codes
    Top {
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },

    /// Least represented activity codes
    Bottom {
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
}
