use crate::{
    commands::{Commands, EntrepriseCommand, ImportArgs, PageArgs, StatsCommand},
    conn::{ConnectionPinger, MySqlConnectionPinger},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator, until_cancelled},
};
use clap::Parser;
use connectors::{
    file::csv::{settings::CsvSettings, source::CsvSource},
    sql::mysql::adapter::MySqlAdapter,
};
use engine_config::{
    env::EnvManager,
    report::summary::TransferReport,
    settings::{
        api::ApiSettings,
        batch_size::BatchSize,
        database::DatabaseSettings,
        import::{ImportSettings, parse_delimiter},
    },
};
use engine_core::{
    connectors::destination::mysql::MySqlDestination,
    controller::{DEFAULT_TABLE, TransferController},
    mapper::RowMapper,
};
use model::pagination::page::PageRequest;
use query_service::{
    mysql::{MySqlActivityAnalytics, MySqlEntityStore},
    service::{EntrepriseService, StatsService},
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;
mod shutdown;

const CONFIG_KEYS: [&str; 7] = [
    "MYSQL_HOST",
    "MYSQL_PORT",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "MYSQL_DATABASE",
    "API_BASE_URL",
    "STATS_BASE_URL",
];

#[derive(Parser)]
#[command(
    name = "siren",
    version,
    about = "SIREN stock loader and linked-data queries"
)]
struct Cli {
    #[arg(long, global = true, help = "Load environment variables from this file")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli, shutdown.cancel_token()).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            error!(error = %e, "Command failed");
            if shutdown.is_shutdown_requested() {
                ExitCode::ShutdownRequested
            } else if e.is_usage_error() {
                ExitCode::UsageError
            } else {
                ExitCode::GeneralError
            }
        }
    };
    code.into()
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    for key in CONFIG_KEYS {
        if let Some(value) = env.display_value(key) {
            debug!(key, value = %value, "Configuration");
        }
    }

    // Only `import` holds a transaction and watches the token itself; the
    // read commands are dropped when a signal arrives.
    match cli.command {
        Commands::Import(args) => import(args, &env, cancel).await,
        Commands::InitSchema => until_cancelled(&cancel, init_schema(&env)).await,
        Commands::TestConn => {
            let db = DatabaseSettings::from_env(&env)?;
            let pinger = MySqlConnectionPinger { settings: &db };
            until_cancelled(&cancel, pinger.ping()).await
        }
        Commands::Entreprise { command } => {
            until_cancelled(&cancel, entreprise(command, &env)).await
        }
        Commands::Stats { command } => until_cancelled(&cancel, stats(command, &env)).await,
    }
}

async fn init_schema(env: &EnvManager) -> Result<(), CliError> {
    let db = DatabaseSettings::from_env(env)?;
    let adapter = MySqlAdapter::connect(&db.url()).await?;
    if adapter.table_exists(DEFAULT_TABLE).await? {
        info!(database = %db, table = DEFAULT_TABLE, "Table already exists");
    } else {
        adapter.create_unite_legale().await?;
    }
    adapter.disconnect().await?;
    Ok(())
}

fn import_settings(args: &ImportArgs) -> Result<ImportSettings, CliError> {
    let settings = ImportSettings {
        csv_file: args.csv_file.clone(),
        batch_size: BatchSize::new(args.batch_size, RowMapper::unite_legale().column_count())?,
        truncate: args.truncate,
        table: args.table.clone(),
        delimiter: parse_delimiter(&args.delimiter)?,
        max_attempts: args.max_attempts,
        batch_timeout: args.batch_timeout_secs.map(Duration::from_secs),
    };
    settings.validate()?;
    Ok(settings)
}

async fn import(
    args: ImportArgs,
    env: &EnvManager,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let settings = import_settings(&args)?;
    let db = DatabaseSettings::from_env(env)?;

    info!(
        database = %db,
        csv_file = %settings.csv_file.display(),
        table = %settings.table,
        batch_size = settings.batch_size.get(),
        truncate = settings.truncate,
        "Starting import"
    );

    let adapter = until_cancelled(&cancel, async {
        Ok(MySqlAdapter::connect(&db.url()).await?)
    })
    .await?;
    let controller = TransferController::new(
        Arc::new(MySqlDestination::new(adapter.clone())),
        settings.transfer_settings(),
    )
    .with_cancellation(cancel);

    let report = TransferReport::for_import(controller.run_id(), &settings);
    let path = settings.csv_file.to_string_lossy().into_owned();
    let csv_settings = CsvSettings::new(settings.delimiter);

    let result = controller
        .run_with_retry(
            || CsvSource::open(&path, csv_settings),
            &settings.retry_policy(),
        )
        .await;

    if let Err(e) = adapter.disconnect().await {
        warn!(error = %e, "Failed to close the connection pool");
    }

    let report = match &result {
        Ok(outcome) => report.committed(
            outcome.records_read,
            outcome.records_persisted,
            outcome.records_skipped,
            outcome.batches_loaded,
        ),
        Err(e) => report.rolled_back(e),
    };

    match &args.report {
        Some(path) => {
            output::write_json(&report, path).await?;
            info!(path = %path.display(), "Report written");
        }
        None => output::print_json(&report)?,
    }

    result?;
    Ok(())
}

fn page_request(args: PageArgs) -> Result<PageRequest, CliError> {
    PageRequest::new(args.page, args.limit).map_err(|e| CliError::Query(e.into()))
}

async fn entreprise(command: EntrepriseCommand, env: &EnvManager) -> Result<(), CliError> {
    let db = DatabaseSettings::from_env(env)?;
    let api = ApiSettings::from_env(env);
    let adapter = MySqlAdapter::connect(&db.url()).await?;
    let service = EntrepriseService::new(MySqlEntityStore::new(adapter.clone()));

    let result = async {
        match command {
            EntrepriseCommand::Siren { siren } => {
                output::print_json(&service.get_by_siren(&siren).await?)
            }
            EntrepriseCommand::Activite { code, page } => {
                let view = service
                    .list_by_activity(&code, page_request(page)?, &api.activity_url(&code))
                    .await?;
                output::print_json(&view)
            }
            EntrepriseCommand::Search { nom, page } => {
                let view = service
                    .search_by_name(&nom, page_request(page)?, &api.search_url(&nom))
                    .await?;
                output::print_json(&view)
            }
        }
    }
    .await;

    adapter.disconnect().await?;
    result
}

/// The analytics client is closed whatever the query outcome.
async fn stats(command: StatsCommand, env: &EnvManager) -> Result<(), CliError> {
    let db = DatabaseSettings::from_env(env)?;
    let api = ApiSettings::from_env(env);
    let service = StatsService::start(MySqlActivityAnalytics::new(db.url())).await?;

    let result = async {
        match command {
            StatsCommand::Count { page } => {
                let view = service
                    .count_by_activity(page_request(page)?, &api.activity_count_url())
                    .await?;
                output::print_json(&view)
            }
            StatsCommand::Filter { code } => {
                output::print_json(&service.filter_by_activity(&code).await?)
            }
            StatsCommand::Top { limit } => output::print_json(&service.top(limit).await?),
            StatsCommand::Bottom { limit } => output::print_json(&service.bottom(limit).await?),
        }
    }
    .await;

    service.stop().await?;
    result
}
