use crate::error::CliError;
use async_trait::async_trait;
use connectors::sql::mysql::adapter::MySqlAdapter;
use engine_config::settings::database::DatabaseSettings;
use tracing::{error, info};

/// Trait for "pinging" a data source
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

pub struct MySqlConnectionPinger<'a> {
    pub settings: &'a DatabaseSettings,
}

#[async_trait]
impl ConnectionPinger for MySqlConnectionPinger<'_> {
    async fn ping(&self) -> Result<(), CliError> {
        let target = self.settings.redacted_url();
        info!(url = %target, "Pinging MySQL");

        let adapter = MySqlAdapter::connect(&self.settings.url())
            .await
            .inspect_err(|e| error!(url = %target, error = %e, "Invalid MySQL connection settings"))?;

        if let Err(e) = adapter.ping().await {
            error!(url = %target, error = %e, "MySQL ping failed");
            return Err(e.into());
        }

        info!(url = %target, "MySQL ping succeeded");
        adapter.disconnect().await?;
        Ok(())
    }
}
