//! CLI runner - executes commands

use crate::cli::commands::{ApiArgs, Cli, Commands, HarvestArgs, ImportArgs};
use crate::database::{connect, BulkLoader, IMPORT_SPECS};
use crate::error::{Error, Result, ResultExt};
use crate::harvest::Harvester;
use crate::http::RetryingClient;
use crate::output::NdjsonSink;
use crate::state::CheckpointStore;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Export { api, harvest } => self.export(api, harvest).await,
            Commands::Import(args) => self.import(args).await,
            Commands::Checkpoint { checkpoint_path } => {
                self.checkpoint(checkpoint_path.clone()).await
            }
        }
    }

    /// Harvest every selected section into the output logs
    async fn export(&self, api: &ApiArgs, harvest: &HarvestArgs) -> Result<()> {
        let api = api.settings()?;
        let settings = harvest.settings()?;
        let start = Instant::now();

        let client = RetryingClient::new(api.http_config(), api.oauth_config())?;
        let mut store = CheckpointStore::open(settings.checkpoint_path.clone()).await?;
        let mut sink = NdjsonSink::new(&settings.out_dir);

        let stats = Harvester::new(&client, &mut store, &mut sink, &settings)
            .run()
            .await?;

        info!(
            out_dir = %settings.out_dir.display(),
            requests = stats.requests,
            pages = stats.pages_fetched,
            records = stats.records_emitted,
            units_completed = stats.units_completed,
            units_skipped = stats.units_skipped,
            elapsed_secs = start.elapsed().as_secs(),
            "export: complete"
        );
        Ok(())
    }

    /// Replace every table from the output logs
    async fn import(&self, args: &ImportArgs) -> Result<()> {
        let settings = args.settings()?;
        let mut client = connect(&settings.database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let report = BulkLoader::new(&mut client, &settings.out_dir)
            .transactional(settings.transactional)
            .load_all(&IMPORT_SPECS)
            .await?;

        if !report.missing.is_empty() {
            info!(tables = ?report.missing, "import: tables without a log were left untouched");
        }
        Ok(())
    }

    /// Print the ledger with the journal replayed
    async fn checkpoint(&self, path: Option<PathBuf>) -> Result<()> {
        let path = path.ok_or_else(|| Error::missing_field("CHECKPOINT_PATH"))?;
        let store = CheckpointStore::open(Some(path)).await?;
        println!("{}", store.to_json_pretty()?);
        Ok(())
    }
}
