//! # Permit Bot
//!
//! A Telegram bot backed by a spreadsheet. It answers permit-number lookups against one
//! sheet of an `.xlsx` workbook and, on request, renders a printable report per supplier
//! from a second sheet.
//!
//! ## Commands
//!
//! - `/start`, `/help`: usage text
//! - `/reload`: reload the workbook now
//! - `/report`: one document per configured supplier
//! - any other text: looked up as a permit number
//!
//! The workbook is reloaded on a timer as well; lookups always see one complete table.
pub mod bot;
pub mod config;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod messages;
pub mod refresh;
pub mod report;
pub mod table;
pub mod telegram;

mod helpers;
mod spreadsheet;

use crate::bot::Dispatcher;
use crate::config::Config;
use crate::error::BotError;
use crate::error::ResultMessage;
use crate::loader::DataLoader;
use crate::loader::TableLoader;
use crate::lookup::LookupEngine;
use crate::refresh::PeriodicRefresh;
use crate::refresh::Refresher;
use crate::report::ReportGenerator;
use crate::table::TableStore;
use crate::telegram::TelegramClient;
use anyhow::Context;
use anyhow::Result;
use std::sync::Arc;

/// Runs the bot until interrupted.
///
/// The initial load happens before the async runtime starts, so the blocking HTTP client
/// never runs on a runtime worker.
///
/// # Errors
///
/// Returns an error if an HTTP client or the runtime cannot be built.
pub fn run(config: Config) -> Result<()> {
    let store = Arc::new(TableStore::new());
    let loader: Arc<dyn TableLoader> =
        Arc::new(DataLoader::new(config.fetch_timeout()).context("Failed to build workbook HTTP client")?);
    let refresher = Arc::new(Refresher::new(
        loader,
        store.clone(),
        config.source.clone(),
        config.tracked_sheets(),
    ));

    let initial = refresher.refresh();
    if !initial.is_success() {
        log::warn!("Starting without data for sheets {:?}; /reload can retry", initial.empty_sheets());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;
    runtime.block_on(serve(&config, store, refresher.clone()))?;
    Ok(())
}

async fn serve(config: &Config, store: Arc<TableStore>, refresher: Arc<Refresher>) -> Result<(), BotError> {
    let client = Arc::new(
        TelegramClient::new(&config.api_url, &config.token, config.poll_timeout())
            .with_prefix("Failed to build Telegram client")?,
    );
    let lookup = LookupEngine::new(store.clone(), config.lookup_settings());
    let reports = ReportGenerator::new(store, config.report_settings());
    let dispatcher = Dispatcher::new(client.clone(), refresher.clone(), lookup, reports);

    let periodic = PeriodicRefresh::start(refresher, config.refresh_interval());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Listen for shutdown signal failed: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Shutdown requested");
    };
    bot::run(&client, &dispatcher, shutdown).await;
    periodic.stop().await;
    Ok(())
}
