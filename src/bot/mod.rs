//! # Bot
//!
//! Routes inbound chat messages to the lookup, refresh and report components and runs the
//! long-polling loop. Messages are handled one at a time in arrival order.
use crate::error::BotError;
use crate::lookup::LookupEngine;
use crate::messages;
use crate::refresh::Refresher;
use crate::report::deliver_transient;
use crate::report::ReportGenerator;
use crate::report::ReportOutcome;
use crate::telegram::TelegramClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub mod command;
pub mod delivery;

use command::Command;
use delivery::ChatId;
use delivery::Delivery;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

pub struct Dispatcher<D: Delivery + ?Sized> {
    delivery: Arc<D>,
    refresher: Arc<Refresher>,
    lookup: LookupEngine,
    reports: ReportGenerator,
}

impl<D: Delivery + ?Sized> Dispatcher<D> {
    pub fn new(delivery: Arc<D>, refresher: Arc<Refresher>, lookup: LookupEngine, reports: ReportGenerator) -> Self {
        Self {
            delivery,
            refresher,
            lookup,
            reports,
        }
    }

    /// Handles one text message from `chat`, sending every reply it produces.
    pub async fn handle(&self, chat: ChatId, text: &str) -> Result<(), BotError> {
        let command = Command::parse(text);
        log::debug!("Chat {} sent {:?}", chat, command);
        match command {
            Command::Start | Command::Help | Command::Unknown(_) => self.reply(chat, messages::HELP).await,
            Command::Reload => self.reload(chat).await,
            Command::Report => self.report(chat).await,
            Command::Query(query) => match self.lookup.lookup(&query) {
                Some(reply) => self.reply(chat, &reply).await,
                None => Ok(()),
            },
        }
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<(), BotError> {
        if text.is_empty() {
            log::warn!("Skipped empty reply to chat {}", chat);
            return Ok(());
        }
        self.delivery.send_text(chat, text).await
    }

    async fn reload(&self, chat: ChatId) -> Result<(), BotError> {
        let report = self.refresher.clone().refresh_in_background().await?;
        let text = if report.is_success() {
            messages::RELOAD_OK.to_owned()
        } else {
            messages::reload_failed(&report.empty_sheets())
        };
        self.reply(chat, &text).await
    }

    async fn report(&self, chat: ChatId) -> Result<(), BotError> {
        if self.reports.groups().is_empty() {
            return self.reply(chat, messages::NO_GROUPS).await;
        }
        self.reply(chat, messages::REPORT_STARTED).await?;

        let reports = self.reports.clone();
        let outcomes = tokio::task::spawn_blocking(move || reports.generate()).await?;
        for outcome in outcomes {
            match outcome {
                ReportOutcome::Unavailable => self.notify(chat, messages::DATA_UNAVAILABLE).await,
                ReportOutcome::MissingColumn(column) => self.notify(chat, &messages::missing_column(&column)).await,
                ReportOutcome::NoData(group) => self.notify(chat, &messages::report_no_data(&group)).await,
                ReportOutcome::Failed(group, _) => self.notify(chat, &messages::report_failed(&group)).await,
                ReportOutcome::Rendered(document) => {
                    if let Err(e) = deliver_transient(&*self.delivery, chat, &document).await {
                        log::error!("Deliver report for '{}' to chat {} failed: {}", document.group, chat, e);
                        self.notify(chat, &messages::report_failed(&document.group)).await;
                    }
                }
            }
        }
        Ok(())
    }

    /// Sends one per-group notice, logging a send failure instead of returning it.
    async fn notify(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.reply(chat, text).await {
            log::error!("Send report notice to chat {} failed: {}", chat, e);
        }
    }
}

/// Long-polls for updates and dispatches them until `shutdown` resolves.
///
/// Poll failures are retried with exponential backoff; a failing message is logged and
/// skipped.
pub async fn run<D, F>(client: &TelegramClient, dispatcher: &Dispatcher<D>, shutdown: F)
where
    D: Delivery + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;
    let mut backoff = INITIAL_BACKOFF;
    log::info!("Polling for updates");
    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = client.get_updates(offset) => polled,
        };
        match polled {
            Ok(updates) => {
                backoff = INITIAL_BACKOFF;
                for update in updates {
                    offset = Some(update.update_id + 1);
                    let Some(message) = update.message else {
                        continue;
                    };
                    let Some(text) = message.text else {
                        continue;
                    };
                    if let Err(e) = dispatcher.handle(message.chat.id, &text).await {
                        log::error!("Handle message from chat {} failed: {}", message.chat.id, e);
                    }
                }
            }
            Err(e) => {
                log::warn!("Poll updates failed, retrying in {:?}: {}", backoff, e);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
    log::info!("Polling stopped");
}
