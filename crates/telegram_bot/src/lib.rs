//! Telegram bot front-end.
//!
//! The bot owns the record store directly: inbound message → access guard →
//! menu dispatch → store operation → formatted reply. Session state is
//! in-memory per chat and is lost on restart.

use store::Store;
use teloxide::prelude::*;

mod access;
mod charts;
mod handlers;
mod parsing;
mod state;
mod ui;
mod wizard;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_ids: Option<Vec<i64>>,
    store: Store,
    sessions: state::SessionStore,
    charts: charts::ChartClient,
}

pub struct Bot {
    token: String,
    allowed_ids: Option<Vec<i64>>,
    store: Store,
}

impl Bot {
    pub fn new(token: &str, allowed_ids: Option<Vec<i64>>, store: Store) -> Self {
        Self {
            token: token.to_string(),
            allowed_ids,
            store,
        }
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!(allowed_ids = ?self.allowed_ids, "Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            allowed_ids: self.allowed_ids.clone(),
            store: self.store.clone(),
            sessions: state::SessionStore::default(),
            charts: charts::ChartClient::new(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    allowed_ids: Option<Vec<i64>>,
    store: Option<Store>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user or chat ids permitted to use the bot. An empty list
    /// leaves the bot open.
    pub fn allowed_ids(mut self, allowed_ids: Vec<i64>) -> BotBuilder {
        if !allowed_ids.is_empty() {
            self.allowed_ids = Some(allowed_ids);
        }
        self
    }

    pub fn store(mut self, store: Store) -> BotBuilder {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let store = self
            .store
            .ok_or_else(|| "missing record store".to_string())?;
        Ok(Bot::new(&self.token, self.allowed_ids, store))
    }
}
