//! # Telegram Bot API Client
//!
//! Long-polls `getUpdates` and sends plain-text replies and documents. The bot token is
//! part of every request URL, so URLs are stripped from transport errors before they are
//! returned.
use crate::error::BotError;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub mod types;

use types::ApiResponse;
use types::Message;
use types::Update;

/// Extra client-side time on top of the server-side long-poll timeout
const POLL_MARGIN: Duration = Duration::from_secs(10);
const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram method '{0}' failed with code {1}: {2}")]
    ApiError(String, i64, String),

    #[error("Telegram method '{0}' returned no result")]
    MissingResultError(String),
}

pub struct TelegramClient {
    http: reqwest::Client,
    base: Url,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    ///
    /// # Arguments
    /// * `api_url` - Bot API root, normally `https://api.telegram.org`
    /// * `token` - Bot token issued by BotFather
    /// * `poll_timeout` - Server-side long-poll timeout for `getUpdates`
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, BotError> {
        let base = Url::parse(&format!("{}/bot{}/", api_url.trim_end_matches('/'), token))?;
        let http = reqwest::Client::builder()
            .user_agent(format!("permit-bot/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base,
            poll_timeout,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url, BotError> {
        Ok(self.base.join(method)?)
    }

    /// Waits up to the poll timeout for updates with an id of at least `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, BotError> {
        let mut query = vec![
            ("timeout", self.poll_timeout.as_secs().to_string()),
            ("allowed_updates", r#"["message"]"#.to_owned()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let request = self.http
            .get(self.endpoint("getUpdates")?)
            .query(&query)
            .timeout(self.poll_timeout + POLL_MARGIN);
        self.call("getUpdates", request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, BotError> {
        let request = self.http
            .post(self.endpoint("sendMessage")?)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .timeout(SEND_TIMEOUT);
        self.call("sendMessage", request).await
    }

    /// Uploads the file at `path` as a document named `file_name`.
    pub async fn send_document(&self, chat_id: i64, path: &Path, file_name: &str, caption: &str) -> Result<Message, BotError> {
        let bytes = tokio::fs::read(path).await?;
        let document = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(XLSX_MIME)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_owned())
            .part("document", document);
        let request = self.http
            .post(self.endpoint("sendDocument")?)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT);
        self.call("sendDocument", request).await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: RequestBuilder) -> Result<T, BotError> {
        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        let body: ApiResponse<T> = response.json().await.map_err(|e| e.without_url())?;
        if !body.ok {
            let code = body.error_code.unwrap_or(status.as_u16() as i64);
            let description = body.description.unwrap_or_else(|| status.to_string());
            Err(TelegramError::ApiError(method.to_owned(), code, description))?
        }
        Ok(body.result.ok_or_else(|| TelegramError::MissingResultError(method.to_owned()))?)
    }
}
