//! Completion notification
//!
//! Sends a fixed "your results are ready" e-mail through an HTTP mail relay
//! (Brevo-compatible JSON payload) once the crawl has been exported.

use crate::config::NotifyConfig;
use crate::output::traits::{OutputError, OutputResult};
use reqwest::Client;
use serde::Serialize;

pub const SUBJECT: &str = "Your Scraping Results";

const TEXT_BODY: &str = "Scraping results are done";

const HTML_BODY: &str = r#"<html>
  <head></head>
  <body>
    <p>Hi!<br>
       Your rental listing crawl has finished and the results have been written.
    </p>
  </body>
</html>"#;

#[derive(Serialize)]
struct MailAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MailPayload<'a> {
    sender: MailAddress<'a>,
    to: Vec<MailAddress<'a>>,
    subject: &'a str,
    text_content: &'a str,
    html_content: &'a str,
}

/// Sends the completion e-mail
pub struct CompletionNotifier {
    client: Client,
    config: NotifyConfig,
    api_key: Option<String>,
}

impl CompletionNotifier {
    /// Creates a notifier, reading the API key from the configured
    /// environment variable
    pub fn from_env(client: Client, config: NotifyConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::new(client, config, api_key)
    }

    pub fn new(client: Client, config: NotifyConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Posts the fixed completion message to the mail relay
    pub async fn send_completion(&self) -> OutputResult<()> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OutputError::MissingApiKey(self.config.api_key_env.clone()))?;

        let payload = MailPayload {
            sender: MailAddress {
                email: &self.config.sender,
            },
            to: vec![MailAddress {
                email: &self.config.email,
            }],
            subject: SUBJECT,
            text_content: TEXT_BODY,
            html_content: HTML_BODY,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OutputError::Notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OutputError::Notify(format!("HTTP {}: {}", status, body)));
        }

        tracing::info!("Completion notice sent to {}", self.config.email);
        Ok(())
    }
}
