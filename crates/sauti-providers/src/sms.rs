use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::Messenger;

/// Client for Twilio's Messages REST endpoint.
#[derive(Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    pub fn new(
        http: reqwest::Client,
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Self {
        Self {
            http,
            account_sid,
            auth_token,
            from_number,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl Messenger for TwilioClient {
    async fn send_message(&self, to: &str, body: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .context("twilio request")?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let snippet: String = text.chars().take(400).collect();
            return Err(anyhow!("twilio {}: {}", status.as_u16(), snippet));
        }

        let parsed: MessageResponse = serde_json::from_str(&text).context("twilio json parse")?;
        info!(sid = %parsed.sid, "sms dispatched");

        Ok(parsed.sid)
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_response_extracts_sid() {
        let body = r#"{"sid": "SM123abc", "status": "queued", "to": "+27820000000"}"#;
        let parsed: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.sid, "SM123abc");
    }

    #[test]
    fn messages_url_embeds_account_sid() {
        let client = TwilioClient::new(
            reqwest::Client::new(),
            "AC0000".into(),
            "token".into(),
            "+15550001111".into(),
        );
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC0000/Messages.json"
        );
    }
}
