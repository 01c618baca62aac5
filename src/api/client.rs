use super::types::*;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// HTTP client for the WhatsApp bot backend.
#[derive(Debug, Clone)]
pub struct WhatsAppApiClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl WhatsAppApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session_id: config.session_id.clone(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/whatsapp/{}", self.base_url, path)
    }

    fn session_url(&self, action: &str) -> String {
        self.url(&format!("{}/{}", self.session_id, action))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            debug!(%status, url = %response.url(), "Backend returned error status");
            return Err(Error::Status(status));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    async fn mutate(&self, request: RequestBuilder) -> Result<()> {
        let ack: Ack = self.send(request).await?;
        if ack.success {
            Ok(())
        } else {
            Err(Error::Rejected(ack.reason()))
        }
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.mutate(self.client.post(self.url(path)).json(body)).await
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.mutate(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.mutate(self.client.delete(self.url(path))).await
    }

    // Session

    /// Raw status envelope; `success: false` is left for the caller to judge.
    pub async fn status(&self) -> Result<StatusResponse> {
        self.send(self.client.get(self.session_url("status"))).await
    }

    pub async fn qr(&self) -> Result<QrResponse> {
        self.send(self.client.get(self.session_url("qr"))).await
    }

    pub async fn init_session(&self) -> Result<Ack> {
        self.send(self.client.post(self.session_url("init"))).await
    }

    pub async fn logout_session(&self) -> Result<Ack> {
        self.send(self.client.post(self.session_url("logout"))).await
    }

    // Stats & history

    pub async fn stats(&self) -> Result<StatsResponse> {
        let resp: StatsResponse = self.send(self.client.get(self.url("stats/history"))).await?;
        if !resp.success {
            return Err(Error::Rejected(resp.error.unwrap_or_else(|| "stats unavailable".to_string())));
        }
        Ok(resp)
    }

    pub async fn chat_history(&self, jid: &str) -> Result<Vec<ChatMessage>> {
        let resp: HistoryResponse = self
            .send(self.client.get(self.url(&format!("history/{}", jid))))
            .await?;
        if !resp.success {
            return Err(Error::Rejected(resp.error.unwrap_or_else(|| "history unavailable".to_string())));
        }
        Ok(resp.history)
    }

    // Prompts

    pub async fn list_prompts(&self) -> Result<Vec<PromptItem>> {
        let resp: PromptsResponse = self.send(self.client.get(self.url("config/prompts"))).await?;
        if !resp.success {
            return Err(Error::Rejected(resp.error.unwrap_or_else(|| "prompts unavailable".to_string())));
        }
        Ok(resp.prompts)
    }

    pub async fn create_prompt(&self, name: &str, content: &str) -> Result<()> {
        self.post_json("config/prompts", &PromptRequest { name, content }).await
    }

    pub async fn update_prompt(&self, id: &str, name: &str, content: &str) -> Result<()> {
        self.put_json(&format!("config/prompts/{}", id), &PromptRequest { name, content })
            .await
    }

    pub async fn activate_prompt(&self, id: &str) -> Result<()> {
        self.mutate(self.client.post(self.url(&format!("config/prompts/{}/activate", id))))
            .await
    }

    pub async fn delete_prompt(&self, id: &str) -> Result<()> {
        self.delete(&format!("config/prompts/{}", id)).await
    }

    // API keys

    pub async fn list_keys(&self) -> Result<Vec<ApiKeyItem>> {
        let resp: KeysResponse = self.send(self.client.get(self.url("config/keys"))).await?;
        if !resp.success {
            return Err(Error::Rejected(resp.error.unwrap_or_else(|| "keys unavailable".to_string())));
        }
        Ok(resp.keys)
    }

    pub async fn create_key(&self, name: &str, key_value: &str) -> Result<()> {
        self.post_json("config/keys", &KeyRequest { name, key_value: Some(key_value) })
            .await
    }

    pub async fn update_key(&self, id: &str, name: &str, key_value: Option<&str>) -> Result<()> {
        self.put_json(&format!("config/keys/{}", id), &KeyRequest { name, key_value })
            .await
    }

    pub async fn activate_key(&self, id: &str) -> Result<()> {
        self.mutate(self.client.post(self.url(&format!("config/keys/{}/activate", id))))
            .await
    }

    pub async fn delete_key(&self, id: &str) -> Result<()> {
        self.delete(&format!("config/keys/{}", id)).await
    }

    // Contacts

    pub async fn list_contacts(&self) -> Result<(Vec<ContactItem>, TargetMode)> {
        let resp: ContactsResponse = self.send(self.client.get(self.url("config/contacts"))).await?;
        if !resp.success {
            return Err(Error::Rejected(resp.error.unwrap_or_else(|| "contacts unavailable".to_string())));
        }
        Ok((resp.contacts, resp.mode))
    }

    pub async fn create_contact(&self, jid: &str, push_name: &str) -> Result<()> {
        self.post_json("config/contacts", &ContactRequest { jid, push_name }).await
    }

    pub async fn update_contact(&self, jid: &str, push_name: &str) -> Result<()> {
        self.put_json(&format!("config/contacts/{}", jid), &ContactRename { push_name })
            .await
    }

    pub async fn delete_contact(&self, jid: &str) -> Result<()> {
        self.delete(&format!("config/contacts/{}", jid)).await
    }

    pub async fn set_target_mode(&self, mode: TargetMode) -> Result<()> {
        self.post_json("config/target-mode", &ModeRequest { mode }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WhatsAppApiClient {
        WhatsAppApiClient::new(&DashboardConfig::new(server.uri(), "wa-bot-ai")).unwrap()
    }

    #[tokio::test]
    async fn test_status_uses_session_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/wa-bot-ai/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "status": "open",
                "isConnected": true,
                "phoneNumber": "6281234567890",
                "hasQR": false
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let status = client_for(&mock_server).status().await.unwrap();

        assert_eq!(status.status, SessionStatus::Open);
        assert!(status.is_connected);
        assert_eq!(status.phone_number.as_deref(), Some("6281234567890"));
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/wa-bot-ai/qr"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).qr().await.unwrap_err();
        assert!(matches!(err, Error::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/wa-bot-ai/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).status().await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_handle_connection_error() {
        // Nothing listens on this port
        let config = DashboardConfig::new("http://127.0.0.1:59998", "wa-bot-ai");
        let client = WhatsAppApiClient::new(&config).unwrap();

        let err = client.status().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_rejected_mutation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/whatsapp/config/prompts"))
            .and(body_json(json!({ "name": "Bestie", "content": "Be nice" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "duplicate name"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .create_prompt("Bestie", "Be nice")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(ref msg) if msg == "duplicate name"));
    }

    #[tokio::test]
    async fn test_contact_paths_carry_jid() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/whatsapp/config/contacts/6281234567890@s.whatsapp.net"))
            .and(body_json(json!({ "push_name": "Budi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/whatsapp/config/target-mode"))
            .and(body_json(json!({ "mode": "specific" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .update_contact("6281234567890@s.whatsapp.net", "Budi")
            .await
            .unwrap();
        client.set_target_mode(TargetMode::Specific).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_and_history() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/stats/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "stats": [
                    { "jid": "628111@s.whatsapp.net", "push_name": "Ani", "msg_count": 12, "last_active": "2026-10-19T09:00:00Z" }
                ],
                "global": { "requests": 40, "responses": 38 }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/history/628111@s.whatsapp.net"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "history": [
                    { "role": "user", "content": "halo" },
                    { "role": "model", "content": "hai!", "latency": 512 }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let stats = client.stats().await.unwrap();
        assert_eq!(stats.stats.len(), 1);
        assert_eq!(stats.global, GlobalStats { requests: 40, responses: 38 });

        let history = client.chat_history("628111@s.whatsapp.net").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, ChatRole::Assistant);
    }
}
