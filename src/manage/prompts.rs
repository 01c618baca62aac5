use super::cache::ListCache;
use crate::api::{PromptItem, WhatsAppApiClient};
use crate::confirm::{ConfirmGate, PendingAction};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Persona library. Every mutation is followed by a full reload so the
/// backend stays the only judge of which persona is active.
pub struct PromptManager {
    client: Arc<WhatsAppApiClient>,
    cache: ListCache<PromptItem>,
    delete_gate: ConfirmGate<PromptItem>,
}

impl PromptManager {
    pub fn new(client: Arc<WhatsAppApiClient>) -> Self {
        Self {
            client,
            cache: ListCache::new(),
            delete_gate: ConfirmGate::new(),
        }
    }

    pub async fn reload(&self) -> Result<Vec<PromptItem>> {
        let prompts = self.client.list_prompts().await?;
        self.cache.replace(prompts.clone()).await;
        Ok(prompts)
    }

    pub async fn prompts(&self) -> Vec<PromptItem> {
        self.cache.items().await
    }

    pub async fn active(&self) -> Option<PromptItem> {
        self.cache.active().await
    }

    pub async fn create(&self, name: &str, content: &str) -> Result<Vec<PromptItem>> {
        let (name, content) = validate(name, content)?;
        self.client.create_prompt(name, content).await?;
        info!(%name, "Persona saved");
        self.reload().await
    }

    pub async fn update(&self, id: &str, name: &str, content: &str) -> Result<Vec<PromptItem>> {
        let (name, content) = validate(name, content)?;
        self.client.update_prompt(id, name, content).await?;
        info!(%id, %name, "Persona updated");
        self.reload().await
    }

    pub async fn activate(&self, id: &str) -> Result<Vec<PromptItem>> {
        self.client.activate_prompt(id).await?;
        info!(%id, "Persona activated");
        self.reload().await
    }

    /// Arm deletion of a cached persona. The active one is refused.
    pub async fn request_remove(&self, id: &str) -> Result<PendingAction<PromptItem>> {
        let prompt = self
            .cache
            .find(|p| p.id == id)
            .await
            .ok_or_else(|| Error::Validation(format!("unknown persona '{}'", id)))?;
        if prompt.is_active {
            return Err(Error::Validation(format!(
                "persona '{}' is active; activate another one before deleting it",
                prompt.name
            )));
        }

        let question = format!(
            "Delete AI persona \"{}\"? This cannot be undone.",
            prompt.name
        );
        self.delete_gate.arm(prompt, question);
        self.delete_gate.pending().ok_or(Error::NotArmed)
    }

    pub fn cancel_remove(&self) -> bool {
        self.delete_gate.cancel()
    }

    pub async fn confirm_remove(&self) -> Result<Vec<PromptItem>> {
        let prompt = self.delete_gate.confirm().ok_or(Error::NotArmed)?;
        self.client.delete_prompt(&prompt.id).await?;
        info!(id = %prompt.id, name = %prompt.name, "Persona deleted");
        self.reload().await
    }
}

fn validate<'a>(name: &'a str, content: &'a str) -> Result<(&'a str, &'a str)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("persona name is required".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::Validation("persona instructions are required".to_string()));
    }
    Ok((name, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager_for(server: &MockServer) -> PromptManager {
        let config = DashboardConfig::new(server.uri(), "wa-bot-ai");
        PromptManager::new(Arc::new(WhatsAppApiClient::new(&config).unwrap()))
    }

    fn prompt_list(active: &str) -> serde_json::Value {
        json!({
            "success": true,
            "prompts": [
                { "id": "a", "name": "Bestie", "content": "Santai aja", "is_active": active == "a" },
                { "id": "b", "name": "Formal", "content": "Gunakan bahasa baku", "is_active": active == "b" }
            ]
        })
    }

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "success": true }))
    }

    #[tokio::test]
    async fn test_activation_relists_single_active() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/config/prompts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_list("a")))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/whatsapp/config/prompts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_list("b")))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/whatsapp/config/prompts/b/activate"))
            .respond_with(ok())
            .expect(1)
            .mount(&mock_server)
            .await;

        let manager = manager_for(&mock_server);
        manager.reload().await.unwrap();
        assert_eq!(manager.active().await.unwrap().id, "a");

        let prompts = manager.activate("b").await.unwrap();

        let active: Vec<_> = prompts.iter().filter(|p| p.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "b");
        assert_eq!(manager.active().await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_create_posts_then_relists() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/whatsapp/config/prompts"))
            .and(body_json(json!({ "name": "Bestie", "content": "Santai aja" })))
            .respond_with(ok())
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/whatsapp/config/prompts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_list("a")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let manager = manager_for(&mock_server);
        let prompts = manager.create("  Bestie ", "Santai aja").await.unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(manager.prompts().await, prompts);
    }

    #[tokio::test]
    async fn test_blank_fields_send_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ok())
            .expect(0)
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ok())
            .expect(0)
            .mount(&mock_server)
            .await;

        let manager = manager_for(&mock_server);
        assert!(matches!(manager.create("", "x").await, Err(Error::Validation(_))));
        assert!(matches!(manager.create("Bestie", "   ").await, Err(Error::Validation(_))));
        assert!(matches!(manager.update("a", " ", "x").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_active_persona_cannot_be_deleted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/config/prompts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_list("a")))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ok())
            .expect(0)
            .mount(&mock_server)
            .await;

        let manager = manager_for(&mock_server);
        manager.reload().await.unwrap();

        assert!(matches!(manager.request_remove("a").await, Err(Error::Validation(_))));
        assert!(matches!(manager.confirm_remove().await, Err(Error::NotArmed)));
    }

    #[tokio::test]
    async fn test_remove_requires_confirmation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/config/prompts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_list("a")))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/whatsapp/config/prompts/b"))
            .respond_with(ok())
            .expect(1)
            .mount(&mock_server)
            .await;

        let manager = manager_for(&mock_server);
        manager.reload().await.unwrap();

        let pending = manager.request_remove("b").await.unwrap();
        assert!(pending.prompt.contains("Formal"));
        assert!(manager.cancel_remove());
        assert!(matches!(manager.confirm_remove().await, Err(Error::NotArmed)));

        assert_ok!(manager.request_remove("b").await);
        assert_ok!(manager.confirm_remove().await);
        assert_err!(manager.confirm_remove().await);
    }
}
