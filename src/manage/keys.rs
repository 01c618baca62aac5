use super::cache::ListCache;
use crate::api::{ApiKeyItem, WhatsAppApiClient};
use crate::confirm::{ConfirmGate, PendingAction};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

const MASK: &str = "********";

/// Render a secret for display without leaking it.
pub fn mask_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return MASK.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Upstream AI provider keys. Same lifecycle as personas, except the active
/// key may be deleted.
pub struct ApiKeyManager {
    client: Arc<WhatsAppApiClient>,
    cache: ListCache<ApiKeyItem>,
    delete_gate: ConfirmGate<ApiKeyItem>,
}

impl ApiKeyManager {
    pub fn new(client: Arc<WhatsAppApiClient>) -> Self {
        Self {
            client,
            cache: ListCache::new(),
            delete_gate: ConfirmGate::new(),
        }
    }

    pub async fn reload(&self) -> Result<Vec<ApiKeyItem>> {
        let keys = self.client.list_keys().await?;
        self.cache.replace(keys.clone()).await;
        Ok(keys)
    }

    pub async fn keys(&self) -> Vec<ApiKeyItem> {
        self.cache.items().await
    }

    pub async fn active(&self) -> Option<ApiKeyItem> {
        self.cache.active().await
    }

    pub async fn create(&self, name: &str, value: &str) -> Result<Vec<ApiKeyItem>> {
        let name = required_name(name)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::Validation("key value is required".to_string()));
        }
        self.client.create_key(name, value).await?;
        info!(%name, "API key saved");
        self.reload().await
    }

    /// A blank `value` keeps the stored secret.
    pub async fn update(&self, id: &str, name: &str, value: Option<&str>) -> Result<Vec<ApiKeyItem>> {
        let name = required_name(name)?;
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        self.client.update_key(id, name, value).await?;
        info!(%id, %name, replaced_value = value.is_some(), "API key updated");
        self.reload().await
    }

    pub async fn activate(&self, id: &str) -> Result<Vec<ApiKeyItem>> {
        self.client.activate_key(id).await?;
        info!(%id, "API key activated");
        self.reload().await
    }

    pub async fn request_remove(&self, id: &str) -> Result<PendingAction<ApiKeyItem>> {
        let key = self
            .cache
            .find(|k| k.id == id)
            .await
            .ok_or_else(|| Error::Validation(format!("unknown API key '{}'", id)))?;

        let question = if key.is_active {
            format!(
                "Delete API key \"{}\"? It is the active key; the bot stops answering until another is activated.",
                key.name
            )
        } else {
            format!("Delete API key \"{}\"?", key.name)
        };
        self.delete_gate.arm(key, question);
        self.delete_gate.pending().ok_or(Error::NotArmed)
    }

    pub fn cancel_remove(&self) -> bool {
        self.delete_gate.cancel()
    }

    pub async fn confirm_remove(&self) -> Result<Vec<ApiKeyItem>> {
        let key = self.delete_gate.confirm().ok_or(Error::NotArmed)?;
        self.client.delete_key(&key.id).await?;
        info!(id = %key.id, name = %key.name, "API key deleted");
        self.reload().await
    }
}

fn required_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("key name is required".to_string()));
    }
    Ok(name)
}
