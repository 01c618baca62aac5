use super::cache::ListCache;
use super::jid::normalize_jid;
use crate::api::{ContactItem, TargetMode, WhatsAppApiClient};
use crate::confirm::{ConfirmGate, PendingAction};
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Allow-list of senders plus the mode that decides whether it applies.
pub struct ContactManager {
    client: Arc<WhatsAppApiClient>,
    cache: ListCache<ContactItem>,
    mode: RwLock<TargetMode>,
    delete_gate: ConfirmGate<ContactItem>,
}

impl ContactManager {
    pub fn new(client: Arc<WhatsAppApiClient>) -> Self {
        Self {
            client,
            cache: ListCache::new(),
            mode: RwLock::new(TargetMode::default()),
            delete_gate: ConfirmGate::new(),
        }
    }

    pub async fn reload(&self) -> Result<(Vec<ContactItem>, TargetMode)> {
        let (contacts, mode) = self.client.list_contacts().await?;
        self.cache.replace(contacts.clone()).await;
        *self.mode.write().await = mode;
        Ok((contacts, mode))
    }

    pub async fn contacts(&self) -> Vec<ContactItem> {
        self.cache.items().await
    }

    pub async fn mode(&self) -> TargetMode {
        *self.mode.read().await
    }

    /// Post the new mode; the cached mode only moves once the backend agrees.
    pub async fn set_mode(&self, mode: TargetMode) -> Result<TargetMode> {
        self.client.set_target_mode(mode).await?;
        *self.mode.write().await = mode;
        info!(%mode, "Target mode changed");
        Ok(mode)
    }

    pub async fn add(&self, number: &str, name: &str) -> Result<Vec<ContactItem>> {
        let jid = normalize_jid(number)?;
        self.client.create_contact(&jid, name.trim()).await?;
        info!(%jid, "Contact added");
        Ok(self.reload().await?.0)
    }

    /// Rename in place, or move the entry when the number itself changed.
    pub async fn edit(&self, original_jid: &str, number: &str, name: &str) -> Result<Vec<ContactItem>> {
        let jid = normalize_jid(number)?;
        let name = name.trim();

        if jid == original_jid {
            self.client.update_contact(&jid, name).await?;
            info!(%jid, "Contact renamed");
        } else {
            debug!(from = %original_jid, to = %jid, "Contact number changed, replacing entry");
            self.client.delete_contact(original_jid).await?;
            if let Err(e) = self.client.create_contact(&jid, name).await {
                warn!(from = %original_jid, to = %jid, error = %e, "Contact deleted but not re-created");
                // The old entry is gone either way; refresh before reporting
                if let Err(reload_err) = self.reload().await {
                    debug!(error = %reload_err, "Reload after failed move also failed");
                }
                return Err(e);
            }
            info!(from = %original_jid, to = %jid, "Contact moved");
        }

        Ok(self.reload().await?.0)
    }

    pub async fn request_remove(&self, jid: &str) -> Result<PendingAction<ContactItem>> {
        let contact = self
            .cache
            .find(|c| c.jid == jid)
            .await
            .ok_or_else(|| Error::Validation(format!("unknown contact '{}'", jid)))?;

        let question = format!(
            "Remove {} ({}) from the contact list?",
            contact.display_name(),
            contact.number()
        );
        self.delete_gate.arm(contact, question);
        self.delete_gate.pending().ok_or(Error::NotArmed)
    }

    pub fn cancel_remove(&self) -> bool {
        self.delete_gate.cancel()
    }

    pub async fn confirm_remove(&self) -> Result<Vec<ContactItem>> {
        let contact = self.delete_gate.confirm().ok_or(Error::NotArmed)?;
        self.client.delete_contact(&contact.jid).await?;
        info!(jid = %contact.jid, "Contact removed");
        Ok(self.reload().await?.0)
    }
}
