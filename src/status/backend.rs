use crate::api::{Ack, QrResponse, StatusResponse, WhatsAppApiClient};
use crate::error::Result;
use async_trait::async_trait;

/// Session endpoints the status sync depends on.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    fn session_id(&self) -> &str;
    async fn status(&self) -> Result<StatusResponse>;
    async fn qr(&self) -> Result<QrResponse>;
    async fn init(&self) -> Result<Ack>;
    async fn logout(&self) -> Result<Ack>;
}

#[async_trait]
impl SessionBackend for WhatsAppApiClient {
    fn session_id(&self) -> &str {
        WhatsAppApiClient::session_id(self)
    }

    async fn status(&self) -> Result<StatusResponse> {
        WhatsAppApiClient::status(self).await
    }

    async fn qr(&self) -> Result<QrResponse> {
        WhatsAppApiClient::qr(self).await
    }

    async fn init(&self) -> Result<Ack> {
        self.init_session().await
    }

    async fn logout(&self) -> Result<Ack> {
        self.logout_session().await
    }
}
