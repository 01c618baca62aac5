use crate::api::{SessionStatus, StatusResponse};
use serde::{Deserialize, Serialize};

/// Local mirror of the backend's connection state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub success: bool,
    pub status: SessionStatus,
    pub is_connected: bool,
    pub phone_number: Option<String>,
    pub has_qr: bool,
    pub qr_image: Option<String>,
}

/// What the pairing panel should show.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingView {
    /// Pairing code available; the image may still be loading
    Pairing(Option<String>),
    Connected(Option<String>),
    Idle,
}

impl StatusSnapshot {
    /// Disconnected, nothing linked, no pairing code.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Fold a successful status response in. A cached QR image survives only
    /// while the backend keeps reporting `hasQR`.
    pub fn merge(&mut self, resp: &StatusResponse) {
        self.success = resp.success;
        self.status = resp.status;
        self.is_connected = resp.is_connected;
        self.phone_number = resp.phone_number.clone();
        self.has_qr = resp.has_qr;
        if !self.has_qr {
            self.qr_image = None;
        }
    }

    pub fn needs_qr(&self) -> bool {
        self.has_qr && self.qr_image.is_none()
    }

    pub fn visible_qr(&self) -> Option<&str> {
        if self.has_qr {
            self.qr_image.as_deref()
        } else {
            None
        }
    }

    pub fn can_initialize(&self) -> bool {
        !self.is_connected && !self.has_qr
    }

    pub fn can_logout(&self) -> bool {
        self.is_connected
    }

    pub fn system_label(&self) -> &'static str {
        if self.is_connected {
            "OPERATIONAL"
        } else {
            "OFFLINE"
        }
    }

    pub fn pairing_view(&self) -> PairingView {
        if self.has_qr {
            PairingView::Pairing(self.visible_qr().map(str::to_string))
        } else if self.is_connected {
            PairingView::Connected(self.phone_number.clone())
        } else {
            PairingView::Idle
        }
    }
}
