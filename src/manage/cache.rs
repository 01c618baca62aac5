use crate::api::{ApiKeyItem, PromptItem};
use tokio::sync::RwLock;

/// Items with a server-enforced "only one active" flag.
pub trait Activatable {
    fn is_active(&self) -> bool;
}

impl Activatable for PromptItem {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Activatable for ApiKeyItem {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Local copy of one backend collection. Always replaced wholesale.
#[derive(Debug)]
pub struct ListCache<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Clone> ListCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, items: Vec<T>) {
        *self.items.write().await = items;
    }

    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.items.read().await.iter().find(|item| pred(item)).cloned()
    }
}

impl<T: Clone + Activatable> ListCache<T> {
    pub async fn active(&self) -> Option<T> {
        self.find(|item| item.is_active()).await
    }
}
