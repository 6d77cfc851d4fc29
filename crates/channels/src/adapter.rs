use {
    crate::error::{Error, Result},
    async_trait::async_trait,
    snapsend_common::Channel,
    std::{collections::HashMap, sync::Arc},
};

/// Send photos (or short notices) through one channel.
///
/// This trait is the injection seam: property tests swap the stubs for
/// deterministic doubles, and a production port swaps them for real
/// provider clients, without touching the dispatcher.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Which channel this adapter serves.
    fn channel(&self) -> Channel;

    /// Deliver a set of photo references to `recipient`.
    ///
    /// Returns a human-readable detail string on success.
    async fn send_photos(&self, recipient: &str, photos: &[String]) -> Result<String>;

    /// Send a short plain-text notice (status confirmation, broadcast).
    async fn send_text(&self, _recipient: &str, _text: &str) -> Result<String> {
        Err(Error::Unsupported {
            channel: self.channel(),
            operation: "send_text",
        })
    }
}

/// All registered adapters, keyed by channel.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        self.adapters.insert(adapter.channel(), adapter);
    }

    pub fn get(&self, channel: Channel) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(&channel).map(Arc::clone)
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.adapters.keys().copied().collect()
    }
}
