//! Log-based publisher adapter.
//!
//! Implements [`Publisher`] by writing each message, with its full topic,
//! to the `log` facade (UART / USB-CDC in production).  An MQTT adapter
//! implements the same trait.

use core::fmt::Write;

use log::info;

use crate::app::ports::Publisher;
use crate::error::IoError;

/// Full topic buffer: root + device + suffix.
pub type Topic = heapless::String<128>;

pub struct LogPublisher {
    prefix: Topic,
    published: u32,
}

impl LogPublisher {
    /// Topics are `<topic_root>/<device_name>/<suffix>`.
    pub fn new(topic_root: &str, device_name: &str) -> Self {
        let mut prefix = Topic::new();
        // Both levels are validated to at most 32 bytes each.
        let _ = write!(prefix, "{topic_root}/{device_name}/");
        Self {
            prefix,
            published: 0,
        }
    }

    pub fn topic(&self, suffix: &str) -> Result<Topic, IoError> {
        let mut topic = self.prefix.clone();
        topic.push_str(suffix).map_err(|()| IoError::Publish)?;
        Ok(topic)
    }

    pub fn published(&self) -> u32 {
        self.published
    }
}

impl Publisher for LogPublisher {
    fn publish(&mut self, topic_suffix: &str, payload: &str) -> Result<(), IoError> {
        let topic = self.topic(topic_suffix)?;
        info!("PUB | {topic} | {payload}");
        self.published = self.published.wrapping_add(1);
        Ok(())
    }
}
