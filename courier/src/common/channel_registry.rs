/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::common::MessageQueue;

/// Name-to-channel map shared by every in-process router of a host.
///
/// Channels are created on first request and live as long as the registry; there is
/// at most one channel per name, even under concurrent first access.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Arc<MessageQueue>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the channel called `name`, creating it if needed.
    pub fn channel(&self, name: &str) -> Arc<MessageQueue> {
        if let Some(existing) = self.channels.get(name) {
            return Arc::clone(existing.value());
        }
        let entry = self.channels.entry(name.to_string()).or_insert_with(|| {
            debug!(channel = name, "Creating channel");
            Arc::new(MessageQueue::new(name))
        });
        Arc::clone(entry.value())
    }

    /// Returns the channel called `name` if it was already created.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<MessageQueue>> {
        self.channels.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of all channels created so far, sorted.
    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of channels created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// `true` before any channel was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
