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

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::trace;

use crate::common::{EventHandlers, SubscriptionId};
use crate::message::{BrokeredMessage, RoutingError};

/// A named in-process delivery queue standing in for a transport endpoint.
///
/// [`publish`](Self::publish) appends to the FIFO and schedules one drain task, which
/// dequeues a single message and raises "message arrived" to a snapshot of the current
/// subscribers. Drains of concurrent publishes run independently, so subscribers may
/// observe those messages out of enqueue order.
#[derive(Debug)]
pub struct MessageQueue {
    name: String,
    pending: Mutex<VecDeque<BrokeredMessage>>,
    message_arrived: EventHandlers<BrokeredMessage>,
    published: AtomicUsize,
}

impl MessageQueue {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message_arrived: EventHandlers::new(format!("message_arrived[{name}]")),
            pending: Mutex::new(VecDeque::new()),
            published: AtomicUsize::new(0),
            name,
        }
    }

    /// The channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to messages arriving on this channel.
    pub fn subscribe<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(BrokeredMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.message_arrived.subscribe(handler)
    }

    /// Removes a subscription; safe while a delivery is in flight.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.message_arrived.unsubscribe(id)
    }

    /// Number of current subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.message_arrived.len()
    }

    /// Number of messages ever published to this channel.
    #[must_use]
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    /// Number of messages waiting for their drain task.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Enqueues `message` and schedules its delivery.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::NoRuntime`] when called outside a Tokio runtime; the
    /// message is not enqueued in that case.
    pub fn publish(self: &Arc<Self>, message: BrokeredMessage) -> Result<(), RoutingError> {
        let handle = Handle::try_current().map_err(|_| RoutingError::NoRuntime)?;
        trace!(channel = %self.name, message_id = %message.id(), "Publishing message");
        self.pending.lock().push_back(message);
        self.published.fetch_add(1, Ordering::SeqCst);
        trace!(channel = %self.name, "Message enqueued");

        let queue = Arc::clone(self);
        handle.spawn(async move {
            queue.drain_one().await;
        });
        Ok(())
    }

    async fn drain_one(&self) {
        let next = self.pending.lock().pop_front();
        let Some(message) = next else {
            trace!(channel = %self.name, "Drain found an empty queue");
            return;
        };
        let message_id = message.id().clone();
        let delivered = self.message_arrived.notify(message).await;
        trace!(channel = %self.name, message_id = %message_id, delivered, "Message delivered");
    }
}
