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

use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{error, trace, warn};

/// Identifies one subscription within an [`EventHandlers`] list.
pub type SubscriptionId = u64;

/// Boxed future returned by an event handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// A registered event handler.
pub type EventHandler<T> = Arc<dyn Fn(T) -> HandlerFuture + Send + Sync + 'static>;

/// A subscription list that notifies every handler of an event.
///
/// Handlers may be added or removed at any time, including while a notification is
/// in flight: [`notify`](Self::notify) works on a snapshot taken before the first
/// handler runs. A handler that fails or panics is logged and does not prevent the
/// others from running.
pub struct EventHandlers<T> {
    name: String,
    handlers: DashMap<SubscriptionId, EventHandler<T>>,
    next_id: AtomicU64,
}

impl<T> Debug for EventHandlers<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("name", &self.name)
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> EventHandlers<T> {
    /// Creates an empty list; `name` shows up in logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `handler` and returns its subscription id.
    pub fn subscribe<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: EventHandler<T> = Arc::new(move |event| -> HandlerFuture { Box::pin(handler(event)) });
        self.handlers.insert(id, handler);
        trace!(event = %self.name, subscription = id, "Subscribed event handler");
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.remove(&id).is_some();
        trace!(event = %self.name, subscription = id, removed, "Unsubscribed event handler");
        removed
    }

    /// Number of current subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` when nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Copies the current handlers, ordered by subscription.
    fn snapshot(&self) -> Vec<(SubscriptionId, EventHandler<T>)> {
        let mut handlers: Vec<_> = self
            .handlers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handlers.sort_unstable_by_key(|(id, _)| *id);
        handlers
    }

    /// Invokes every handler subscribed at call time with a clone of `event` and waits
    /// for all of them. Returns how many handlers completed successfully.
    pub async fn notify(&self, event: T) -> usize {
        let handlers = self.snapshot();
        if handlers.is_empty() {
            trace!(event = %self.name, "No subscribers to notify");
            return 0;
        }

        let invocations = handlers.into_iter().map(|(id, handler)| {
            let event = event.clone();
            async move {
                // Invoking the handler can panic before any future exists.
                let invocation = std::panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
                let outcome = match invocation {
                    Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
                    Err(panic) => Err(panic),
                };
                (id, outcome)
            }
        });

        let mut delivered = 0;
        for (id, outcome) in join_all(invocations).await {
            match outcome {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(event = %self.name, subscription = id, error = %e, "Event handler failed");
                }
                Err(_) => {
                    error!(event = %self.name, subscription = id, "Event handler panicked");
                }
            }
        }
        trace!(event = %self.name, delivered, "Notified subscribers");
        delivered
    }
}
