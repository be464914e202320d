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
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::common::SubscriptionId;
use crate::message::{
    BrokeredMessage, MessageId, ReplyReceived, RoutingContext, RoutingError, RoutingInstruction,
};
use crate::traits::{MessageContent, MessageRouter};

type PendingReplies = Arc<DashMap<MessageId, oneshot::Sender<BrokeredMessage>>>;

/// Broker-side table of requests waiting for their reply.
///
/// Routers only raise [`ReplyReceived`]; the correlator subscribes to it, matches
/// each reply's `reply_to_message_id` against the outstanding requests and completes
/// the matching caller. Replies nobody waits for are dropped.
#[derive(Debug)]
pub struct ReplyCorrelator {
    router: Arc<dyn MessageRouter>,
    pending: PendingReplies,
    subscription: SubscriptionId,
}

impl ReplyCorrelator {
    /// Subscribes to `router`'s reply notifications.
    pub fn attach(router: Arc<dyn MessageRouter>) -> Self {
        let pending: PendingReplies = Arc::new(DashMap::new());
        let table = Arc::clone(&pending);
        let subscription = router.reply_received().subscribe(move |event: ReplyReceived| {
            let table = Arc::clone(&table);
            async move {
                complete(&table, event.into_reply());
                anyhow::Ok(())
            }
        });
        debug!(router = router.name(), subscription, "Reply correlator attached");
        Self {
            router,
            pending,
            subscription,
        }
    }

    /// Sends `message` and waits for its reply.
    ///
    /// One-way messages resolve to `None` as soon as the router accepted them. Two-way
    /// messages resolve to the synchronous reply when the router returns one, and
    /// otherwise to the reply correlated from the router's notifications.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors, returns [`RoutingError::Cancelled`] when
    /// `cancellation_token` fires first and [`RoutingError::ReplyLost`] when the
    /// pending entry disappears without a reply.
    #[instrument(skip_all, fields(router = self.router.name(), message_id = %message.id()))]
    pub async fn request(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<Option<MessageContent>, RoutingError> {
        if message.is_one_way() {
            self.router
                .dispatch(message, context, cancellation_token)
                .await?;
            return Ok(None);
        }

        let request_id = message.id().clone();
        let (reply_tx, reply_rx) = oneshot::channel();
        // Registered before dispatch: the reply may arrive before dispatch returns.
        self.pending.insert(request_id.clone(), reply_tx);
        let _pending = PendingGuard {
            pending: Arc::clone(&self.pending),
            request_id: request_id.clone(),
        };

        let outcome = self
            .router
            .dispatch(message, context, cancellation_token.clone())
            .await?;

        if outcome.instruction() == RoutingInstruction::Reply {
            trace!(request_id = %request_id, "Reply returned synchronously");
            return Ok(outcome.into_reply());
        }

        tokio::select! {
            reply = reply_rx => match reply {
                Ok(reply) => Ok(Some(Arc::clone(reply.content()))),
                Err(_) => Err(RoutingError::ReplyLost(request_id)),
            },
            () = cancellation_token.cancelled() => Err(RoutingError::Cancelled(request_id)),
        }
    }

    /// Number of requests still waiting for a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stops listening to the router. Returns `false` if already detached.
    pub fn detach(&self) -> bool {
        self.router.reply_received().unsubscribe(self.subscription)
    }
}

impl Drop for ReplyCorrelator {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Removes a request's pending entry however `request` ends, including when the
/// caller drops the request future.
struct PendingGuard {
    pending: PendingReplies,
    request_id: MessageId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.remove(&self.request_id).is_some() {
            trace!(request_id = %self.request_id, "Released pending request");
        }
    }
}

fn complete(pending: &PendingReplies, reply: BrokeredMessage) -> bool {
    let Some(request_id) = reply.reply_to_message_id() else {
        return false;
    };
    match pending.remove(request_id) {
        Some((_, waiter)) => {
            trace!(request_id = %request_id, reply_id = %reply.id(), "Correlated reply");
            waiter.send(reply).is_ok()
        }
        None => {
            debug!(request_id = %request_id, "Reply for unknown or completed request dropped");
            false
        }
    }
}
