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

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::common::EventHandlers;
use crate::message::{BrokeredMessage, ReplyReceived, RoutingContext, RoutingError, RoutingOutcome};
use crate::router::{MessageRouterBase, RouterCore};
use crate::traits::{MessageContent, MessageProcessor, MessageRouter};

/// Router that has no transport at all: every dispatched message is handled locally.
///
/// Two-way dispatch processes the message, builds the reply envelope and hands its
/// content straight back as `(Reply, content)`. Processing always runs on a freshly
/// scheduled task, never inline on the dispatching stack.
#[derive(Debug, Clone)]
pub struct InProcessMessageRouter {
    core: Arc<RouterCore>,
}

impl InProcessMessageRouter {
    /// Router name used when none is given.
    pub const DEFAULT_NAME: &'static str = "in_process";

    /// Creates a router that processes messages with `processor`.
    pub fn new(processor: Arc<dyn MessageProcessor>) -> Self {
        Self::with_core(RouterCore::new(Self::DEFAULT_NAME, processor))
    }

    /// Creates a router from a preconfigured core.
    pub fn with_core(core: RouterCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }
}

#[async_trait]
impl MessageRouterBase for InProcessMessageRouter {
    fn core(&self) -> &RouterCore {
        &self.core
    }

    async fn route_output(
        &self,
        message: BrokeredMessage,
        _context: RoutingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<RoutingOutcome> {
        if message.is_reply() {
            trace!(router = %self.core.name(), reply_id = %message.id(), "Returning reply content to the caller");
            return Ok(RoutingOutcome::reply(Arc::clone(message.content())));
        }
        Err(RoutingError::UnexpectedMessage {
            message_id: message.id().clone(),
            router: self.core.name().to_string(),
        }
        .into())
    }

    async fn process(
        &self,
        message: &BrokeredMessage,
        context: &RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        RouterCore::process_queued(
            Arc::clone(&self.core),
            message.clone(),
            context.clone(),
            cancellation_token,
        )
        .await
    }
}

#[async_trait]
impl MessageRouter for InProcessMessageRouter {
    fn name(&self) -> &str {
        self.core.name()
    }

    /// Dispatch is input routing: the message is handled as if it had just arrived.
    async fn dispatch(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        self.core.ensure_accepts(&message)?;
        Ok(self.route_input(message, context, cancellation_token).await)
    }

    fn reply_received(&self) -> &EventHandlers<ReplyReceived> {
        self.core.reply_received()
    }

    async fn dispose(&self) {
        if self.core.mark_disposed() {
            debug!(router = %self.core.name(), "Router disposed");
        }
    }
}
