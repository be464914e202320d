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

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::common::EventHandlers;
use crate::message::{
    BrokeredMessage, ExceptionResponseMessage, FailureKind, ProcessingContext, ReplyReceived,
    RoutingContext, RoutingError,
};
use crate::traits::{DefaultMessageBuilderFactory, MessageBuilderFactory, MessageContent, MessageProcessor};

/// State every router shares: its collaborators, the reply-received subscription
/// point and the disposed flag.
#[derive(Debug)]
pub struct RouterCore {
    name: String,
    processor: Arc<dyn MessageProcessor>,
    message_builder: Arc<dyn MessageBuilderFactory>,
    reply_received: EventHandlers<ReplyReceived>,
    disposed: AtomicBool,
}

impl RouterCore {
    /// Creates the core of a router called `name` that processes messages with `processor`.
    pub fn new(name: impl Into<String>, processor: Arc<dyn MessageProcessor>) -> Self {
        let name = name.into();
        Self {
            reply_received: EventHandlers::new(format!("reply_received[{name}]")),
            processor,
            message_builder: Arc::new(DefaultMessageBuilderFactory),
            disposed: AtomicBool::new(false),
            name,
        }
    }

    /// Replaces the factory used to build reply envelopes.
    #[must_use]
    pub fn with_message_builder(mut self, message_builder: Arc<dyn MessageBuilderFactory>) -> Self {
        self.message_builder = message_builder;
        self
    }

    /// The router name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reply-received subscription point.
    #[must_use]
    pub const fn reply_received(&self) -> &EventHandlers<ReplyReceived> {
        &self.reply_received
    }

    /// Rejects messages a router cannot accept at all.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Disposed`] after disposal, [`RoutingError::InvalidArgument`] for
    /// a message with an empty id.
    pub fn ensure_accepts(&self, message: &BrokeredMessage) -> Result<(), RoutingError> {
        if self.is_disposed() {
            return Err(RoutingError::Disposed(self.name.clone()));
        }
        if message.id().is_empty() {
            return Err(RoutingError::InvalidArgument(
                "brokered message has an empty id".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the injected processor inline.
    ///
    /// # Errors
    ///
    /// Propagates the processor's failure; a panicking processor is reported as an error.
    pub async fn process(
        &self,
        message: &BrokeredMessage,
        context: &RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        trace!(router = %self.name, message_id = %message.id(), "Processing message");
        let processing_context = ProcessingContext::new(context.clone(), message.clone());
        let processing = self.processor.process(
            Arc::clone(message.content()),
            processing_context,
            cancellation_token,
        );
        match AssertUnwindSafe(processing).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(anyhow!(
                "processor panicked while handling message {}: {}",
                message.id(),
                panic_message(panic.as_ref())
            )),
        }
    }

    /// Runs the injected processor on a separately scheduled task and waits for it.
    ///
    /// Keeps a delivery callback from driving processing inline, so in-process routing
    /// never recurses into itself on the same stack.
    ///
    /// # Errors
    ///
    /// Propagates the processor's failure; a panicking processor is reported as an error.
    pub async fn process_queued(
        core: Arc<Self>,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        let message_id = message.id().clone();
        tokio::spawn(async move { core.process(&message, &context, cancellation_token).await })
            .await
            .map_err(|e| anyhow!("processing task for message {message_id} failed: {e}"))?
    }

    /// Builds the reply envelope for `request` carrying `content`.
    #[must_use]
    pub fn build_reply(
        &self,
        request: &BrokeredMessage,
        content: MessageContent,
        context: &RoutingContext,
    ) -> BrokeredMessage {
        self.message_builder
            .create(context)
            .reply_to(request)
            .shared_content(content)
            .build()
    }

    /// Wraps `error` as exception reply content.
    #[must_use]
    pub fn exception_content(kind: FailureKind, error: &anyhow::Error) -> MessageContent {
        Arc::new(ExceptionResponseMessage::capture(kind, error))
    }

    /// Raises the reply-received notification for `reply`.
    pub async fn raise_reply_received(&self, reply: BrokeredMessage, context: RoutingContext) {
        debug!(
            router = %self.name,
            reply_id = %reply.id(),
            reply_to = ?reply.reply_to_message_id().map(|id| id.as_str()),
            "Reply received"
        );
        self.reply_received
            .notify(ReplyReceived::new(reply, context))
            .await;
    }

    /// Marks the router disposed. Returns `true` only for the first call.
    pub fn mark_disposed(&self) -> bool {
        !self.disposed.swap(true, Ordering::SeqCst)
    }

    /// `true` once disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
