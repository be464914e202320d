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

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn, Instrument};

use crate::message::{BrokeredMessage, FailureKind, RoutingContext, RoutingError, RoutingOutcome};
use crate::router::RouterCore;
use crate::traits::MessageContent;

/// Shared request/reply orchestration for routers.
///
/// A concrete router supplies [`core`](Self::core) and
/// [`route_output`](Self::route_output), the step that hands a message to its
/// transport, and inherits:
///
/// * [`dispatch_message`](Self::dispatch_message): one-way vs. two-way dispatch with
///   transport failures converted into exception replies;
/// * [`route_input`](Self::route_input): reaction to a message arriving from the
///   transport (reply notification, local processing, reply routing);
/// * [`process`](Self::process): local processing through the injected processor.
///
/// Routers are cheap handles (`Clone` over shared state) so that detached one-way
/// work can own a copy of the router.
#[async_trait]
pub trait MessageRouterBase: Clone + Send + Sync + 'static {
    /// Shared router state.
    fn core(&self) -> &RouterCore;

    /// Hands `message` to the physical or simulated transport.
    ///
    /// # Errors
    ///
    /// Transport failures, or a protocol violation when the message cannot be routed
    /// by this step at all.
    async fn route_output(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<RoutingOutcome>;

    /// Runs local processing for `message`.
    ///
    /// # Errors
    ///
    /// Propagates the processor's failure to the caller.
    async fn process(
        &self,
        message: &BrokeredMessage,
        context: &RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        self.core().process(message, context, cancellation_token).await
    }

    /// Sends `message` out through [`route_output`](Self::route_output).
    ///
    /// One-way messages are handed to a detached task and `(None, None)` is returned
    /// at once; a failure of that task is only logged. Two-way messages wait for the
    /// output routing; its failure becomes a `(Reply, ExceptionResponseMessage)`
    /// outcome instead of an error.
    ///
    /// # Errors
    ///
    /// Only the argument checks of [`RouterCore::ensure_accepts`] fail.
    async fn dispatch_message(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        self.core().ensure_accepts(&message)?;
        let message_id = message.id().clone();

        if message.is_one_way() {
            trace!(router = %self.core().name(), message_id = %message_id, "Dispatching one-way message");
            let router = self.clone();
            let span = tracing::debug_span!("one_way_output", router = %self.core().name(), message_id = %message_id);
            // The caller's token is not carried into detached work.
            tokio::spawn(
                async move {
                    if let Err(e) = router
                        .route_output(message, context, CancellationToken::new())
                        .await
                    {
                        warn!(error = %e, "One-way output routing failed");
                    }
                }
                .instrument(span),
            );
            return Ok(RoutingOutcome::none());
        }

        trace!(router = %self.core().name(), message_id = %message_id, "Dispatching two-way message");
        match self.route_output(message, context, cancellation_token).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(router = %self.core().name(), message_id = %message_id, error = %e, "Output routing failed, replying with exception");
                Ok(RoutingOutcome::reply(RouterCore::exception_content(
                    FailureKind::Transport,
                    &e,
                )))
            }
        }
    }

    /// Reacts to `message` arriving from the transport side.
    ///
    /// * A reply raises the reply-received notification and is never processed.
    /// * A one-way message is processed on a detached task; `(None, None)` is returned.
    /// * A two-way message is processed (failures become exception content), wrapped in
    ///   a reply envelope and forwarded through [`route_output`](Self::route_output),
    ///   whose outcome is returned.
    ///
    /// Failures that escape these steps are logged and reported as `(None, None)`, so a
    /// single message can never break the transport's delivery loop.
    async fn route_input(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> RoutingOutcome {
        let message_id = message.id().clone();

        if message.is_reply() {
            self.core().raise_reply_received(message, context).await;
            return RoutingOutcome::none();
        }

        if message.is_one_way() {
            debug!(router = %self.core().name(), message_id = %message_id, "Processing one-way message in the background");
            let router = self.clone();
            let span = tracing::debug_span!("one_way_process", router = %self.core().name(), message_id = %message_id);
            tokio::spawn(
                async move {
                    if let Err(e) = router
                        .process(&message, &context, CancellationToken::new())
                        .await
                    {
                        warn!(error = %e, "One-way message processing failed");
                    }
                }
                .instrument(span),
            );
            return RoutingOutcome::none();
        }

        let result = match self
            .process(&message, &context, cancellation_token.clone())
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(router = %self.core().name(), message_id = %message_id, error = %e, "Message processing failed, replying with exception");
                RouterCore::exception_content(FailureKind::Handler, &e)
            }
        };

        let reply = self.core().build_reply(&message, result, &context);
        trace!(router = %self.core().name(), message_id = %message_id, reply_id = %reply.id(), "Routing reply");
        match self.route_output(reply, context, cancellation_token).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(router = %self.core().name(), message_id = %message_id, error = %e, "Routing the reply failed");
                RoutingOutcome::none()
            }
        }
    }
}
