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
use tracing::{trace, warn};

use crate::message::{BrokeredMessage, FailureKind, RoutingContext, RoutingError, RoutingOutcome};
use crate::router::{MessageRouterBase, RouterCore};

/// Router base for transports with separate input and output sides.
///
/// Nothing crosses the two sides synchronously: dispatch only pushes onto the output
/// side, and replies come back later through
/// [`route_input`](MessageRouterBase::route_input) on the input side, where they surface
/// as reply-received notifications. Implementors route their
/// [`route_output`](MessageRouterBase::route_output) to
/// [`route_output_duplex`](Self::route_output_duplex) and their dispatch to
/// [`dispatch_duplex`](Self::dispatch_duplex).
#[async_trait]
pub trait DuplexMessageRouterBase: MessageRouterBase {
    /// Enqueues `message` on the output side.
    ///
    /// # Errors
    ///
    /// Transport failures while enqueueing.
    async fn send_output(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<()>;

    /// Output routing of a duplex transport: enqueue and report `(None, None)`.
    ///
    /// # Errors
    ///
    /// Propagates [`send_output`](Self::send_output) failures.
    async fn route_output_duplex(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<RoutingOutcome> {
        self.send_output(message, context, cancellation_token).await?;
        Ok(RoutingOutcome::none())
    }

    /// Pushes every message, one-way or not, to the output side and returns
    /// `(None, None)`.
    ///
    /// If the push fails, a two-way message gets an exception reply so its caller still
    /// receives a response; a one-way failure is only logged.
    ///
    /// # Errors
    ///
    /// Only the argument checks of [`RouterCore::ensure_accepts`] fail.
    async fn dispatch_duplex(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        self.core().ensure_accepts(&message)?;
        let message_id = message.id().clone();
        let is_one_way = message.is_one_way();
        trace!(router = %self.core().name(), message_id = %message_id, is_one_way, "Pushing message to the output side");

        match self.send_output(message, context, cancellation_token).await {
            Ok(()) => Ok(RoutingOutcome::none()),
            Err(e) if is_one_way => {
                warn!(router = %self.core().name(), message_id = %message_id, error = %e, "One-way output failed");
                Ok(RoutingOutcome::none())
            }
            Err(e) => {
                warn!(router = %self.core().name(), message_id = %message_id, error = %e, "Output failed, replying with exception");
                Ok(RoutingOutcome::reply(RouterCore::exception_content(
                    FailureKind::Transport,
                    &e,
                )))
            }
        }
    }

    /// Handles a message delivered by the input side.
    ///
    /// Delivery callbacks have no caller waiting on them, so the work runs with a fresh
    /// cancellation token.
    async fn receive_input(&self, message: BrokeredMessage, context: RoutingContext) -> RoutingOutcome {
        self.route_input(message, context, CancellationToken::new())
            .await
    }
}
