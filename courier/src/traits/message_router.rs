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
use std::fmt::Debug;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::common::EventHandlers;
use crate::message::{BrokeredMessage, ReplyReceived, RoutingContext, RoutingError, RoutingOutcome};

/// The capability every router exposes to the broker that selected it.
///
/// `dispatch` hands a brokered message to the router. Two-way messages always resolve
/// to some reply, either synchronously (`RoutingInstruction::Reply`) or later through
/// the [`reply_received`](MessageRouter::reply_received) subscription point. One-way
/// messages always resolve to `RoutingInstruction::None` without waiting for delivery.
#[async_trait]
pub trait MessageRouter: Send + Sync + Debug {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Routes `message` and reports how the caller should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidArgument`] for a message without an id and
    /// [`RoutingError::Disposed`] once the router has been disposed. Handler and
    /// transport failures are never returned here; they become exception replies.
    async fn dispatch(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError>;

    /// Subscription point raised whenever a reply arrives asynchronously.
    fn reply_received(&self) -> &EventHandlers<ReplyReceived>;

    /// Releases transport resources. Calling it more than once is a no-op.
    async fn dispose(&self);
}
