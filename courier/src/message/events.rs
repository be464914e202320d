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

use derive_new::new;

use crate::message::{BrokeredMessage, RoutingContext};

/// Raised by a router when a reply arrives on its input side.
///
/// The router never correlates replies itself; subscribers (normally the broker that
/// sent the request) match [`BrokeredMessage::reply_to_message_id`] against their
/// outstanding requests.
#[derive(Clone, Debug, new)]
pub struct ReplyReceived {
    reply: BrokeredMessage,
    context: RoutingContext,
}

impl ReplyReceived {
    /// The reply envelope.
    #[must_use]
    pub const fn reply(&self) -> &BrokeredMessage {
        &self.reply
    }

    /// The context the reply was received with.
    #[must_use]
    pub const fn context(&self) -> &RoutingContext {
        &self.context
    }

    /// Consumes the event, returning the reply envelope.
    #[must_use]
    pub fn into_reply(self) -> BrokeredMessage {
        self.reply
    }
}
