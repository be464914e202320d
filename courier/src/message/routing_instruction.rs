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

use crate::traits::{downcast_content, CourierMessage, MessageContent};

/// Signal returned by every routing operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoutingInstruction {
    /// Routing is fully handled; the caller has nothing more to do.
    #[default]
    None,
    /// The outcome carries a direct reply to hand back to the immediate caller.
    Reply,
}

/// The instruction produced by a routing operation, plus the reply content when the
/// instruction is [`RoutingInstruction::Reply`].
#[derive(Clone, Debug, Default)]
pub struct RoutingOutcome {
    instruction: RoutingInstruction,
    reply: Option<MessageContent>,
}

impl RoutingOutcome {
    /// Nothing more to do.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            instruction: RoutingInstruction::None,
            reply: None,
        }
    }

    /// A synchronous reply carrying `content`.
    #[must_use]
    pub fn reply(content: MessageContent) -> Self {
        Self {
            instruction: RoutingInstruction::Reply,
            reply: Some(content),
        }
    }

    /// Wraps a concrete payload as a synchronous reply.
    pub fn reply_with(content: impl CourierMessage) -> Self {
        Self::reply(Arc::new(content))
    }

    /// The routing instruction.
    #[must_use]
    pub const fn instruction(&self) -> RoutingInstruction {
        self.instruction
    }

    /// The reply content, present only for [`RoutingInstruction::Reply`].
    #[must_use]
    pub const fn reply_content(&self) -> Option<&MessageContent> {
        self.reply.as_ref()
    }

    /// Downcasts the reply content to `T`.
    #[must_use]
    pub fn reply_as<T: 'static>(&self) -> Option<&T> {
        self.reply.as_ref().and_then(downcast_content::<T>)
    }

    /// `true` for a `(None, None)` outcome.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.instruction == RoutingInstruction::None && self.reply.is_none()
    }

    /// Consumes the outcome, returning the reply content.
    #[must_use]
    pub fn into_reply(self) -> Option<MessageContent> {
        self.reply
    }
}
