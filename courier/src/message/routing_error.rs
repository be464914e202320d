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

use std::fmt;

use crate::message::MessageId;

/// Errors surfaced by the routing layer itself.
///
/// Handler and transport failures are not represented here; routers turn them into
/// [`ExceptionResponseMessage`](crate::message::ExceptionResponseMessage) replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A routing argument is malformed (for example a message without an id).
    InvalidArgument(String),

    /// A message reached a routing step that cannot handle it.
    ///
    /// This is a wiring defect and is propagated rather than converted into a reply.
    UnexpectedMessage {
        /// Id of the offending message.
        message_id: MessageId,
        /// Router that rejected it.
        router: String,
    },

    /// The router was disposed and accepts no more messages.
    Disposed(String),

    /// A transport needed a Tokio runtime and none was running.
    NoRuntime,

    /// The caller's cancellation token fired while waiting for a reply.
    Cancelled(MessageId),

    /// The pending reply for a request was dropped without being completed.
    ReplyLost(MessageId),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(reason) => write!(f, "Invalid routing argument: {reason}"),
            Self::UnexpectedMessage { message_id, router } => write!(
                f,
                "Unexpected message {message_id} in the output queue of router {router}"
            ),
            Self::Disposed(router) => write!(f, "Router {router} has been disposed"),
            Self::NoRuntime => write!(f, "No Tokio runtime available for transport delivery"),
            Self::Cancelled(id) => write!(f, "Waiting for the reply to {id} was cancelled"),
            Self::ReplyLost(id) => write!(f, "The reply to {id} was lost"),
        }
    }
}

impl std::error::Error for RoutingError {}
