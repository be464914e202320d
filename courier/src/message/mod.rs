//! Message structures routed between endpoints.
//!
//! # Key Components
//!
//! *   [`BrokeredMessage`]: the routable envelope (id, payload, reply correlation,
//!     one-way flag, recipients).
//! *   [`Recipient`]: an application and/or application-instance endpoint.
//! *   [`RoutingInstruction`] and [`RoutingOutcome`]: what every routing step returns.
//! *   [`RoutingContext`] and [`ProcessingContext`]: typed ambient data.
//! *   [`ExceptionResponseMessage`]: reply content standing in for a failed request.
//! *   [`ReplyReceived`]: notification raised when a reply arrives asynchronously.
//! *   [`RoutingError`]: errors of the routing layer itself.

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

pub use brokered_message::{BrokeredMessage, BrokeredMessageBuilder, MessageId};
pub use events::ReplyReceived;
pub use exception::{ExceptionData, ExceptionResponseMessage, FailureKind};
pub use recipient::Recipient;
pub use routing_context::{ProcessingContext, RoutingContext};
pub use routing_error::RoutingError;
pub use routing_instruction::{RoutingInstruction, RoutingOutcome};

mod brokered_message;
mod events;
mod exception;
mod recipient;
mod routing_context;
mod routing_error;
mod routing_instruction;
