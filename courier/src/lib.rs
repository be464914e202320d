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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Courier
//!
//! Routing core for brokered request/reply messaging between applications.
//!
//! ## Key Concepts
//!
//! - **Brokered messages (`BrokeredMessage`)**: routable envelopes with an id, a payload,
//!   an optional reply correlation, a one-way flag and a recipient list.
//! - **Routing outcomes (`RoutingOutcome`)**: every routing step tells its caller whether
//!   a reply is available synchronously (`Reply`) or not (`None`).
//! - **Routers (`MessageRouter`)**: dispatch outgoing messages, route incoming ones to a
//!   `MessageProcessor` and raise a notification when a reply arrives asynchronously.
//! - **In-process transports**: `InProcessMessageRouter` handles everything locally;
//!   `InProcessAppMessageRouter` exchanges messages between applications over named
//!   channels of a shared `ChannelRegistry`.
//! - **Reply correlation (`ReplyCorrelator`)**: turns reply notifications back into an
//!   awaitable request/response call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[courier_message]
//! struct Ping;
//!
//! let router = InProcessMessageRouter::new(Arc::new(FnProcessor::new("pong", |_, _, _| async {
//!     anyhow::Ok(Arc::new("pong".to_string()) as MessageContent)
//! })));
//! let outcome = router
//!     .dispatch(BrokeredMessage::new(Ping), RoutingContext::default(), CancellationToken::new())
//!     .await?;
//! assert_eq!(outcome.reply_as::<String>().map(String::as_str), Some("pong"));
//! ```

/// Configuration, identity, notification and in-process channel infrastructure.
pub(crate) mod common;

/// Message envelopes, routing outcomes, contexts and errors.
pub(crate) mod message;

/// Router implementations.
pub(crate) mod router;

/// Core traits of the routing layer.
pub(crate) mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `courier-macro`)
/// *   [`courier_macro::courier_message`]: Attribute macro for declaring payload types.
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html):
///     needed to implement [`MessageProcessor`] and the router traits.
/// *   [`tokio_util::sync::CancellationToken`]: cooperative cancellation of routing work.
///
/// ## Core Types
/// *   [`crate::message::BrokeredMessage`]: The routable envelope.
/// *   [`crate::message::RoutingOutcome`]: Result of every routing step.
/// *   [`crate::router::InProcessMessageRouter`]: Transport-less router.
/// *   [`crate::router::InProcessAppMessageRouter`]: Channel-based router between applications.
/// *   [`crate::common::ReplyCorrelator`]: Awaitable request/response over reply notifications.
/// *   [`crate::common::CourierConfig`]: Configuration loaded from XDG locations.
pub mod prelude {
    // Macros from courier-macro
    pub use courier_macro::*;

    // External crate re-exports
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;

    // Core types
    pub use crate::common::{
        AppIdentity, AppIdentityProvider, ChannelRegistry, CourierConfig, EventHandler,
        EventHandlers, HandlerFuture, IdentityConfig, MessageQueue, ReplyCorrelator,
        RoutingConfig, SubscriptionId, CONFIG,
    };
    pub use crate::message::{
        BrokeredMessage, BrokeredMessageBuilder, ExceptionData, ExceptionResponseMessage,
        FailureKind, MessageId, ProcessingContext, Recipient, ReplyReceived, RoutingContext,
        RoutingError, RoutingInstruction, RoutingOutcome,
    };
    pub use crate::router::{
        DuplexMessageRouterBase, InProcessAppMessageRouter, InProcessMessageRouter,
        MessageRouterBase, RouterCore,
    };
    pub use crate::traits::{
        downcast_content, CourierMessage, DefaultMessageBuilderFactory, FnProcessor,
        MessageBuilderFactory, MessageContent, MessageProcessor, MessageRouter,
    };
}
