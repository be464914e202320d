//! Shared infrastructure for the routing layer.
//!
//! # Key Components
//!
//! *   [`CourierConfig`]: configuration loaded from XDG locations, exposed as [`CONFIG`].
//! *   [`AppIdentity`] and [`AppIdentityProvider`]: who the local application instance is.
//! *   [`EventHandlers`]: multicast async notification with isolated handler failures.
//! *   [`MessageQueue`] and [`ChannelRegistry`]: named in-process channels.
//! *   [`ReplyCorrelator`]: awaits replies that arrive as notifications.

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

pub use channel_registry::ChannelRegistry;
pub use config::{CourierConfig, IdentityConfig, RoutingConfig, CONFIG};
pub use event_handlers::{EventHandler, EventHandlers, HandlerFuture, SubscriptionId};
pub use identity::{AppIdentity, AppIdentityProvider};
pub use message_queue::MessageQueue;
pub use reply_correlator::ReplyCorrelator;

mod channel_registry;
mod config;
mod event_handlers;
mod identity;
mod message_queue;
mod reply_correlator;
