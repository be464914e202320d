//! Core traits of the routing layer.
//!
//! *   [`CourierMessage`]: marker trait for payloads, with downcasting support.
//! *   [`MessageProcessor`]: local message handling, consumed by routers.
//! *   [`MessageRouter`]: the contract every router exposes.
//! *   [`MessageBuilderFactory`]: builds reply envelopes for a routing context.

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

pub use courier_message::{downcast_content, CourierMessage, MessageContent};
pub use message_builder::{DefaultMessageBuilderFactory, MessageBuilderFactory};
pub use message_processor::{FnProcessor, MessageProcessor};
pub use message_router::MessageRouter;

mod courier_message;
mod message_builder;
mod message_processor;
mod message_router;
