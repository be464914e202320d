//! Router implementations.
//!
//! # Key Components
//!
//! *   [`RouterCore`]: shared state of every router (processor, reply builder,
//!     reply-received subscription point, disposed flag).
//! *   [`MessageRouterBase`]: request/reply orchestration on top of an abstract
//!     output routing step.
//! *   [`DuplexMessageRouterBase`]: variant for transports whose replies arrive
//!     asynchronously on a separate input side.
//! *   [`InProcessMessageRouter`]: transport-less router processing everything locally.
//! *   [`InProcessAppMessageRouter`]: duplex router over named in-process channels.

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

pub use duplex_message_router_base::DuplexMessageRouterBase;
pub use in_process_app_message_router::InProcessAppMessageRouter;
pub use in_process_message_router::InProcessMessageRouter;
pub use message_router_base::MessageRouterBase;
pub use router_core::RouterCore;

mod duplex_message_router_base;
mod in_process_app_message_router;
mod in_process_message_router;
mod message_router_base;
mod router_core;
