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

use crate::common::AppIdentity;
use crate::message::BrokeredMessage;

/// Ambient data that travels alongside a message through a router.
///
/// A context created with [`RoutingContext::application`] identifies the local
/// application instance; it is the process-wide context routers use for messages
/// arriving from a transport. [`RoutingContext::detached`] carries no identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingContext {
    identity: Option<AppIdentity>,
}

impl RoutingContext {
    /// Context bound to the local application instance.
    #[must_use]
    pub const fn application(identity: AppIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Context without an application identity.
    #[must_use]
    pub const fn detached() -> Self {
        Self { identity: None }
    }

    /// The application identity, if bound.
    #[must_use]
    pub const fn identity(&self) -> Option<&AppIdentity> {
        self.identity.as_ref()
    }
}

/// What a [`MessageProcessor`](crate::traits::MessageProcessor) sees besides the payload:
/// the routing context merged with the brokered envelope being processed.
#[derive(Clone, Debug, new)]
pub struct ProcessingContext {
    routing: RoutingContext,
    message: BrokeredMessage,
}

impl ProcessingContext {
    /// The routing context the message was received with.
    #[must_use]
    pub const fn routing(&self) -> &RoutingContext {
        &self.routing
    }

    /// The brokered envelope being processed.
    #[must_use]
    pub const fn brokered_message(&self) -> &BrokeredMessage {
        &self.message
    }

    /// Shortcut for the local application identity.
    #[must_use]
    pub const fn identity(&self) -> Option<&AppIdentity> {
        self.routing.identity()
    }
}
