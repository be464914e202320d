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

use crate::message::{BrokeredMessage, BrokeredMessageBuilder, RoutingContext};

/// Produces message builders for a routing context.
///
/// Routers use it to build reply envelopes, so a host can decide which metadata
/// (sender endpoint, recipients) a reply carries.
pub trait MessageBuilderFactory: Send + Sync + Debug {
    /// Returns a builder seeded from `context`.
    fn create(&self, context: &RoutingContext) -> BrokeredMessageBuilder;
}

/// Fills the sender endpoint from the context's application identity, if any.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessageBuilderFactory;

impl MessageBuilderFactory for DefaultMessageBuilderFactory {
    fn create(&self, context: &RoutingContext) -> BrokeredMessageBuilder {
        let builder = BrokeredMessage::builder();
        match context.identity() {
            Some(identity) => builder.sender(identity.as_recipient()),
            None => builder,
        }
    }
}
