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

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use mti::prelude::*;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::trace;

use crate::message::Recipient;
use crate::traits::{downcast_content, CourierMessage, MessageContent};

/// Opaque identifier of a brokered message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a new time-ordered id (`msg_<uuid v7>`).
    #[must_use]
    pub fn generate() -> Self {
        Self("msg".create_type_id::<V7>().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for an id with no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The routable envelope: an application payload plus routing metadata.
///
/// The payload is shared behind an `Arc`, so cloning a message (for example when a
/// router splits it per recipient group) never copies the content. The reply
/// correlation fields stay mutable through [`set_reply_to`](Self::set_reply_to) and
/// [`set_one_way`](Self::set_one_way).
#[derive(Clone, Debug)]
pub struct BrokeredMessage {
    id: MessageId,
    content: MessageContent,
    reply_to_message_id: Option<MessageId>,
    is_one_way: bool,
    recipients: Vec<Recipient>,
    sender: Option<Recipient>,
}

assert_impl_all!(BrokeredMessage: Send, Sync);

impl BrokeredMessage {
    /// Creates a two-way request with a fresh id and no explicit recipients.
    pub fn new(content: impl CourierMessage) -> Self {
        Self::builder().content(content).build()
    }

    /// Creates a one-way message with a fresh id and no explicit recipients.
    pub fn one_way(content: impl CourierMessage) -> Self {
        Self::builder().content(content).one_way(true).build()
    }

    /// Starts building a message.
    #[must_use]
    pub fn builder() -> BrokeredMessageBuilder {
        BrokeredMessageBuilder::default()
    }

    /// The message id.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// The shared payload.
    #[must_use]
    pub const fn content(&self) -> &MessageContent {
        &self.content
    }

    /// Downcasts the payload to `T`.
    #[must_use]
    pub fn content_as<T: 'static>(&self) -> Option<&T> {
        downcast_content::<T>(&self.content)
    }

    /// Id of the request this message answers, if it is a reply.
    #[must_use]
    pub const fn reply_to_message_id(&self) -> Option<&MessageId> {
        self.reply_to_message_id.as_ref()
    }

    /// `true` when this message answers an earlier request.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        self.reply_to_message_id.is_some()
    }

    /// `true` when no reply is expected.
    #[must_use]
    pub const fn is_one_way(&self) -> bool {
        self.is_one_way
    }

    /// Explicit recipients, in the order they were added. Empty means broadcast.
    #[must_use]
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// The endpoint that created this message, when known.
    #[must_use]
    pub const fn sender(&self) -> Option<&Recipient> {
        self.sender.as_ref()
    }

    /// Marks this message as a reply to `request_id`.
    pub fn set_reply_to(&mut self, request_id: MessageId) {
        self.reply_to_message_id = Some(request_id);
    }

    /// Changes the one-way flag.
    pub fn set_one_way(&mut self, is_one_way: bool) {
        self.is_one_way = is_one_way;
    }

    /// Returns a copy of this message (same id and content) addressed to `recipients` only.
    #[must_use]
    pub fn with_recipients(&self, recipients: Vec<Recipient>) -> Self {
        Self {
            recipients,
            ..self.clone()
        }
    }
}

/// Builder for [`BrokeredMessage`].
///
/// A message built without content carries the unit payload `()`.
#[derive(Debug, Default)]
pub struct BrokeredMessageBuilder {
    id: Option<MessageId>,
    content: Option<MessageContent>,
    reply_to_message_id: Option<MessageId>,
    is_one_way: bool,
    recipients: Vec<Recipient>,
    sender: Option<Recipient>,
}

impl BrokeredMessageBuilder {
    /// Uses a caller-supplied id instead of a generated one.
    #[must_use]
    pub fn id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn content(mut self, content: impl CourierMessage) -> Self {
        self.content = Some(Arc::new(content));
        self
    }

    /// Sets an already shared payload without wrapping it again.
    #[must_use]
    pub fn shared_content(mut self, content: MessageContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Marks the message as a reply to `request` and addresses it to the request's sender.
    #[must_use]
    pub fn reply_to(mut self, request: &BrokeredMessage) -> Self {
        self.reply_to_message_id = Some(request.id().clone());
        if let Some(origin) = request.sender() {
            self = self.recipient(origin.clone());
        }
        self
    }

    /// Sets the one-way flag.
    #[must_use]
    pub fn one_way(mut self, is_one_way: bool) -> Self {
        self.is_one_way = is_one_way;
        self
    }

    /// Adds a recipient; duplicates are ignored.
    #[must_use]
    pub fn recipient(mut self, recipient: Recipient) -> Self {
        if !self.recipients.contains(&recipient) {
            self.recipients.push(recipient);
        }
        self
    }

    /// Adds several recipients, keeping the first occurrence of duplicates.
    #[must_use]
    pub fn recipients(self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        recipients
            .into_iter()
            .fold(self, |builder, recipient| builder.recipient(recipient))
    }

    /// Records the endpoint creating the message.
    #[must_use]
    pub fn sender(mut self, sender: Recipient) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Finishes the message.
    #[must_use]
    pub fn build(self) -> BrokeredMessage {
        let message = BrokeredMessage {
            id: self.id.unwrap_or_else(MessageId::generate),
            content: self.content.unwrap_or_else(|| Arc::new(()) as MessageContent),
            reply_to_message_id: self.reply_to_message_id,
            is_one_way: self.is_one_way,
            recipients: self.recipients,
            sender: self.sender,
        };
        trace!(message_id = %message.id, is_reply = message.is_reply(), is_one_way = message.is_one_way, "Built brokered message");
        message
    }
}
