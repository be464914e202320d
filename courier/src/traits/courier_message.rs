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
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use dyn_clone::DynClone;

/// A marker trait for payloads carried inside a [`BrokeredMessage`](crate::message::BrokeredMessage).
///
/// The trait combines `Any`, `Send`, `Sync` and `Debug` with [`DynClone`] so that
/// payloads can cross task boundaries, be cloned as trait objects, and be downcast back
/// to their concrete type by the message processor that handles them.
///
/// A blanket implementation covers every qualifying type; payload structs usually only
/// need `#[courier_message]` (or `#[derive(Clone, Debug)]`).
pub trait CourierMessage: DynClone + Any + Send + Sync + Debug {
    /// Returns the payload as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the payload as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

dyn_clone::clone_trait_object!(CourierMessage);

impl<T> CourierMessage for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Shared, type-erased payload of a brokered message.
pub type MessageContent = Arc<dyn CourierMessage>;

/// Downcasts shared message content to a concrete payload type.
///
/// Goes through the trait object explicitly; calling `as_any` on the `Arc` itself would
/// resolve to the blanket implementation for `Arc<dyn CourierMessage>`.
#[must_use]
pub fn downcast_content<T: 'static>(content: &MessageContent) -> Option<&T> {
    let message: &dyn CourierMessage = content.as_ref();
    message.as_any().downcast_ref::<T>()
}
