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
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::message::ProcessingContext;
use crate::traits::MessageContent;

/// Executes application-level handling for one brokered message.
///
/// Routers call this when a message arrives for the local node. The returned content
/// becomes the reply payload of a two-way message; for one-way messages it is
/// discarded. Errors are converted by the router into an exception-carrying reply.
#[async_trait]
pub trait MessageProcessor: Send + Sync + Debug {
    /// Handles `content`, with the routing context and the brokered envelope available
    /// through `context`.
    async fn process(
        &self,
        content: MessageContent,
        context: ProcessingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent>;
}

/// Adapts an async closure into a [`MessageProcessor`].
///
/// ```rust,ignore
/// let processor = FnProcessor::new("echo", |content, _context, _token| async move {
///     Ok(content)
/// });
/// ```
pub struct FnProcessor<F> {
    name: String,
    handler: F,
}

impl<F> FnProcessor<F> {
    /// Wraps `handler` under a name used in logs.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> Debug for FnProcessor<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> MessageProcessor for FnProcessor<F>
where
    F: Fn(MessageContent, ProcessingContext, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<MessageContent>> + Send,
{
    async fn process(
        &self,
        content: MessageContent,
        context: ProcessingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        (self.handler)(content, context, cancellation_token).await
    }
}
