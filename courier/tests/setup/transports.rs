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
#![allow(unused)]

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, Semaphore};

use courier::prelude::*;

/// Router whose output side is a channel the test controls.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    pub core: Arc<RouterCore>,
    pub sent: mpsc::UnboundedSender<BrokeredMessage>,
    pub gate: Option<Arc<Semaphore>>,
    pub fail_with: Option<String>,
}

impl ScriptedTransport {
    pub fn new(processor: Arc<dyn MessageProcessor>) -> (Self, mpsc::UnboundedReceiver<BrokeredMessage>) {
        let (sent, rx) = mpsc::unbounded_channel();
        (
            Self {
                core: Arc::new(RouterCore::new("scripted", processor)),
                sent,
                gate: None,
                fail_with: None,
            },
            rx,
        )
    }
}

#[async_trait]
impl MessageRouterBase for ScriptedTransport {
    fn core(&self) -> &RouterCore {
        &self.core
    }

    async fn route_output(
        &self,
        message: BrokeredMessage,
        _context: RoutingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<RoutingOutcome> {
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        if let Some(reason) = &self.fail_with {
            return Err(anyhow!("{reason}"));
        }
        self.sent.send(message)?;
        Ok(RoutingOutcome::none())
    }
}
