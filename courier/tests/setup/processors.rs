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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, Semaphore};

use courier::prelude::*;

use crate::setup::{Ping, Pong};

/// Answers `Ping` with `Pong` and `String` with `"pong"`; rejects everything else.
#[derive(Debug, Default)]
pub struct PongProcessor {
    calls: AtomicUsize,
}

impl PongProcessor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProcessor for PongProcessor {
    async fn process(
        &self,
        content: MessageContent,
        _context: ProcessingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ping) = downcast_content::<Ping>(&content) {
            return Ok(Arc::new(Pong {
                sequence: ping.sequence,
            }));
        }
        if downcast_content::<String>(&content).is_some() {
            return Ok(Arc::new("pong".to_string()));
        }
        Err(anyhow!("unsupported payload: {content:?}"))
    }
}

/// Reports every processed message on a channel and answers with `()`.
#[derive(Debug)]
pub struct RecordingProcessor {
    seen: mpsc::UnboundedSender<BrokeredMessage>,
}

impl RecordingProcessor {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BrokeredMessage>) {
        let (seen, rx) = mpsc::unbounded_channel();
        (Self { seen }, rx)
    }
}

#[async_trait]
impl MessageProcessor for RecordingProcessor {
    async fn process(
        &self,
        _content: MessageContent,
        context: ProcessingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        let _ = self.seen.send(context.brokered_message().clone());
        Ok(Arc::new(()))
    }
}

/// Fails every message with `message`.
#[derive(Debug)]
pub struct FailingProcessor {
    pub message: String,
}

impl FailingProcessor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl MessageProcessor for FailingProcessor {
    async fn process(
        &self,
        _content: MessageContent,
        _context: ProcessingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        Err(anyhow!("{}", self.message))
    }
}

/// Holds every message until a permit is released, then reports completion.
#[derive(Debug)]
pub struct GatedProcessor {
    gate: Arc<Semaphore>,
    finished: AtomicUsize,
}

impl GatedProcessor {
    pub fn new() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Arc::new(Self {
                gate: Arc::clone(&gate),
                finished: AtomicUsize::new(0),
            }),
            gate,
        )
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProcessor for GatedProcessor {
    async fn process(
        &self,
        content: MessageContent,
        _context: ProcessingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        let permit = self.gate.acquire().await?;
        permit.forget();
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(content)
    }
}

/// Waits until `condition` holds, polling for up to two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}
