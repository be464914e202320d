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

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::common::{
    AppIdentity, AppIdentityProvider, ChannelRegistry, EventHandlers, MessageQueue, RoutingConfig,
    SubscriptionId, CONFIG,
};
use crate::message::{
    BrokeredMessage, Recipient, ReplyReceived, RoutingContext, RoutingError, RoutingOutcome,
};
use crate::router::{DuplexMessageRouterBase, MessageRouterBase, RouterCore};
use crate::traits::{MessageContent, MessageProcessor, MessageRouter};

/// Duplex router for applications that share a process and exchange messages over
/// named in-process channels.
///
/// On construction it subscribes to three channels of the shared [`ChannelRegistry`]:
/// the root channel, `root:<app id>` and `root:<instance id>`. Outgoing messages are
/// published to the channel of each recipient; messages without recipients go to the
/// root channel. Arriving messages (including replies to this instance's requests) go
/// through input routing.
#[derive(Debug, Clone)]
pub struct InProcessAppMessageRouter {
    inner: Arc<AppRouterInner>,
}

#[derive(Debug)]
struct AppRouterInner {
    core: Arc<RouterCore>,
    registry: Arc<ChannelRegistry>,
    routing: RoutingConfig,
    identity: AppIdentity,
    context: RoutingContext,
    root: Arc<MessageQueue>,
    listened: Vec<Arc<MessageQueue>>,
    subscriptions: Mutex<Vec<(Arc<MessageQueue>, SubscriptionId)>>,
}

impl AppRouterInner {
    fn unsubscribe_all(&self) -> usize {
        let subscriptions: Vec<_> = self.subscriptions.lock().drain(..).collect();
        for (channel, id) in &subscriptions {
            channel.unsubscribe(*id);
        }
        subscriptions.len()
    }
}

impl Drop for AppRouterInner {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl InProcessAppMessageRouter {
    /// Router name used when none is given.
    pub const DEFAULT_NAME: &'static str = "in_process_app";

    /// Creates a router for the identity supplied by `identity_provider`, using the
    /// channel naming of the global configuration.
    pub fn new(
        registry: Arc<ChannelRegistry>,
        identity_provider: &dyn AppIdentityProvider,
        processor: Arc<dyn MessageProcessor>,
    ) -> Self {
        Self::with_config(
            RouterCore::new(Self::DEFAULT_NAME, processor),
            registry,
            identity_provider.identity(),
            CONFIG.routing.clone(),
        )
    }

    /// Creates a router from a preconfigured core and explicit channel naming, and
    /// subscribes it to its channels.
    #[instrument(skip(core, registry), fields(router = %core.name()))]
    pub fn with_config(
        core: RouterCore,
        registry: Arc<ChannelRegistry>,
        identity: AppIdentity,
        routing: RoutingConfig,
    ) -> Self {
        let root = registry.channel(&routing.root_channel);
        let mut listened: Vec<Arc<MessageQueue>> = Vec::with_capacity(3);
        for name in [
            routing.root_channel.clone(),
            routing.scoped_channel(identity.app_id()),
            routing.scoped_channel(identity.instance_id()),
        ] {
            if listened.iter().all(|channel| channel.name() != name) {
                listened.push(registry.channel(&name));
            }
        }

        let inner = Arc::new(AppRouterInner {
            context: RoutingContext::application(identity.clone()),
            core: Arc::new(core),
            registry,
            routing,
            identity,
            root,
            listened,
            subscriptions: Mutex::new(Vec::new()),
        });
        Self::listen(&inner);
        debug!(channels = ?inner.listened.iter().map(|c| c.name()).collect::<Vec<_>>(), "Listening on channels");
        Self { inner }
    }

    fn listen(inner: &Arc<AppRouterInner>) {
        let mut subscriptions = inner.subscriptions.lock();
        for channel in &inner.listened {
            // Weak so the channels never keep a forgotten router alive.
            let router: Weak<AppRouterInner> = Arc::downgrade(inner);
            let id = channel.subscribe(move |message: BrokeredMessage| {
                let router = router.upgrade().map(|inner| Self { inner });
                async move {
                    if let Some(router) = router {
                        router.on_message_arrived(message).await;
                    }
                    anyhow::Ok(())
                }
            });
            subscriptions.push((Arc::clone(channel), id));
        }
    }

    async fn on_message_arrived(&self, message: BrokeredMessage) {
        trace!(router = %self.inner.core.name(), message_id = %message.id(), "Message arrived");
        let context = self.inner.context.clone();
        self.receive_input(message, context).await;
    }

    /// The identity this router listens for.
    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.inner.identity
    }

    /// The routing context handed to processing of arriving messages.
    #[must_use]
    pub fn context(&self) -> &RoutingContext {
        &self.inner.context
    }

    /// Names of the channels this router listens on: root, application, instance.
    #[must_use]
    pub fn listened_channels(&self) -> Vec<String> {
        self.inner
            .listened
            .iter()
            .map(|channel| channel.name().to_string())
            .collect()
    }

    /// Channel a message for `recipient` is published to.
    ///
    /// The instance channel when the recipient names an instance, otherwise the
    /// application channel, otherwise the root channel.
    #[must_use]
    pub fn channel_for(&self, recipient: &Recipient) -> String {
        channel_for(&self.inner.routing, recipient)
    }

    /// Number of live channel subscriptions held by this router.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }
}

fn channel_for(routing: &RoutingConfig, recipient: &Recipient) -> String {
    match (recipient.instance_id(), recipient.app_id()) {
        (Some(instance_id), _) => routing.scoped_channel(instance_id),
        (None, Some(app_id)) => routing.scoped_channel(app_id),
        (None, None) => routing.root_channel.clone(),
    }
}

/// Groups `recipients` by target channel, keeping first-seen channel order.
fn group_by_channel(routing: &RoutingConfig, recipients: &[Recipient]) -> Vec<(String, Vec<Recipient>)> {
    let mut groups: Vec<(String, Vec<Recipient>)> = Vec::new();
    for recipient in recipients {
        let name = channel_for(routing, recipient);
        match groups.iter_mut().find(|(channel, _)| *channel == name) {
            Some((_, members)) => members.push(recipient.clone()),
            None => groups.push((name, vec![recipient.clone()])),
        }
    }
    groups
}

#[async_trait]
impl MessageRouterBase for InProcessAppMessageRouter {
    fn core(&self) -> &RouterCore {
        &self.inner.core
    }

    async fn route_output(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<RoutingOutcome> {
        self.route_output_duplex(message, context, cancellation_token)
            .await
    }

    /// Runs processing on a separately scheduled task so channel delivery never drives
    /// the processor inline.
    async fn process(
        &self,
        message: &BrokeredMessage,
        context: &RoutingContext,
        cancellation_token: CancellationToken,
    ) -> anyhow::Result<MessageContent> {
        RouterCore::process_queued(
            Arc::clone(&self.inner.core),
            message.clone(),
            context.clone(),
            cancellation_token,
        )
        .await
    }
}

#[async_trait]
impl DuplexMessageRouterBase for InProcessAppMessageRouter {
    async fn send_output(
        &self,
        message: BrokeredMessage,
        _context: RoutingContext,
        _cancellation_token: CancellationToken,
    ) -> anyhow::Result<()> {
        if message.recipients().is_empty() {
            trace!(message_id = %message.id(), channel = %self.inner.root.name(), "Publishing to the root channel");
            self.inner.root.publish(message)?;
            return Ok(());
        }

        let mut groups = group_by_channel(&self.inner.routing, message.recipients());
        if groups.len() == 1 {
            if let Some((name, _)) = groups.pop() {
                trace!(message_id = %message.id(), channel = %name, "Publishing");
                self.inner.registry.channel(&name).publish(message)?;
            }
            return Ok(());
        }

        for (name, recipients) in groups {
            trace!(message_id = %message.id(), channel = %name, recipients = recipients.len(), "Publishing narrowed copy");
            self.inner
                .registry
                .channel(&name)
                .publish(message.with_recipients(recipients))?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRouter for InProcessAppMessageRouter {
    fn name(&self) -> &str {
        self.inner.core.name()
    }

    async fn dispatch(
        &self,
        message: BrokeredMessage,
        context: RoutingContext,
        cancellation_token: CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        self.dispatch_duplex(message, context, cancellation_token)
            .await
    }

    fn reply_received(&self) -> &EventHandlers<ReplyReceived> {
        self.inner.core.reply_received()
    }

    async fn dispose(&self) {
        if self.inner.core.mark_disposed() {
            let released = self.inner.unsubscribe_all();
            debug!(router = %self.inner.core.name(), released, "Router disposed");
        }
    }
}
