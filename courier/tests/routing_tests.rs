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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tracing::*;

use courier::prelude::*;
use courier_test::prelude::*;

use crate::setup::*;

mod setup;

tokio::task_local! {
    static DISPATCHING: u32;
}

fn in_process(processor: Arc<dyn MessageProcessor>) -> InProcessMessageRouter {
    InProcessMessageRouter::new(processor)
}

#[courier_test]
async fn two_way_dispatch_returns_processor_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let processor = Arc::new(PongProcessor::default());
    let router = in_process(processor.clone());

    let outcome = router
        .dispatch(
            BrokeredMessage::new(Ping { sequence: 7 }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.instruction(), RoutingInstruction::Reply);
    let pong = outcome.reply_as::<Pong>().expect("reply should be a Pong");
    assert_eq!(pong.sequence, 7);
    assert_eq!(processor.calls(), 1);
    Ok(())
}

#[courier_test]
async fn handler_failure_becomes_exception_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(FailingProcessor::new("boom")));

    let outcome = router
        .dispatch(
            BrokeredMessage::new(Notice {
                text: "M3".to_string(),
            }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.instruction(), RoutingInstruction::Reply);
    let exception = outcome
        .reply_as::<ExceptionResponseMessage>()
        .expect("failure should be carried as exception data");
    assert_eq!(exception.exception.message, "boom");
    assert_eq!(exception.exception.kind, FailureKind::Handler);
    Ok(())
}

#[courier_test]
async fn unsupported_payload_still_yields_a_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(PongProcessor::default()));

    let outcome = router
        .dispatch(
            BrokeredMessage::new(Unsupported),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    let exception = outcome
        .reply_as::<ExceptionResponseMessage>()
        .expect("a two-way message always yields reply content");
    assert!(exception.exception.message.contains("unsupported payload"));
    Ok(())
}

#[courier_test]
async fn route_output_rejects_requests() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(PongProcessor::default()));
    let request = BrokeredMessage::new(Ping { sequence: 1 });
    let request_id = request.id().clone();

    let error = router
        .route_output(request, RoutingContext::default(), CancellationToken::new())
        .await
        .expect_err("a request on the output side is a protocol violation");

    match error.downcast_ref::<RoutingError>() {
        Some(RoutingError::UnexpectedMessage { message_id, router }) => {
            assert_eq!(message_id, &request_id);
            assert_eq!(router, InProcessMessageRouter::DEFAULT_NAME);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[courier_test]
async fn reply_is_never_reprocessed() -> anyhow::Result<()> {
    initialize_tracing();
    let processor = Arc::new(PongProcessor::default());
    let router = in_process(processor.clone());

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    router.reply_received().subscribe(move |event: ReplyReceived| {
        let counter = Arc::clone(&counter);
        async move {
            assert!(event.reply().is_reply());
            counter.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok(())
        }
    });

    let request = BrokeredMessage::new(Ping { sequence: 3 });
    let reply = BrokeredMessage::builder()
        .reply_to(&request)
        .content(Pong { sequence: 3 })
        .build();

    let outcome = router
        .route_input(reply, RoutingContext::default(), CancellationToken::new())
        .await;

    assert!(outcome.is_none());
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(processor.calls(), 0);
    Ok(())
}

#[courier_test]
async fn one_way_dispatch_processes_in_background() -> anyhow::Result<()> {
    initialize_tracing();
    let (processor, gate) = GatedProcessor::new();
    let router = in_process(processor.clone());

    let outcome = router
        .dispatch(
            BrokeredMessage::one_way(Notice {
                text: "M2".to_string(),
            }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    assert!(outcome.is_none());
    assert!(outcome.reply_content().is_none());
    assert_eq!(processor.finished(), 0, "dispatch must not wait for processing");

    gate.add_permits(1);
    assert!(eventually(|| processor.finished() == 1).await);
    Ok(())
}

#[courier_test]
async fn processing_runs_off_the_dispatching_task() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(FnProcessor::new(
        "task_probe",
        |_content: MessageContent, _context: ProcessingContext, _token: CancellationToken| async move {
            let inline = DISPATCHING.try_with(|marker| *marker).is_ok();
            anyhow::Ok(Arc::new(inline) as MessageContent)
        },
    )));

    let outcome = DISPATCHING
        .scope(
            1,
            router.dispatch(
                BrokeredMessage::new(Ping { sequence: 1 }),
                RoutingContext::default(),
                CancellationToken::new(),
            ),
        )
        .await?;

    assert_eq!(outcome.reply_as::<bool>(), Some(&false));
    Ok(())
}

#[courier_test]
async fn processing_sees_message_and_context() -> anyhow::Result<()> {
    initialize_tracing();
    let (processor, mut seen) = RecordingProcessor::new();
    let router = in_process(Arc::new(processor));
    let identity = AppIdentity::new("orders", "orders-1");
    let message = BrokeredMessage::builder()
        .content(Ping { sequence: 9 })
        .sender(identity.as_recipient())
        .build();
    let message_id = message.id().clone();

    router
        .dispatch(
            message,
            RoutingContext::application(identity),
            CancellationToken::new(),
        )
        .await?;

    let processed = seen.recv().await.expect("processor should observe the message");
    assert_eq!(processed.id(), &message_id);
    assert_eq!(
        processed.sender().and_then(Recipient::instance_id),
        Some("orders-1")
    );
    Ok(())
}

#[courier_test]
async fn one_way_dispatch_does_not_wait_for_transport() -> anyhow::Result<()> {
    initialize_tracing();
    let (mut transport, mut sent) = ScriptedTransport::new(Arc::new(PongProcessor::default()));
    let gate = Arc::new(Semaphore::new(0));
    transport.gate = Some(Arc::clone(&gate));

    let message = BrokeredMessage::one_way(Notice {
        text: "fire and forget".to_string(),
    });
    let message_id = message.id().clone();
    let outcome = transport
        .dispatch_message(message, RoutingContext::default(), CancellationToken::new())
        .await?;

    assert!(outcome.is_none());
    assert!(sent.try_recv().is_err(), "transport is still blocked");

    gate.add_permits(1);
    let delivered = sent.recv().await.expect("message should reach the transport");
    assert_eq!(delivered.id(), &message_id);
    Ok(())
}

#[courier_test]
async fn transport_failure_becomes_exception_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let (mut transport, _sent) = ScriptedTransport::new(Arc::new(PongProcessor::default()));
    transport.fail_with = Some("connection refused".to_string());

    let outcome = transport
        .dispatch_message(
            BrokeredMessage::new(Ping { sequence: 1 }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.instruction(), RoutingInstruction::Reply);
    let exception = outcome
        .reply_as::<ExceptionResponseMessage>()
        .expect("transport failure should be carried as exception data");
    assert_eq!(exception.exception.kind, FailureKind::Transport);
    assert_eq!(exception.exception.message, "connection refused");
    Ok(())
}

#[courier_test]
async fn one_way_transport_failure_is_swallowed() -> anyhow::Result<()> {
    initialize_tracing();
    let (mut transport, _sent) = ScriptedTransport::new(Arc::new(PongProcessor::default()));
    transport.fail_with = Some("connection refused".to_string());

    let outcome = transport
        .dispatch_message(
            BrokeredMessage::one_way(Notice {
                text: "lost".to_string(),
            }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await?;

    assert!(outcome.is_none());
    Ok(())
}

#[courier_test]
async fn route_input_sends_reply_through_output() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, mut sent) = ScriptedTransport::new(Arc::new(PongProcessor::default()));
    let requester = Recipient::instance("billing", "billing-2");
    let request = BrokeredMessage::builder()
        .content(Ping { sequence: 11 })
        .sender(requester.clone())
        .build();

    let outcome = transport
        .route_input(request.clone(), RoutingContext::default(), CancellationToken::new())
        .await;
    assert!(outcome.is_none(), "the scripted transport reports no synchronous reply");

    let reply = sent.recv().await.expect("reply should be routed out");
    assert_eq!(reply.reply_to_message_id(), Some(request.id()));
    assert_eq!(reply.recipients(), &[requester]);
    assert_eq!(reply.content_as::<Pong>().map(|pong| pong.sequence), Some(11));
    Ok(())
}

#[courier_test]
async fn reply_routing_failure_is_logged_not_raised() -> anyhow::Result<()> {
    initialize_tracing();
    let (mut transport, _sent) = ScriptedTransport::new(Arc::new(PongProcessor::default()));
    transport.fail_with = Some("output closed".to_string());

    let outcome = transport
        .route_input(
            BrokeredMessage::new(Ping { sequence: 2 }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(outcome.is_none());
    Ok(())
}

#[courier_test]
async fn rejects_messages_without_id() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(PongProcessor::default()));
    let message = BrokeredMessage::builder()
        .id("")
        .content(Ping { sequence: 1 })
        .build();

    let result = router
        .dispatch(message, RoutingContext::default(), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(RoutingError::InvalidArgument(_))));
    Ok(())
}

#[courier_test]
async fn dispose_is_idempotent_and_final() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(PongProcessor::default()));
    router.dispose().await;
    router.dispose().await;

    let result = router
        .dispatch(
            BrokeredMessage::new(Ping { sequence: 1 }),
            RoutingContext::default(),
            CancellationToken::new(),
        )
        .await;
    match result {
        Err(RoutingError::Disposed(name)) => info!(router = %name, "dispatch rejected after dispose"),
        other => panic!("expected a disposed error, got {other:?}"),
    }
    Ok(())
}

/// Answers `true` when the token it was handed fires within two seconds.
async fn await_cancellation(
    _content: MessageContent,
    _context: ProcessingContext,
    token: CancellationToken,
) -> anyhow::Result<MessageContent> {
    let cancelled = tokio::time::timeout(Duration::from_secs(2), token.cancelled())
        .await
        .is_ok();
    Ok(Arc::new(cancelled) as MessageContent)
}

#[courier_test]
async fn two_way_processing_observes_caller_cancellation() -> anyhow::Result<()> {
    initialize_tracing();
    let router = in_process(Arc::new(FnProcessor::new("cancellation_watch", await_cancellation)));

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let outcome = router
        .dispatch(
            BrokeredMessage::new(Ping { sequence: 1 }),
            RoutingContext::default(),
            token,
        )
        .await?;

    assert_eq!(outcome.reply_as::<bool>(), Some(&true));
    Ok(())
}

#[courier_test]
async fn one_way_processing_gets_a_fresh_token() -> anyhow::Result<()> {
    initialize_tracing();
    let (tx, mut observed) = mpsc::unbounded_channel();
    let router = in_process(Arc::new(FnProcessor::new(
        "token_state",
        move |_content: MessageContent, _context: ProcessingContext, token: CancellationToken| {
            let tx = tx.clone();
            async move {
                tx.send(token.is_cancelled())?;
                anyhow::Ok(Arc::new(()) as MessageContent)
            }
        },
    )));

    let token = CancellationToken::new();
    token.cancel();
    router
        .dispatch(
            BrokeredMessage::one_way(Ping { sequence: 1 }),
            RoutingContext::default(),
            token,
        )
        .await?;

    let cancelled = tokio::time::timeout(Duration::from_secs(2), observed.recv())
        .await?
        .expect("one-way processing should run");
    assert!(!cancelled, "detached work does not inherit the caller's token");
    Ok(())
}
