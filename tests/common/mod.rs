//! Shared test utilities

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use frontdesk::audio::AudioSink;
use frontdesk::session::events::{ClientEvent, ServerEvent};
use frontdesk::session::{Summarize, Summary};
use frontdesk::usage::{RateTable, SessionTotals, UsageLedger};
use frontdesk::{Error, Result, SessionOptions, SessionOrchestrator};

/// What the orchestrator asked the speaker to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Begin,
    Enqueue(usize),
    Cancel,
}

/// Speaker double that records calls instead of touching hardware
#[derive(Default)]
pub struct TestSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl TestSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == SinkCall::Cancel)
            .count()
    }

    pub fn enqueued_samples(&self) -> usize {
        self.calls()
            .iter()
            .map(|c| match c {
                SinkCall::Enqueue(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

impl AudioSink for TestSink {
    fn begin_response(&self) {
        self.calls.lock().unwrap().push(SinkCall::Begin);
    }

    fn enqueue(&self, samples: Vec<i16>) {
        self.calls
            .lock()
            .unwrap()
            .push(SinkCall::Enqueue(samples.len()));
    }

    fn cancel_current(&self) {
        self.calls.lock().unwrap().push(SinkCall::Cancel);
    }
}

/// Summarizer double: scripted to succeed or fail, records every
/// conversation it was asked to condense
pub struct StubSummarizer {
    pub succeed: bool,
    pub calls: AtomicU64,
    pub conversations: Mutex<Vec<String>>,
}

impl StubSummarizer {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: AtomicU64::new(0),
            conversations: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: AtomicU64::new(0),
            conversations: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_conversation(&self) -> Option<String> {
        self.conversations.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Summarize for StubSummarizer {
    async fn summarize(&self, conversation: &str) -> Result<Summary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.conversations
            .lock()
            .unwrap()
            .push(conversation.to_string());

        if self.succeed {
            Ok(Summary {
                text: "condensed history".to_string(),
                model: "gpt-4o-mini".to_string(),
                input_tokens: 120,
                output_tokens: 40,
            })
        } else {
            Err(Error::Summarization("stubbed failure".to_string()))
        }
    }
}

/// A running orchestrator plus both ends of its plumbing
pub struct Harness {
    /// Client events the orchestrator sent
    pub from_session: mpsc::Receiver<ClientEvent>,
    /// Feed server events into the orchestrator; `None` once closed
    to_session: Option<mpsc::Sender<ServerEvent>>,
    pub sink: Arc<TestSink>,
    pub summarizer: Arc<StubSummarizer>,
    pub ledger_dir: tempfile::TempDir,
    pub shutdown: watch::Sender<bool>,
    session: Option<JoinHandle<Result<SessionTotals>>>,
}

impl Harness {
    /// Spawn an orchestrator with the given turn threshold and summarizer
    pub fn spawn(summarize_after_turns: u32, summarizer: StubSummarizer) -> Self {
        let options = SessionOptions {
            realtime_model: "gpt-4o-realtime-preview-2024-12-17".to_string(),
            voice: "coral".to_string(),
            instructions: "test instructions".to_string(),
            summarize_after_turns,
            finalize_timeout: Duration::from_secs(5),
            verbose: false,
        };

        let (out_tx, out_rx) = mpsc::channel(64);
        let (in_tx, in_rx) = mpsc::channel(64);
        let sink = Arc::new(TestSink::default());
        let summarizer = Arc::new(summarizer);
        let ledger_dir = tempfile::tempdir().expect("tempdir");
        let ledger = UsageLedger::new(ledger_dir.path()).expect("ledger");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let orchestrator = SessionOrchestrator::new(
            options,
            out_tx,
            in_rx,
            Arc::clone(&sink) as Arc<dyn AudioSink>,
            Arc::new(AtomicU64::new(0)),
            Arc::clone(&summarizer) as Arc<dyn Summarize>,
            ledger,
            RateTable::builtin(),
        );

        let session = tokio::spawn(orchestrator.run(shutdown_rx));

        Self {
            from_session: out_rx,
            to_session: Some(in_tx),
            sink,
            summarizer,
            ledger_dir,
            shutdown: shutdown_tx,
            session: Some(session),
        }
    }

    /// Next client event, with a hang guard
    pub async fn next_client_event(&mut self) -> ClientEvent {
        tokio::time::timeout(Duration::from_secs(5), self.from_session.recv())
            .await
            .expect("timed out waiting for client event")
            .expect("session closed its outbound channel")
    }

    /// Feed one server event to the session
    pub async fn feed(&self, event: ServerEvent) {
        self.to_session
            .as_ref()
            .expect("transport already closed")
            .send(event)
            .await
            .expect("session dropped inbound channel");
    }

    /// Close the transport and collect the finalized totals
    pub async fn finish(&mut self) -> SessionTotals {
        drop(self.to_session.take());
        self.wait().await
    }

    /// Collect the finalized totals without closing the transport
    /// (for shutdown-signal tests)
    pub async fn wait(&mut self) -> SessionTotals {
        let session = self.session.take().expect("session already collected");
        tokio::time::timeout(Duration::from_secs(5), session)
            .await
            .expect("session did not stop")
            .expect("session task panicked")
            .expect("session returned error")
    }
}

/// Drain the initial `session.update` every session sends on start
pub async fn expect_session_update(harness: &mut Harness) {
    let event = harness.next_client_event().await;
    assert!(
        matches!(event, ClientEvent::SessionUpdate { .. }),
        "expected session.update first, got {event:?}"
    );
}

/// A `response.done` carrying a text-token usage report
pub fn response_done(input_text: u64, output_text: u64) -> ServerEvent {
    use frontdesk::session::events::{ResponseSummary, ResponseUsage, TokenDetails};

    ServerEvent::ResponseDone {
        response: ResponseSummary {
            usage: Some(ResponseUsage {
                input_tokens: input_text,
                output_tokens: output_text,
                input_token_details: Some(TokenDetails {
                    text_tokens: input_text,
                    audio_tokens: 0,
                }),
                output_token_details: Some(TokenDetails {
                    text_tokens: output_text,
                    audio_tokens: 0,
                }),
            }),
        },
    }
}

/// Run one user/AI exchange through the session so history accumulates
pub async fn complete_turn(harness: &Harness, user_text: &str, ai_text: &str) {
    harness
        .feed(ServerEvent::InputTranscriptCompleted {
            transcript: user_text.to_string(),
        })
        .await;
    harness
        .feed(ServerEvent::TranscriptDelta {
            delta: ai_text.to_string(),
            item_id: Some("item".to_string()),
        })
        .await;
    harness
        .feed(ServerEvent::TranscriptDone {
            item_id: Some("item".to_string()),
        })
        .await;
    harness.feed(response_done(25, 10)).await;
}
