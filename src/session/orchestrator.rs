//! Session orchestrator
//!
//! Owns the lifecycle of one conversation: configures the transport,
//! routes inbound events in arrival order, dispatches tool calls,
//! accumulates usage, condenses history past the turn threshold, and
//! finalizes the usage ledger on close.
//!
//! Inbound events are pulled from a single-consumer queue, so tool
//! results go back to the API in request order. Microphone audio takes a
//! separate path (forwarder task → transport channel) and never waits on
//! event processing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::audio::{self, AudioSink};
use crate::config::{Config, SAMPLE_RATE};
use crate::session::events::{
    ClientEvent, ConversationItem, ResponseUsage, ServerEvent, SessionConfig,
};
use crate::session::summarizer::Summarize;
use crate::tools;
use crate::usage::{
    Direction, Modality, RateTable, SessionTotals, UsageAccumulator, UsageEvent, UsageLedger,
};
use crate::{Error, Result};

/// Lifecycle of one conversation session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Summarizing,
    Closing,
    Closed,
}

/// Per-session knobs, split from [`Config`] so tests can build them
/// without touching the environment
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub realtime_model: String,
    pub voice: String,
    pub instructions: String,
    pub summarize_after_turns: u32,
    pub finalize_timeout: Duration,
    pub verbose: bool,
}

impl SessionOptions {
    /// Derive session options from loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            realtime_model: config.realtime_model.clone(),
            voice: config.voice.clone(),
            instructions: crate::config::SYSTEM_INSTRUCTIONS.to_string(),
            summarize_after_turns: config.summarize_after_turns,
            finalize_timeout: config.finalize_timeout,
            verbose: config.verbose,
        }
    }
}

/// One line of conversation history kept for summarization
#[derive(Debug, Clone)]
struct HistoryEntry {
    role: &'static str,
    text: String,
}

/// Orchestrates a single realtime conversation session
pub struct SessionOrchestrator {
    options: SessionOptions,
    session_id: String,
    outbound: mpsc::Sender<ClientEvent>,
    inbound: mpsc::Receiver<ServerEvent>,
    playback: Arc<dyn AudioSink>,
    /// Mic samples forwarded since the last usage flush; shared with the
    /// capture forwarder task
    mic_samples: Arc<AtomicU64>,
    summarizer: Arc<dyn Summarize>,
    accumulator: UsageAccumulator,
    ledger: UsageLedger,
    state: SessionState,
    history: Vec<HistoryEntry>,
    turns_since_summary: u32,
    /// Partial AI transcripts keyed by item id
    transcripts: HashMap<String, String>,
    /// Output audio samples played since the last usage flush
    response_output_samples: u64,
}

impl SessionOrchestrator {
    /// Create an orchestrator wired to a running transport
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        options: SessionOptions,
        outbound: mpsc::Sender<ClientEvent>,
        inbound: mpsc::Receiver<ServerEvent>,
        playback: Arc<dyn AudioSink>,
        mic_samples: Arc<AtomicU64>,
        summarizer: Arc<dyn Summarize>,
        ledger: UsageLedger,
        rates: RateTable,
    ) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let accumulator = UsageAccumulator::new(session_id.clone(), rates);

        Self {
            options,
            session_id,
            outbound,
            inbound,
            playback,
            mic_samples,
            summarizer,
            accumulator,
            ledger,
            state: SessionState::Idle,
            history: Vec::new(),
            turns_since_summary: 0,
            transcripts: HashMap::new(),
            response_output_samples: 0,
        }
    }

    /// Session identifier (also the usage record key)
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run the session until the transport closes or `shutdown` fires.
    ///
    /// Returns the finalized totals. Persistence failures during close
    /// are logged, not returned; the session still reaches `Closed`.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be configured at all.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<SessionTotals> {
        self.set_state(SessionState::Connecting);

        self.send(ClientEvent::SessionUpdate {
            session: SessionConfig::new(
                &self.options.voice,
                &self.options.instructions,
                tools::schemas(),
            ),
        })
        .await?;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("stop requested");
                        break;
                    }
                }
                maybe_event = self.inbound.recv() => {
                    let Some(event) = maybe_event else {
                        tracing::warn!("transport closed");
                        break;
                    };
                    if let Err(e) = self.handle_event(event).await {
                        tracing::error!(error = %e, "unrecoverable session error");
                        break;
                    }
                }
            }
        }

        Ok(self.close().await)
    }

    /// Route one inbound event. `Err` means the transport is unusable.
    async fn handle_event(&mut self, event: ServerEvent) -> Result<()> {
        match event {
            ServerEvent::SessionCreated => {
                tracing::info!("session established");
            }
            ServerEvent::SessionUpdated => {
                if self.state == SessionState::Connecting {
                    self.set_state(SessionState::Active);
                    println!("Ready! Start speaking into your microphone...");
                }
            }
            ServerEvent::SpeechStarted => {
                // Barge-in: drop buffered audio locally, then tell the
                // API to stop generating. Cooperative, not a hard kill.
                self.playback.cancel_current();
                self.send(ClientEvent::ResponseCancel).await?;
                if self.options.verbose {
                    println!("[interrupted] listening...");
                }
            }
            ServerEvent::SpeechStopped => {
                tracing::debug!("caller finished speaking");
            }
            ServerEvent::ResponseCreated => {
                self.playback.begin_response();
            }
            ServerEvent::AudioDelta { delta, .. } => match audio::decode_frame(&delta) {
                Ok(samples) => {
                    self.response_output_samples += samples.len() as u64;
                    self.playback.enqueue(samples);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable audio delta");
                }
            },
            ServerEvent::TranscriptDelta { delta, item_id } => {
                self.transcripts
                    .entry(item_id.unwrap_or_default())
                    .or_default()
                    .push_str(&delta);
            }
            ServerEvent::TranscriptDone { item_id } => {
                let key = item_id.unwrap_or_default();
                if let Some(text) = self.transcripts.remove(&key) {
                    if !text.is_empty() {
                        println!("AI: {text}");
                        self.history.push(HistoryEntry {
                            role: "assistant",
                            text,
                        });
                    }
                }
            }
            ServerEvent::InputTranscriptCompleted { transcript } => {
                if !transcript.is_empty() {
                    println!("You said: \"{transcript}\"");
                    self.history.push(HistoryEntry {
                        role: "user",
                        text: transcript,
                    });
                }
            }
            ServerEvent::FunctionCallArgumentsDone {
                call_id,
                name,
                arguments,
            } => {
                self.handle_tool_call(&call_id, &name, &arguments).await?;
            }
            ServerEvent::ResponseDone { response } => {
                self.flush_usage(response.usage.as_ref());
                self.turns_since_summary += 1;

                if self.options.verbose {
                    println!("[cost] ${:.4}", self.accumulator.session_cost());
                }

                if self.turns_since_summary >= self.options.summarize_after_turns {
                    self.summarize_history().await;
                }
            }
            ServerEvent::ResponseCancelled => {
                self.playback.cancel_current();
            }
            ServerEvent::Error { error } => {
                if error.is_benign_cancel() {
                    tracing::debug!("cancel with no active response (barge-in race)");
                } else {
                    tracing::error!(
                        code = error.code.as_deref().unwrap_or("unknown"),
                        message = %error.message,
                        "API error"
                    );
                }
            }
            ServerEvent::Other => {}
        }

        Ok(())
    }

    /// Dispatch a tool call and relay the result, preserving request order
    async fn handle_tool_call(&mut self, call_id: &str, name: &str, arguments: &str) -> Result<()> {
        let args: serde_json::Value =
            serde_json::from_str(arguments).unwrap_or(serde_json::Value::Object(Default::default()));

        let reply = tools::dispatch(name, &args);
        if self.options.verbose {
            println!("[tool] {name}({arguments}) -> {}", if reply.is_ok() { "ok" } else { "miss" });
        }
        tracing::debug!(tool = name, ok = reply.is_ok(), "tool dispatched");

        self.send(ClientEvent::ConversationItemCreate {
            item: ConversationItem::FunctionCallOutput {
                call_id: call_id.to_string(),
                output: reply.into_output(),
            },
        })
        .await?;
        self.send(ClientEvent::ResponseCreate).await
    }

    /// Convert one completed response into usage events
    fn flush_usage(&mut self, usage: Option<&ResponseUsage>) {
        let model = self.options.realtime_model.clone();

        let input_secs = samples_to_secs(self.mic_samples.swap(0, Ordering::SeqCst));
        if input_secs > 0 {
            self.accumulator.record(&UsageEvent::now(
                model.clone(),
                Modality::Audio,
                Direction::Input,
                input_secs,
            ));
        }

        let output_secs = samples_to_secs(std::mem::take(&mut self.response_output_samples));
        if output_secs > 0 {
            self.accumulator.record(&UsageEvent::now(
                model.clone(),
                Modality::Audio,
                Direction::Output,
                output_secs,
            ));
        }

        if let Some(usage) = usage {
            self.accumulator.record(&UsageEvent::now(
                model.clone(),
                Modality::Text,
                Direction::Input,
                usage.input_text_tokens(),
            ));
            self.accumulator.record(&UsageEvent::now(
                model,
                Modality::Text,
                Direction::Output,
                usage.output_text_tokens(),
            ));
        }
    }

    /// Condense history via the summarizer model. Failure keeps the full
    /// history; either way the counter resets so the next threshold
    /// crossing retries.
    async fn summarize_history(&mut self) {
        self.turns_since_summary = 0;

        if self.history.is_empty() {
            return;
        }

        self.set_state(SessionState::Summarizing);

        let conversation = self
            .history
            .iter()
            .map(|entry| format!("{}: {}", entry.role, entry.text))
            .collect::<Vec<_>>()
            .join("\n");

        match self.summarizer.summarize(&conversation).await {
            Ok(summary) => {
                self.accumulator.record(&UsageEvent::now(
                    summary.model.clone(),
                    Modality::Text,
                    Direction::Input,
                    summary.input_tokens,
                ));
                self.accumulator.record(&UsageEvent::now(
                    summary.model.clone(),
                    Modality::Text,
                    Direction::Output,
                    summary.output_tokens,
                ));

                let replaced = self.history.len();
                self.history = vec![HistoryEntry {
                    role: "summary",
                    text: summary.text,
                }];
                tracing::info!(replaced, "conversation history condensed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "summarization failed, keeping full history");
            }
        }

        self.set_state(SessionState::Active);
    }

    /// Closing → Closed: freeze totals and finalize the ledger with a
    /// best-effort timeout
    async fn close(mut self) -> SessionTotals {
        self.set_state(SessionState::Closing);
        self.playback.cancel_current();
        self.flush_usage(None);

        let totals = self.accumulator.finish();
        let ledger = self.ledger.clone();
        let for_finalize = totals.clone();

        let finalize = tokio::time::timeout(
            self.options.finalize_timeout,
            tokio::task::spawn_blocking(move || ledger.finalize(&for_finalize)),
        )
        .await;

        match finalize {
            Ok(Ok(outcome)) => {
                tracing::info!(merge = ?outcome.merge, "session finalized");
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "finalize task failed");
            }
            Err(_) => {
                tracing::error!("finalize timed out; usage may be missing from the summary");
            }
        }

        self.state = SessionState::Closed;
        tracing::info!(
            session = %totals.session_id,
            cost = %totals.total_cost(),
            "session closed"
        );
        totals
    }

    fn set_state(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    async fn send(&self, event: ClientEvent) -> Result<()> {
        self.outbound
            .send(event)
            .await
            .map_err(|_| Error::Transport("transport channel closed".to_string()))
    }
}

/// Whole seconds of audio for a sample count, rounding up so short
/// utterances are not billed as zero
const fn samples_to_secs(samples: u64) -> u64 {
    samples.div_ceil(SAMPLE_RATE as u64)
}
