//! Conversation session layer
//!
//! Wire events, the WebSocket transport driver, history summarization,
//! and the orchestrator that ties them to usage accounting and tools.

pub mod events;
mod orchestrator;
mod summarizer;
mod transport;

pub use events::{ClientEvent, ServerEvent, SessionConfig};
pub use orchestrator::{SessionOptions, SessionOrchestrator, SessionState};
pub use summarizer::{HistorySummarizer, Summarize, Summary};
pub use transport::{RealtimeTransport, TransportChannels};
