//! Realtime API wire events
//!
//! Only the events the gateway actually consumes or produces are
//! modeled; everything else deserializes to [`ServerEvent::Other`] and
//! is ignored by the orchestrator. Newer `output_audio` event names are
//! accepted as aliases of the original ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events the gateway sends to the Realtime API
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Configure voice, instructions, transcription, VAD, and tools
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    /// Append base64 PCM16 microphone audio
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioAppend { audio: String },

    /// Cooperatively cancel the in-flight response (barge-in)
    #[serde(rename = "response.cancel")]
    ResponseCancel,

    /// Deliver a tool call's result
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    /// Ask the model to continue after a tool result
    #[serde(rename = "response.create")]
    ResponseCreate,
}

/// Session configuration payload for `session.update`
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub modalities: Vec<String>,
    pub voice: String,
    pub instructions: String,
    pub input_audio_transcription: TranscriptionConfig,
    pub turn_detection: TurnDetection,
    pub tools: Vec<Value>,
    pub tool_choice: String,
}

impl SessionConfig {
    /// Standard configuration: text+audio, whisper transcription,
    /// server VAD tuned for quick barge-in, full tool catalog.
    #[must_use]
    pub fn new(voice: &str, instructions: &str, tools: Vec<Value>) -> Self {
        Self {
            modalities: vec!["text".to_string(), "audio".to_string()],
            voice: voice.to_string(),
            instructions: instructions.to_string(),
            input_audio_transcription: TranscriptionConfig {
                model: "whisper-1".to_string(),
            },
            turn_detection: TurnDetection {
                kind: "server_vad".to_string(),
                threshold: 0.3,
                prefix_padding_ms: 200,
                silence_duration_ms: 400,
                create_response: true,
                interrupt_response: true,
            },
            tools,
            tool_choice: "auto".to_string(),
        }
    }
}

/// Input transcription settings
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionConfig {
    pub model: String,
}

/// Server-side voice activity detection settings
#[derive(Debug, Clone, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f64,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
    pub create_response: bool,
    pub interrupt_response: bool,
}

/// Conversation items the gateway creates
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ConversationItem {
    /// Result payload for a completed tool call
    #[serde(rename = "function_call_output")]
    FunctionCallOutput { call_id: String, output: String },
}

/// Events received from the Realtime API
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated,

    #[serde(rename = "session.updated")]
    SessionUpdated,

    /// Caller began speaking; cancels any in-flight response
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,

    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,

    #[serde(rename = "response.created")]
    ResponseCreated,

    /// Base64 PCM16 audio from the model
    #[serde(rename = "response.audio.delta", alias = "response.output_audio.delta")]
    AudioDelta {
        delta: String,
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Incremental transcript of what the model is saying
    #[serde(
        rename = "response.audio_transcript.delta",
        alias = "response.output_audio_transcript.delta"
    )]
    TranscriptDelta {
        delta: String,
        #[serde(default)]
        item_id: Option<String>,
    },

    #[serde(
        rename = "response.audio_transcript.done",
        alias = "response.output_audio_transcript.done"
    )]
    TranscriptDone {
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Completed transcription of the caller's speech
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptCompleted {
        #[serde(default)]
        transcript: String,
    },

    /// The model requested a tool call
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        call_id: String,
        name: String,
        arguments: String,
    },

    /// Response finished; carries the usage report
    #[serde(rename = "response.done")]
    ResponseDone { response: ResponseSummary },

    #[serde(rename = "response.cancelled")]
    ResponseCancelled,

    #[serde(rename = "error")]
    Error { error: ApiError },

    /// Anything this gateway does not consume
    #[serde(other)]
    Other,
}

/// Trailing summary inside `response.done`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseSummary {
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// Usage block of a completed response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub input_token_details: Option<TokenDetails>,
    #[serde(default)]
    pub output_token_details: Option<TokenDetails>,
}

/// Per-modality token split
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenDetails {
    #[serde(default)]
    pub text_tokens: u64,
    #[serde(default)]
    pub audio_tokens: u64,
}

impl ResponseUsage {
    /// Text tokens on the input side, falling back to the undetailed count
    #[must_use]
    pub fn input_text_tokens(&self) -> u64 {
        self.input_token_details
            .as_ref()
            .map_or(self.input_tokens, |d| d.text_tokens)
    }

    /// Text tokens on the output side, falling back to the undetailed count
    #[must_use]
    pub fn output_text_tokens(&self) -> u64 {
        self.output_token_details
            .as_ref()
            .map_or(self.output_tokens, |d| d.text_tokens)
    }
}

/// Error payload from the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    /// Cancel-when-idle errors are routine during barge-in and suppressed
    #[must_use]
    pub fn is_benign_cancel(&self) -> bool {
        self.code.as_deref() == Some("response_cancel_not_active")
            || self.message.contains("response_cancel_not_active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_serialize_with_type_tag() {
        let event = ClientEvent::InputAudioAppend {
            audio: "AAAA".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "input_audio_buffer.append");
        assert_eq!(json["audio"], "AAAA");
    }

    #[test]
    fn function_call_output_shape() {
        let event = ClientEvent::ConversationItemCreate {
            item: ConversationItem::FunctionCallOutput {
                call_id: "call_1".to_string(),
                output: "payload".to_string(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "conversation.item.create");
        assert_eq!(json["item"]["type"], "function_call_output");
        assert_eq!(json["item"]["call_id"], "call_1");
    }

    #[test]
    fn server_event_parses_audio_delta_and_alias() {
        let old: ServerEvent =
            serde_json::from_str(r#"{"type":"response.audio.delta","delta":"QUJD"}"#).unwrap();
        assert!(matches!(old, ServerEvent::AudioDelta { .. }));

        let new: ServerEvent =
            serde_json::from_str(r#"{"type":"response.output_audio.delta","delta":"QUJD"}"#)
                .unwrap();
        assert!(matches!(new, ServerEvent::AudioDelta { .. }));
    }

    #[test]
    fn unknown_server_event_is_other() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"rate_limits.updated","rate_limits":[]}"#).unwrap();
        assert!(matches!(event, ServerEvent::Other));
    }

    #[test]
    fn usage_prefers_token_details() {
        let usage: ResponseUsage = serde_json::from_str(
            r#"{
                "input_tokens": 120,
                "output_tokens": 80,
                "input_token_details": {"text_tokens": 40, "audio_tokens": 80},
                "output_token_details": {"text_tokens": 30, "audio_tokens": 50}
            }"#,
        )
        .unwrap();
        assert_eq!(usage.input_text_tokens(), 40);
        assert_eq!(usage.output_text_tokens(), 30);
    }

    #[test]
    fn benign_cancel_error_detected() {
        let err: ApiError = serde_json::from_str(
            r#"{"code":"response_cancel_not_active","message":"no active response"}"#,
        )
        .unwrap();
        assert!(err.is_benign_cancel());

        let other: ApiError =
            serde_json::from_str(r#"{"message":"server exploded"}"#).unwrap();
        assert!(!other.is_benign_cancel());
    }

    #[test]
    fn session_config_enables_interrupt() {
        let config = SessionConfig::new("coral", "be nice", vec![]);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["turn_detection"]["type"], "server_vad");
        assert_eq!(json["turn_detection"]["interrupt_response"], true);
        assert_eq!(json["input_audio_transcription"]["model"], "whisper-1");
    }
}
