//! Configuration for the frontdesk gateway

use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// Realtime model used for the live voice conversation
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";

/// Smaller model used to condense conversation history
pub const DEFAULT_SUMMARIZER_MODEL: &str = "gpt-4o-mini";

/// Sample rate required by the Realtime API (PCM16, mono)
pub const SAMPLE_RATE: u32 = 24_000;

/// System instructions sent at session configure time.
///
/// Kept short on purpose: hospital data is fetched via tools, not
/// carried in the prompt.
pub const SYSTEM_INSTRUCTIONS: &str = "\
You are a warm female voice assistant for Delhi Hospital (NABH-accredited, Kharkhoda, Sonipat).
Convince hesitant patients towards visiting. Use natural Hinglish with feminine forms (hoon, sakti hoon).
Style: Warm, caring, light-hearted. Short replies (2-3 lines). Use \"ji\" for respect.

TOOLS (always use, never guess):
- get_hospital_info: Address, phone, hours
- get_facilities: ICU, lab, pharmacy, ambulance
- get_all_doctors: List all doctors
- get_doctor_details: Specific doctor info
- get_department_info: Department details
- get_specialties: Use when patient describes symptoms - YOU decide best department from the list!
- get_second_opinion_info: FREE service at secondopinion.org (mention for surgery/diagnosis confusion!)

When patient describes symptoms: Use get_specialties, then recommend the BEST matching department.
EMERGENCY (chest pain, breathing issue, major injury): ER immediately! Call +91 99849 41611";

/// Frontdesk gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `OpenAI` API key
    pub api_key: String,

    /// Realtime model identifier
    pub realtime_model: String,

    /// Summarizer model identifier
    pub summarizer_model: String,

    /// Voice used for spoken responses
    pub voice: String,

    /// Directory for per-session usage logs and the aggregate summary
    pub log_dir: PathBuf,

    /// Completed user/AI exchanges before history is condensed
    pub summarize_after_turns: u32,

    /// Timeout for the summarization call
    pub summarize_timeout: Duration,

    /// Transport connect attempts before giving up
    pub connect_attempts: u32,

    /// Base delay between connect attempts (doubled each retry)
    pub connect_backoff: Duration,

    /// Timeout for the finalize step during shutdown
    pub finalize_timeout: Duration,

    /// Print tool-call traces, device info, and running cost
    pub verbose: bool,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns error if `OPENAI_API_KEY` is not set
    pub fn load(verbose: bool) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        if api_key.is_empty() || api_key == "your_openai_api_key_here" {
            return Err(Error::Config(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        let realtime_model = std::env::var("FRONTDESK_REALTIME_MODEL")
            .unwrap_or_else(|_| DEFAULT_REALTIME_MODEL.to_string());

        let summarizer_model = std::env::var("FRONTDESK_SUMMARIZER_MODEL")
            .unwrap_or_else(|_| DEFAULT_SUMMARIZER_MODEL.to_string());

        let voice =
            std::env::var("FRONTDESK_VOICE").unwrap_or_else(|_| "coral".to_string());

        let log_dir = std::env::var("FRONTDESK_LOG_DIR")
            .map_or_else(|_| default_log_dir(), PathBuf::from);

        let summarize_after_turns = std::env::var("FRONTDESK_SUMMARIZE_AFTER_TURNS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            api_key,
            realtime_model,
            summarizer_model,
            voice,
            log_dir,
            summarize_after_turns,
            summarize_timeout: Duration::from_secs(20),
            connect_attempts: 3,
            connect_backoff: Duration::from_secs(1),
            finalize_timeout: Duration::from_secs(5),
            verbose,
        })
    }
}

/// Default usage log directory: `~/.local/share/frontdesk/logs/`
fn default_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("logs"),
        |d| d.data_dir().join("frontdesk").join("logs"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_dir_is_not_empty() {
        let dir = default_log_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn instructions_mention_every_tool() {
        for name in [
            "get_hospital_info",
            "get_facilities",
            "get_all_doctors",
            "get_doctor_details",
            "get_department_info",
            "get_specialties",
            "get_second_opinion_info",
        ] {
            assert!(SYSTEM_INSTRUCTIONS.contains(name), "missing {name}");
        }
    }
}
