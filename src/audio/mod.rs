//! Audio capture and playback
//!
//! Platform wrappers around cpal plus the PCM16 frame encoding the
//! Realtime API speaks. Playback runs on its own thread with an
//! interruptible queue so barge-in can drop buffered audio instantly.

mod capture;
mod playback;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cpal::traits::{DeviceTrait, HostTrait};

pub use capture::AudioCapture;
pub use playback::AudioPlayback;

use crate::{Error, Result};

/// Name of the default input device, if any
#[must_use]
pub fn default_input_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}

/// Name of the default output device, if any
#[must_use]
pub fn default_output_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

/// Where decoded model audio goes. Seam between the orchestrator and
/// the speaker hardware.
pub trait AudioSink: Send + Sync {
    /// A new response started; accept audio again after an interruption
    fn begin_response(&self);

    /// Queue samples for playback
    fn enqueue(&self, samples: Vec<i16>);

    /// Drop everything queued and refuse audio until the next response
    fn cancel_current(&self);
}

/// Encode captured f32 samples as the base64 PCM16 frame the API expects
#[must_use]
pub fn encode_frame(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    BASE64.encode(bytes)
}

/// Decode a base64 PCM16 frame into samples
///
/// # Errors
///
/// Returns error if the payload is not valid base64
pub fn decode_frame(data: &str) -> Result<Vec<i16>> {
    let bytes = BASE64
        .decode(data)
        .map_err(|e| Error::Audio(format!("invalid audio frame: {e}")))?;

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let samples = vec![0.0_f32, 0.5, -0.5, 1.0, -1.0];
        let encoded = encode_frame(&samples);
        let decoded = decode_frame(&encoded).unwrap();

        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], 0);
        assert_eq!(decoded[3], 32767);
        assert_eq!(decoded[4], -32767);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_frame("not base64 !!!").is_err());
    }

    #[test]
    fn decode_drops_trailing_odd_byte() {
        let encoded = BASE64.encode([0x01, 0x02, 0x03]);
        let decoded = decode_frame(&encoded).unwrap();
        assert_eq!(decoded, vec![i16::from_le_bytes([0x01, 0x02])]);
    }
}
