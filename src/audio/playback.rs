//! Audio playback with instant interruption
//!
//! A dedicated thread owns the output stream and drains a shared sample
//! queue. Barge-in clears the queue and raises an interrupt flag, so
//! audio stops at the next hardware callback instead of after the
//! buffered response finishes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use super::AudioSink;
use crate::config::SAMPLE_RATE;
use crate::{Error, Result};

/// Plays queued audio to the default output device
pub struct AudioPlayback {
    queue: Arc<Mutex<VecDeque<i16>>>,
    interrupted: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AudioPlayback {
    /// Probe the output device and start the player thread
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available
    pub fn start() -> Result<Self> {
        // Fail fast on the caller's thread if there is no device at all;
        // the player thread redoes full setup since cpal streams cannot
        // cross threads.
        cpal::default_host()
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let interrupted = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let thread = std::thread::spawn({
            let queue = Arc::clone(&queue);
            let stop = Arc::clone(&stop);
            move || player_thread(&queue, &stop)
        });

        tracing::debug!("audio playback started");
        Ok(Self {
            queue,
            interrupted,
            stop,
            thread: Some(thread),
        })
    }

    /// Stop the player thread and release the device
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl AudioSink for AudioPlayback {
    fn begin_response(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }

    fn enqueue(&self, samples: Vec<i16>) {
        if self.interrupted.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(mut queue) = self.queue.lock() {
            queue.extend(samples);
        }
    }

    fn cancel_current(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        if let Ok(mut queue) = self.queue.lock() {
            queue.clear();
        }
    }
}

/// Owns the cpal output stream, feeding it from the shared queue
fn player_thread(queue: &Arc<Mutex<VecDeque<i16>>>, stop: &Arc<AtomicBool>) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        tracing::error!("no output device in player thread");
        return;
    };

    let supported = device.supported_output_configs().ok().and_then(|mut configs| {
        configs.find(|c| {
            (c.channels() == 1 || c.channels() == 2)
                && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
        })
    });

    let Some(supported) = supported else {
        tracing::error!("no suitable output config found");
        return;
    };

    let config: StreamConfig = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();
    let channels = config.channels as usize;
    let queue = Arc::clone(queue);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut queue = match queue.lock() {
                Ok(q) => q,
                Err(_) => return,
            };
            for frame in data.chunks_mut(channels) {
                let sample = queue
                    .pop_front()
                    .map_or(0.0, |s| f32::from(s) / 32768.0);
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        |err| {
            tracing::error!(error = %err, "audio playback error");
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to open output stream");
            return;
        }
    };

    if let Err(e) = stream.play() {
        tracing::error!(error = %e, "failed to start output stream");
        return;
    }

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    tracing::debug!("audio playback stopped");
}
