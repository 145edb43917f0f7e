use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use frontdesk::audio::{self, AudioCapture, AudioPlayback, AudioSink};
use frontdesk::config::SAMPLE_RATE;
use frontdesk::directory::directory;
use frontdesk::session::{ClientEvent, HistorySummarizer, RealtimeTransport};
use frontdesk::usage::{RateTable, SessionTotals, UsageLedger};
use frontdesk::{Config, SessionOptions, SessionOrchestrator};

/// Frontdesk - voice front-desk gateway for hospital callers
#[derive(Parser)]
#[command(name = "frontdesk", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv); prints device info,
    /// tool-call traces, and running cost
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,frontdesk=info",
        1 => "info,frontdesk=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
        };
    }

    let config = Config::load(cli.verbose > 0)?;
    let hospital = &directory().hospital;

    println!("Welcome to {} Voice Assistant", hospital.name);
    println!("Ask about doctors, departments, facilities, and timings.");
    println!("Press Ctrl+C to stop the conversation.\n");

    if config.verbose {
        match audio::default_input_name() {
            Some(name) => println!("Input device: {name}"),
            None => println!("Input device: none detected"),
        }
        match audio::default_output_name() {
            Some(name) => println!("Output device: {name}"),
            None => println!("Output device: none detected"),
        }
        println!("Usage logs: {}", config.log_dir.display());
    }

    let ledger = UsageLedger::new(&config.log_dir)?;
    let playback = Arc::new(AudioPlayback::start()?);

    let transport = RealtimeTransport::connect_with_retry(
        &config.api_key,
        &config.realtime_model,
        config.connect_attempts,
        config.connect_backoff,
    )
    .await?;
    let channels = transport.start();

    let mic_samples = Arc::new(AtomicU64::new(0));
    let mic_thread = spawn_mic_forwarder(channels.outbound.clone(), Arc::clone(&mic_samples));

    let summarizer = Arc::new(HistorySummarizer::new(
        config.api_key.clone(),
        config.summarizer_model.clone(),
        config.summarize_timeout,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(true);
    });

    let orchestrator = SessionOrchestrator::new(
        SessionOptions::from_config(&config),
        channels.outbound.clone(),
        channels.inbound,
        playback,
        mic_samples,
        summarizer,
        ledger,
        RateTable::builtin(),
    );

    let totals = orchestrator.run(shutdown_rx).await?;

    channels.driver.abort();
    drop(channels.outbound);
    let _ = mic_thread.join();

    if config.verbose {
        print_session_summary(&totals);
    }
    println!("\nVoice agent stopped. Goodbye!");

    Ok(())
}

/// Forward microphone audio to the transport on a dedicated thread.
///
/// The capture stream cannot cross threads, so the thread owns it
/// end-to-end. Runs until the transport channel closes; event-processing
/// latency never stalls this path.
fn spawn_mic_forwarder(
    outbound: tokio::sync::mpsc::Sender<ClientEvent>,
    mic_samples: Arc<AtomicU64>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut capture = match AudioCapture::new() {
            Ok(capture) => capture,
            Err(e) => {
                tracing::error!(error = %e, "microphone unavailable");
                return;
            }
        };
        if let Err(e) = capture.start() {
            tracing::error!(error = %e, "failed to start capture");
            return;
        }

        // 20ms cadence keeps frames small enough for quick VAD reaction
        loop {
            std::thread::sleep(Duration::from_millis(20));

            let samples = capture.take_buffer();
            if samples.is_empty() {
                if outbound.is_closed() {
                    break;
                }
                continue;
            }

            mic_samples.fetch_add(samples.len() as u64, Ordering::SeqCst);
            let frame = audio::encode_frame(&samples);
            if outbound
                .blocking_send(ClientEvent::InputAudioAppend { audio: frame })
                .is_err()
            {
                break;
            }
        }

        capture.stop();
        tracing::debug!("mic forwarder stopped");
    })
}

/// Per-model cost breakdown printed after a verbose session
fn print_session_summary(totals: &SessionTotals) {
    println!("\n==== SESSION COST SUMMARY ====");
    println!("Session: {}", totals.session_id);
    for (model, usage) in &totals.models {
        println!("  {model}:");
        if usage.audio_input_secs > 0 {
            println!("    Audio in:  {}s", usage.audio_input_secs);
        }
        if usage.audio_output_secs > 0 {
            println!("    Audio out: {}s", usage.audio_output_secs);
        }
        if usage.text_input_tokens > 0 {
            println!("    Tokens in:  {}", usage.text_input_tokens);
        }
        if usage.text_output_tokens > 0 {
            println!("    Tokens out: {}", usage.text_output_tokens);
        }
        if usage.rated {
            println!("    Cost: ${:.4}", usage.cost);
        } else {
            println!("    Cost: unrated");
        }
    }
    println!("TOTAL: ${:.4}", totals.total_cost());
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Sample rate: {SAMPLE_RATE} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        capture.clear_buffer();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::start()?;

    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let samples: Vec<i16> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let value = (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3;
            (value * 32767.0) as i16
        })
        .collect();

    println!("Playing {} samples at {SAMPLE_RATE} Hz...", samples.len());

    playback.begin_response();
    playback.enqueue(samples);
    tokio::time::sleep(Duration::from_secs_f32(duration_secs + 0.5)).await;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");

    Ok(())
}
