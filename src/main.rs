use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drishti::camera::FrameGrabber;
use drishti::dispatch::Route;
use drishti::voice::{rms_energy, Microphone, Speaker, TextToSpeech};
use drishti::{Assistant, Config};

/// Drishti - voice-driven assistant for visually impaired users
#[derive(Parser)]
#[command(name = "drishti", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive first-run setup
    Setup,
    /// Test microphone input
    TestMic {
        /// Seconds to listen for a phrase
        #[arg(short, long, default_value = "10")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Test webcam capture
    TestCamera,
    /// Run a typed command through the dispatcher (no microphone needed)
    Ask {
        /// Command text, e.g. "what's the weather"
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,drishti=info",
        1 => "info,drishti=debug",
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

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Setup => drishti::setup::run_setup(),
            Command::TestMic { duration } => test_mic(duration),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&text).await,
            Command::TestCamera => test_camera(),
            Command::Ask { text } => ask(&text).await,
        };
    }

    let config = Config::load()?;

    if !config.voice.enabled {
        anyhow::bail!("voice is disabled in the config; use `drishti ask <text>` instead");
    }

    tracing::info!("starting drishti");
    let assistant = Assistant::new(&config)?;
    assistant.run().await?;

    Ok(())
}

/// Test microphone input by recording one phrase
fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Listening for up to {duration} seconds...");
    println!("Say something into your microphone!\n");

    let mut microphone = Microphone::new()?;
    let phrase = microphone.record_phrase(Duration::from_secs(duration))?;

    match phrase {
        Some(samples) => {
            let energy = rms_energy(&samples);
            println!("Captured a phrase: {} samples, RMS {energy:.4}", samples.len());
            println!("Your microphone is working!");
        }
        None => {
            println!("No phrase captured. Check:");
            println!("  1. Is your mic plugged in?");
            println!("  2. Run: pactl info | grep 'Default Source'");
            println!("  3. Run: arecord -l (to list devices)");
        }
    }

    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut speaker = Speaker::new()?;

    // 2 seconds of 440Hz at the 24kHz playback rate
    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    speaker.play(samples)?;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Test TTS synthesis and playback
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let tts = TextToSpeech::from_config(&config.voice, &config.api_keys)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let mut speaker = Speaker::new()?;
    speaker.play_mp3(&mp3_data)?;

    println!("\nIf you heard the speech, TTS is working!");
    Ok(())
}

/// Test webcam capture
fn test_camera() -> anyhow::Result<()> {
    let config = Config::load()?;
    println!("Opening camera {}...", config.camera.index);

    let mut webcam = drishti::Webcam::open(config.camera.index)?;
    let jpeg = webcam.grab_jpeg()?;

    println!("Captured a frame: {} JPEG bytes", jpeg.len());
    println!("Your camera is working!");
    Ok(())
}

/// Run a typed command through the dispatcher and print the reply
async fn ask(text: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let router = drishti::build_router(&config);

    match router.route(text) {
        Route::Shutdown => println!("Shutting down..."),
        Route::Unrecognized => println!("No handler matched that command."),
        Route::Handled(handler) => {
            tracing::info!(handler = handler.name(), "dispatching");
            let reply = handler.handle(text).await?;
            for line in &reply.lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}
