use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use framepilot::camera::{FrameSource, SnapshotCamera, StillImage};
use framepilot::detect;
use framepilot::session::{Session, SessionEvent};
use framepilot::speech::{MicInput, SpeechToText, TextToSpeech, Voice};
use framepilot::vision::{VisionApi, VisionClient};
use framepilot::{Config, Error};

/// framepilot - voice-driven camera assistant
#[derive(Parser)]
#[command(name = "framepilot", version, about)]
struct Cli {
    /// Override the camera snapshot URL
    #[arg(long, env = "FRAMEPILOT_CAMERA_URL")]
    camera_url: Option<String>,

    /// Override the wake phrase
    #[arg(long, env = "FRAMEPILOT_WAKE_WORD")]
    wake_word: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the vision proxy server
    Proxy {
        /// Port to listen on
        #[arg(long, env = "FRAMEPILOT_PORT")]
        port: Option<u16>,
    },
    /// One-shot analysis of an image file against a target description
    Analyze {
        /// Path to a JPEG/PNG image
        image: std::path::PathBuf,
        /// Target description (e.g. "red cup")
        target: String,
    },
    /// Test the camera by fetching one frame
    TestCamera,
    /// Test TTS output
    TestSpeak {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the framepilot voice.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,framepilot=info",
        1 => "info,framepilot=debug",
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
    let mut config = Config::load()?;

    if let Some(url) = cli.camera_url {
        config.camera.snapshot_url = Some(url);
    }
    if let Some(wake) = cli.wake_word {
        config.assistant.wake_word = wake;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Proxy { port } => {
                if let Some(port) = port {
                    config.proxy.port = port;
                }
                framepilot::proxy::serve(&config).await.map_err(Into::into)
            }
            Command::Analyze { image, target } => analyze(&config, &image, &target).await,
            Command::TestCamera => test_camera(&config).await,
            Command::TestSpeak { text } => test_speak(&config, &text).await,
        };
    }

    run_assistant(config).await
}

/// Run the voice-driven assistant session until interrupted
async fn run_assistant(config: Config) -> anyhow::Result<()> {
    let openai_key = config.api_keys.openai.clone().ok_or_else(|| {
        anyhow::anyhow!("OPENAI_API_KEY required for speech (set env or config file)")
    })?;

    let camera = build_camera(&config)?;
    let vision: Arc<dyn VisionApi> = Arc::new(VisionClient::new(&config.vision.proxy_url));

    let stt = SpeechToText::new(openai_key.clone(), config.speech.stt_model.clone())?;
    let tts = TextToSpeech::new(
        openai_key,
        config.speech.tts_model.clone(),
        config.speech.tts_voice.clone(),
        config.speech.tts_speed,
    )?;

    let input = MicInput::new(stt)?;
    let voice = Voice::new(tts);

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(32);
    let mut session = Session::new(
        config.assistant.clone(),
        Box::new(input),
        Box::new(voice),
        camera,
        vision,
    )
    .with_events(event_tx);

    // Display loop: feedback and photo notifications
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                SessionEvent::StateChanged(state) => {
                    tracing::info!(state = ?state, "session state");
                }
                SessionEvent::Feedback(text) => println!("{text}"),
                SessionEvent::PhotoTaken { width, height } => {
                    println!("Photo taken ({width}x{height})! The object is well framed.");
                }
            }
        }
    });

    // Ctrl-C requests shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(()).await;
        }
    });

    tracing::info!(
        wake_word = %config.assistant.wake_word,
        "framepilot ready - say \"{}\"",
        config.assistant.wake_word
    );

    session.run(&mut shutdown_rx).await?;
    Ok(())
}

/// Build the configured frame source
fn build_camera(config: &Config) -> anyhow::Result<Arc<dyn FrameSource>> {
    let url = config.camera.snapshot_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("camera.snapshot_url required (config file or --camera-url)")
    })?;
    Ok(Arc::new(SnapshotCamera::new(url)?))
}

/// One-shot analysis of an image file
async fn analyze(config: &Config, image: &std::path::Path, target: &str) -> anyhow::Result<()> {
    let source = StillImage::new(image);
    let frame = source.capture().await?;
    println!("Frame: {}x{} ({})", frame.width, frame.height, frame.mime);

    let vision = VisionClient::new(&config.vision.proxy_url);
    let prompt = framepilot::prompt::centering_prompt(target);
    let reply = vision.analyze(&frame, &prompt).await?;

    println!("Response: {}", reply.text);
    if let Some(desc) = &reply.debug_description {
        println!("Model sees: {desc}");
    }

    let detection = detect::parse(&reply.text);
    println!("Classified: {detection}");
    Ok(())
}

/// Fetch one frame from the configured camera
async fn test_camera(config: &Config) -> anyhow::Result<()> {
    println!("Fetching one frame from the camera...");
    let camera = build_camera(config)?;
    let frame = camera.capture().await?;
    println!(
        "Got a {}x{} {} frame ({} bytes)",
        frame.width,
        frame.height,
        frame.mime,
        frame.data.len()
    );
    println!("If the dimensions look right, your camera is working!");
    Ok(())
}

/// Speak a test phrase through the configured voice
async fn test_speak(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Speaking: \"{text}\"");

    let openai_key = config
        .api_keys
        .openai
        .clone()
        .ok_or_else(|| Error::Config("OPENAI_API_KEY required for TTS".to_string()))?;

    let tts = TextToSpeech::new(
        openai_key,
        config.speech.tts_model.clone(),
        config.speech.tts_voice.clone(),
        config.speech.tts_speed,
    )?;

    let mut voice = Voice::new(tts);
    voice.say(text).await?;

    println!("If you heard the phrase, speech output is working!");
    Ok(())
}
