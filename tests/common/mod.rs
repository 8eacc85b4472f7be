//! Shared test doubles for the camera, vision, and speech seams

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use framepilot::camera::{Frame, FrameSource};
use framepilot::speech::{Speaker, SpeechInput};
use framepilot::vision::{VisionApi, VisionReply};
use framepilot::{Error, Result};

/// Encode a tiny valid PNG for frame fixtures
pub fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([128, 64, 32]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

/// Frame source returning a fixed frame, or failing when disabled
pub struct FakeCamera {
    pub available: bool,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self { available: true }
    }
}

#[async_trait::async_trait]
impl FrameSource for FakeCamera {
    async fn capture(&self) -> Result<Frame> {
        if self.available {
            Frame::from_encoded(tiny_png())
        } else {
            Err(Error::Camera("camera disabled".to_string()))
        }
    }
}

/// Vision API returning scripted replies in order, repeating the last one
pub struct ScriptedVision {
    replies: Mutex<Vec<VisionReply>>,
    pub queries: Arc<Mutex<usize>>,
}

impl ScriptedVision {
    pub fn new(replies: Vec<VisionReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            queries: Arc::new(Mutex::new(0)),
        }
    }

    /// Convenience: plain-text replies without a debug description
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| VisionReply {
                    text: (*t).to_string(),
                    debug_description: None,
                })
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl VisionApi for ScriptedVision {
    async fn analyze(&self, _frame: &Frame, _prompt: &str) -> Result<VisionReply> {
        *self.queries.lock().unwrap() += 1;
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(Error::Vision("script exhausted".to_string()));
        }
        if replies.len() == 1 {
            Ok(replies[0].clone())
        } else {
            Ok(replies.remove(0))
        }
    }
}

/// Speaker that records everything it is asked to say
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    pub spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn speak_and_wait(&mut self, text: &str) -> Result<()> {
        self.speak(text).await
    }
}

/// Speech input driven by scripted wake transcripts and dictation results
pub struct ScriptedInput {
    wake_transcripts: Mutex<Vec<String>>,
    dictations: Mutex<Vec<Result<String>>>,
}

impl ScriptedInput {
    pub fn new(wake_transcripts: Vec<&str>, dictations: Vec<Result<String>>) -> Self {
        Self {
            wake_transcripts: Mutex::new(
                wake_transcripts.into_iter().map(String::from).collect(),
            ),
            dictations: Mutex::new(dictations),
        }
    }
}

#[async_trait::async_trait]
impl SpeechInput for ScriptedInput {
    async fn wait_for_wake(&mut self, _wake_word: &str) -> Result<String> {
        let next = {
            let mut transcripts = self.wake_transcripts.lock().unwrap();
            if transcripts.is_empty() {
                None
            } else {
                Some(transcripts.remove(0))
            }
        };
        match next {
            Some(transcript) => Ok(transcript),
            None => {
                // Script exhausted: park forever, as a silent room would
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn listen_once(&mut self) -> Result<String> {
        let mut dictations = self.dictations.lock().unwrap();
        if dictations.is_empty() {
            Err(Error::Stt("no speech detected".to_string()))
        } else {
            dictations.remove(0)
        }
    }
}
