//! Scripted provider for unit tests

use std::{
    collections::VecDeque,
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::{
    provider::{ConvertRequest, ProviderError, ProviderFailure, TtsProvider, VoiceOption},
    stream::{AudioSource, BufferedSource, PushSource},
};

pub(crate) enum Outcome {
    Audio(&'static [u8]),
    Fail {
        status: Option<u16>,
        body: Option<&'static str>,
    },
    FailWithBrokenBody(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub voice_id: String,
    pub model_id: String,
    pub text: String,
}

pub(crate) struct ScriptedProvider {
    voices: Result<Vec<VoiceOption>, ProviderError>,
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<Call>>,
    catalog_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            voices: Ok(Vec::new()),
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            catalog_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_voices(mut self, voices: &[(&str, &str)]) -> Self {
        self.voices = Ok(voices.iter().map(|(id, name)| VoiceOption::new(*id, *name)).collect());
        self
    }

    pub fn with_catalog_error(mut self, error: ProviderError) -> Self {
        self.voices = Err(error);
        self
    }

    pub fn then(self, outcome: Outcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsProvider for ScriptedProvider {
    async fn list_voices(&self) -> Result<Vec<VoiceOption>, ProviderError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.voices.clone()
    }

    async fn convert(&self, voice_id: &str, request: ConvertRequest<'_>) -> Result<AudioSource, ProviderFailure> {
        self.calls.lock().unwrap().push(Call {
            voice_id: voice_id.to_string(),
            model_id: request.model_id.to_string(),
            text: request.text.to_string(),
        });

        let outcome = self.outcomes.lock().unwrap().pop_front();

        match outcome {
            Some(Outcome::Audio(bytes)) => Ok(Box::new(BufferedSource::from_bytes(bytes))),
            Some(Outcome::Fail { status, body }) => {
                let error = ProviderError::new(format!("Status code: {}", status.unwrap_or_default()), status);
                Err(match body {
                    Some(text) => ProviderFailure::with_body(error, Box::new(BufferedSource::from_bytes(text))),
                    None => error.into(),
                })
            }
            Some(Outcome::FailWithBrokenBody(status)) => {
                let body = PushSource::new(stream::iter(vec![
                    Ok(Bytes::from_static(b"{\"det")),
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "body cut off")),
                ]));
                Err(ProviderFailure::with_body(
                    ProviderError::new(format!("Status code: {status}"), Some(status)),
                    Box::new(body),
                ))
            }
            None => Err(ProviderError::new("no scripted outcome left", None).into()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
