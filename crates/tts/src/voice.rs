use std::sync::Arc;

use crate::{
    error::{Result, TtsError},
    provider::{TtsProvider, VoiceOption},
};

/// Picks the voice a request is spoken with
pub struct VoiceResolver {
    provider: Arc<dyn TtsProvider>,
}

impl VoiceResolver {
    pub fn new(provider: Arc<dyn TtsProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a voice id
    ///
    /// An explicit id is returned as is, without checking the catalog.
    /// Otherwise the catalog is fetched and searched for `display_name`,
    /// falling back to its first entry.
    pub async fn resolve(&self, explicit_id: Option<&str>, display_name: Option<&str>) -> Result<String> {
        if let Some(id) = explicit_id {
            return Ok(id.to_string());
        }

        let voices = self.provider.list_voices().await.map_err(TtsError::Catalog)?;

        pick_voice(&voices, display_name).map(|voice| voice.id.clone())
    }

    /// Fetch the provider's voice catalog
    pub async fn catalog(&self) -> Result<Vec<VoiceOption>> {
        self.provider.list_voices().await.map_err(TtsError::Catalog)
    }
}

/// First entry named exactly `display_name`, else the first entry
///
/// A name that matches nothing is logged at warn level before falling
/// back, since the caller then hears a voice they did not ask for.
pub fn pick_voice<'a>(voices: &'a [VoiceOption], display_name: Option<&str>) -> Result<&'a VoiceOption> {
    let first = voices.first().ok_or(TtsError::NoVoiceAvailable)?;

    let Some(name) = display_name else {
        return Ok(first);
    };

    if let Some(found) = voices.iter().find(|voice| voice.display_name == name) {
        return Ok(found);
    }

    tracing::warn!(
        requested = name,
        voice_id = %first.id,
        voice_name = %first.display_name,
        "no voice named {name:?} in catalog, using first available voice"
    );

    Ok(first)
}
