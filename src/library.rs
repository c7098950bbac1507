use crate::collection::{Collection, CollectionError, Keyed, Pinnable};
use crate::data_url::{self, DataUrlError};
use crate::model::generate_id;
use crate::tts::{SpeechSynthesizer, TtsError, TtsRequest, TtsResponse};
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

pub type Library = Collection<Artifact>;

pub const FALLBACK_SENTINEL: &str = "fallback";
const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub gender: String,
}

/// `Fallback` plays through on-device speech and cannot be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// `data:<mime>;base64,<audio>`
    Clip(String),
    Fallback,
}

impl Serialize for AudioSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AudioSource::Clip(url) => serializer.serialize_str(url),
            AudioSource::Fallback => serializer.serialize_str(FALLBACK_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for AudioSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == FALLBACK_SENTINEL {
            Ok(AudioSource::Fallback)
        } else {
            Ok(AudioSource::Clip(raw))
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub date: String,
    pub voice: Voice,
    pub text: String,
    pub audio_url: AudioSource,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

impl Keyed for Artifact {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Pinnable for Artifact {
    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }
}

/// How an artifact should be played back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Clip { mime: String, bytes: Vec<u8> },
    OnDevice { text: String },
}

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("text must not be empty")]
    EmptyText,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("unknown voice: {0}")]
    UnknownVoice(String),
    #[error("download is unavailable for on-device speech")]
    FallbackNotExportable,
    #[error(transparent)]
    Tts(#[from] TtsError),
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn voices() -> Vec<Voice> {
    [
        ("21m00Tcm4TlvDq8ikWAM", "Rachel", "premade", "Calm, clear narration", "female"),
        ("AZnzlk1XvdvUeBnXmlld", "Domi", "premade", "Strong, confident delivery", "female"),
        ("EXAVITQu4vr4xnSDxMaL", "Bella", "premade", "Soft and warm", "female"),
        ("ErXwobaYiN019PkySvjV", "Antoni", "premade", "Well-rounded storyteller", "male"),
        ("TxGEqnHWrfWFTfGW9XjX", "Josh", "premade", "Deep and steady", "male"),
        ("VR6AewLTigWG4xSOukaG", "Arnold", "premade", "Crisp announcer", "male"),
    ]
    .into_iter()
    .map(|(id, name, category, description, gender)| Voice {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        gender: gender.to_string(),
    })
    .collect()
}

/// Looks a voice up by id or, case-insensitively, by name.
pub fn find_voice(needle: &str) -> Option<Voice> {
    voices()
        .into_iter()
        .find(|v| v.id == needle || v.name.eq_ignore_ascii_case(needle))
}

pub fn seed() -> Library {
    Collection::default()
}

/// Maps an endpoint response onto the stored audio source.
pub fn audio_source(response: &TtsResponse) -> AudioSource {
    match (&response.audio, response.success && !response.fallback) {
        (Some(audio), true) if !audio.is_empty() => AudioSource::Clip(data_url::wrap_base64(
            response.content_type.as_deref().unwrap_or(DEFAULT_AUDIO_MIME),
            audio,
        )),
        _ => AudioSource::Fallback,
    }
}

/// Calls the synthesizer and builds an artifact. Transport errors are
/// returned to the caller and nothing is produced; a degraded response
/// still yields an artifact, marked [`AudioSource::Fallback`].
pub fn generate_artifact<S>(
    synth: &S,
    title: &str,
    voice: &Voice,
    text: &str,
    model_id: &str,
) -> Result<Artifact, LibraryError>
where
    S: SpeechSynthesizer + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        return Err(LibraryError::EmptyText);
    }
    let request = TtsRequest {
        text: text.to_string(),
        voice_id: voice.id.clone(),
        model_id: model_id.to_string(),
    };
    let response = synth.synthesize(&request)?;
    let audio_url = audio_source(&response);
    match audio_url {
        AudioSource::Fallback => warn!(
            "event=tts_generate status=fallback voice={} success={}",
            voice.id, response.success
        ),
        AudioSource::Clip(_) => info!("event=tts_generate status=ok voice={}", voice.id),
    }
    let title = match title.trim() {
        "" => text.chars().take(40).collect(),
        t => t.to_string(),
    };
    Ok(Artifact {
        id: generate_id(),
        title,
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        voice: voice.clone(),
        text: text.to_string(),
        audio_url,
        pinned: false,
    })
}

impl Artifact {
    pub fn is_fallback(&self) -> bool {
        self.audio_url == AudioSource::Fallback
    }

    pub fn playback(&self) -> Result<Playback, LibraryError> {
        match &self.audio_url {
            AudioSource::Clip(url) => {
                let (mime, bytes) = data_url::decode(url)?;
                Ok(Playback::Clip { mime, bytes })
            }
            AudioSource::Fallback => Ok(Playback::OnDevice {
                text: self.text.clone(),
            }),
        }
    }
}

/// Writes the clip to `dest` (a file, or a directory that receives
/// `<title>.<ext>`). Fallback artifacts have nothing to download.
pub fn export_audio(artifact: &Artifact, dest: &Path) -> Result<PathBuf, LibraryError> {
    let Playback::Clip { mime, bytes } = artifact.playback()? else {
        return Err(LibraryError::FallbackNotExportable);
    };
    let path = if dest.is_dir() {
        dest.join(format!(
            "{}.{}",
            crate::model::slugify(&artifact.title),
            data_url::extension_for_mime(&mime)
        ))
    } else {
        dest.to_path_buf()
    };
    fs::write(&path, bytes).map_err(|source| LibraryError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn rename(library: &mut Library, id: &str, title: &str) -> Result<(), LibraryError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LibraryError::EmptyTitle);
    }
    library.update(id, |a| a.title = title.to_string())?;
    Ok(())
}
