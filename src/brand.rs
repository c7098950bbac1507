use crate::collection::{Collection, CollectionError, Keyed, Pinnable};
use crate::data_url::{self, DataUrlError};
use crate::model::generate_id;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub type Assets = Collection<Asset>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Logo,
    Icon,
    Color,
    Font,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Logo,
        AssetKind::Icon,
        AssetKind::Color,
        AssetKind::Font,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Logo => "Logo",
            AssetKind::Icon => "Icon",
            AssetKind::Color => "Color",
            AssetKind::Font => "Font",
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, AssetKind::Logo | AssetKind::Icon)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = BrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BrandError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Hex color, base64 data URL or font family name depending on `kind`.
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

impl Keyed for Asset {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Pinnable for Asset {
    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BrandError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("unknown asset type: {0}")]
    UnknownKind(String),
    #[error("invalid hex color: {0}")]
    InvalidColor(String),
    #[error("{0} assets must be base64 image data URLs")]
    NotAnImage(AssetKind),
    #[error("font family must not be empty")]
    EmptyFont,
    #[error("unsupported image extension for {0:?}")]
    UnsupportedImage(PathBuf),
    #[error("only logos and icons can be exported")]
    NotExportable,
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

pub fn seed() -> Assets {
    Collection::new(vec![
        seeded("brand-ink", "Ink", AssetKind::Color, "#0F172A"),
        seeded("brand-signal", "Signal", AssetKind::Color, "#F59E0B"),
        seeded("brand-type", "Headline", AssetKind::Font, "Inter"),
    ])
}

fn seeded(id: &str, name: &str, kind: AssetKind, value: &str) -> Asset {
    Asset {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        value: value.to_string(),
        pinned: false,
    }
}

pub fn validate(kind: AssetKind, value: &str) -> Result<(), BrandError> {
    match kind {
        AssetKind::Color => {
            if is_hex_color(value) {
                Ok(())
            } else {
                Err(BrandError::InvalidColor(value.to_string()))
            }
        }
        AssetKind::Logo | AssetKind::Icon => match data_url::mime_of(value) {
            Some(mime) if mime.starts_with("image/") => {
                data_url::decode(value)?;
                Ok(())
            }
            _ => Err(BrandError::NotAnImage(kind)),
        },
        AssetKind::Font => {
            if value.trim().is_empty() {
                Err(BrandError::EmptyFont)
            } else {
                Ok(())
            }
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Validates and prepends a new asset.
pub fn add(assets: &mut Assets, name: &str, kind: AssetKind, value: &str) -> Result<String, BrandError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BrandError::EmptyName);
    }
    let value = value.trim();
    validate(kind, value)?;
    let asset = Asset {
        id: generate_id(),
        name: name.to_string(),
        kind,
        value: value.to_string(),
        pinned: false,
    };
    let id = asset.id.clone();
    assets.prepend(asset)?;
    Ok(id)
}

/// Reads an image file into a data URL suitable for a logo or icon.
pub fn image_data_url(path: &Path) -> Result<String, BrandError> {
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(data_url::image_mime_for_extension)
        .ok_or_else(|| BrandError::UnsupportedImage(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| BrandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data_url::encode(mime, &bytes))
}

pub fn rename(assets: &mut Assets, id: &str, name: &str) -> Result<(), BrandError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BrandError::EmptyName);
    }
    assets.update(id, |a| a.name = name.to_string())?;
    Ok(())
}

/// Pinned first, optionally restricted to one kind.
pub fn listing(assets: &Assets, kind: Option<AssetKind>) -> Vec<&Asset> {
    assets
        .pinned_first()
        .into_iter()
        .filter(|a| kind.map_or(true, |k| a.kind == k))
        .collect()
}

/// Writes a logo or icon to `dest`. A directory destination gets
/// `<name>.<ext>` inside it. Returns the written path.
pub fn export(asset: &Asset, dest: &Path) -> Result<PathBuf, BrandError> {
    if !asset.kind.is_image() {
        return Err(BrandError::NotExportable);
    }
    let (mime, bytes) = data_url::decode(&asset.value)?;
    let path = if dest.is_dir() {
        dest.join(format!(
            "{}.{}",
            crate::model::slugify(&asset.name),
            data_url::extension_for_mime(&mime)
        ))
    } else {
        dest.to_path_buf()
    };
    fs::write(&path, bytes).map_err(|source| BrandError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_validation() {
        assert!(validate(AssetKind::Color, "#fff").is_ok());
        assert!(validate(AssetKind::Color, "#0F172A").is_ok());
        assert!(matches!(
            validate(AssetKind::Color, "0F172A"),
            Err(BrandError::InvalidColor(_))
        ));
        assert!(validate(AssetKind::Color, "#12345g").is_err());
    }

    #[test]
    fn image_kinds_require_image_data_urls() {
        let png = data_url::encode("image/png", b"png");
        assert!(validate(AssetKind::Logo, &png).is_ok());
        let audio = data_url::encode("audio/mpeg", b"mp3");
        assert!(matches!(
            validate(AssetKind::Icon, &audio),
            Err(BrandError::NotAnImage(AssetKind::Icon))
        ));
        assert!(validate(AssetKind::Font, " ").is_err());
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("logo".parse::<AssetKind>().unwrap(), AssetKind::Logo);
        assert!("sticker".parse::<AssetKind>().is_err());
    }

    #[test]
    fn listing_filters_and_pins() {
        let mut assets = seed();
        add(&mut assets, "Mono", AssetKind::Font, "JetBrains Mono").unwrap();
        assets.toggle_pin("brand-signal").unwrap();
        let all: Vec<&str> = listing(&assets, None).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(all[0], "brand-signal");
        let fonts = listing(&assets, Some(AssetKind::Font));
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn import_and_export_roundtrip_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("mark.png");
        fs::write(&src, b"\x89PNG-data").unwrap();
        let url = image_data_url(&src).unwrap();
        let mut assets = seed();
        let id = add(&mut assets, "Mark", AssetKind::Logo, &url).unwrap();
        let out_dir = tmp.path().join("out");
        fs::create_dir_all(&out_dir).unwrap();
        let written = export(assets.get(&id).unwrap(), &out_dir).unwrap();
        assert_eq!(written, out_dir.join("mark.png"));
        assert_eq!(fs::read(written).unwrap(), b"\x89PNG-data");
        assert!(matches!(
            export(assets.get("brand-ink").unwrap(), &out_dir),
            Err(BrandError::NotExportable)
        ));
    }
}
