//! Photo backfill and upload helpers.
//!
//! # Responsibility
//! - Read the optional `{id, photo}` feed and merge photos into members.
//! - Turn a local image file into an embedded `data:` URL.
//!
//! # Invariants
//! - Feed records only ever overwrite `photo`; no other field is touched.
//! - Feed failures are reported to the caller, which treats them as non-fatal.

use crate::model::member::{Member, MemberId};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One record of the photo feed. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoRecord {
    pub id: MemberId,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Failure to read or decode a photo feed or image file.
#[derive(Debug)]
pub enum PhotoSourceError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
}

impl Display for PhotoSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Parse(err) => write!(f, "invalid photo feed: {err}"),
        }
    }
}

impl Error for PhotoSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Read-only provider of photo records.
pub trait PhotoSource {
    fn fetch(&self) -> Result<Vec<PhotoRecord>, PhotoSourceError>;
}

/// Photo feed stored as a JSON file next to the app data.
#[derive(Debug, Clone)]
pub struct FilePhotoSource {
    path: PathBuf,
}

impl FilePhotoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PhotoSource for FilePhotoSource {
    fn fetch(&self) -> Result<Vec<PhotoRecord>, PhotoSourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| PhotoSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_photo_feed(&contents)
    }
}

/// Parses a JSON array of `{id, photo}` records.
pub fn parse_photo_feed(json: &str) -> Result<Vec<PhotoRecord>, PhotoSourceError> {
    serde_json::from_str(json).map_err(PhotoSourceError::Parse)
}

/// Copies non-empty feed photos onto members with the same id.
///
/// Returns whether any member's photo changed.
pub fn merge_photos(members: &mut [Member], records: &[PhotoRecord]) -> bool {
    let photos = records
        .iter()
        .filter_map(|record| {
            let photo = record.photo.as_deref()?.trim();
            (!photo.is_empty()).then_some((record.id.as_str(), photo))
        })
        .collect::<HashMap<_, _>>();

    let mut changed = false;
    for member in members.iter_mut() {
        if let Some(photo) = photos.get(member.id.as_str()) {
            if member.photo.as_deref() != Some(*photo) {
                member.photo = Some((*photo).to_string());
                changed = true;
            }
        }
    }
    changed
}

/// Encodes image bytes as a `data:` URL.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Reads an image file into a `data:` URL, guessing the MIME type from the extension.
pub fn read_photo_file(path: impl AsRef<Path>) -> Result<String, PhotoSourceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| PhotoSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(&bytes, mime_for_path(path)))
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
