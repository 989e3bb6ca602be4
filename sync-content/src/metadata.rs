//! YAML metadata documents.
//!
//! Each album directory may hold two documents:
//!
//! - `album.yml`: a flat mapping with `name`, `description`, `date_from`,
//!   `date_to`, `rank` (legacy spelling `order`) and `album_photo`
//! - `photos.yml`: photo id → `{ name, description, date_taken }`
//!
//! Unknown keys are ignored. Malformed dates or ranks are rejected with
//! [`GalleryError::InvalidMetadata`], never defaulted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_yaml::Value;
use sync_types::{AlbumId, AlbumMetadata, GalleryError, PhotoId, PhotoMetadata};

/// File name of the album metadata document.
pub const ALBUM_DOCUMENT: &str = "album.yml";

/// File name of the photo metadata sidecar.
pub const PHOTOS_DOCUMENT: &str = "photos.yml";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an `album.yml` document. Empty text yields default metadata.
pub fn parse_album(album_id: &AlbumId, text: &str) -> Result<AlbumMetadata, GalleryError> {
    let owner = format!("album {}", album_id);
    if text.trim().is_empty() {
        return Ok(AlbumMetadata::default());
    }
    let document: Value = serde_yaml::from_str(text).map_err(|e| invalid(&owner, "-", e))?;
    if document.is_null() {
        return Ok(AlbumMetadata::default());
    }
    let fields = Fields::new(&owner, &document)?;

    let rank = match fields.get("rank") {
        Some(_) => fields.integer("rank")?,
        None => fields.integer("order")?,
    };

    Ok(AlbumMetadata {
        name: fields.text("name")?,
        description: fields.text("description")?,
        date_from: fields.date("date_from")?,
        date_to: fields.date("date_to")?,
        rank,
        cover_photo: fields.text("album_photo")?.map(PhotoId::new),
    })
}

/// Render album metadata as an `album.yml` document. Unset fields are
/// omitted.
pub fn render_album(metadata: &AlbumMetadata) -> Result<String, serde_yaml::Error> {
    #[derive(Serialize)]
    struct AlbumDocument<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date_from: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date_to: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rank: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        album_photo: Option<&'a str>,
    }

    serde_yaml::to_string(&AlbumDocument {
        name: metadata.name.as_deref(),
        description: metadata.description.as_deref(),
        date_from: metadata.date_from.map(format_date),
        date_to: metadata.date_to.map(format_date),
        rank: metadata.rank,
        album_photo: metadata.cover_photo.as_ref().map(PhotoId::as_str),
    })
}

/// Parse a `photos.yml` sidecar into per-photo metadata.
pub fn parse_photos(
    album_id: &AlbumId,
    text: &str,
) -> Result<BTreeMap<PhotoId, PhotoMetadata>, GalleryError> {
    let owner = format!("album {} photos", album_id);
    let mut photos = BTreeMap::new();
    if text.trim().is_empty() {
        return Ok(photos);
    }
    let document: Value = serde_yaml::from_str(text).map_err(|e| invalid(&owner, "-", e))?;
    let entries = match &document {
        Value::Null => return Ok(photos),
        Value::Mapping(entries) => entries,
        _ => return Err(invalid(&owner, "-", "expected a mapping of photo ids")),
    };

    for (key, entry) in entries {
        let id =
            scalar_text(key).ok_or_else(|| invalid(&owner, "-", "photo ids must be strings"))?;
        let photo_owner = format!("photo {}/{}", album_id, id);
        if entry.is_null() {
            photos.insert(PhotoId::new(id), PhotoMetadata::default());
            continue;
        }
        let fields = Fields::new(&photo_owner, entry)?;
        let metadata = PhotoMetadata {
            name: fields.text("name")?,
            description: fields.text("description")?,
            date_taken: fields.date("date_taken")?,
        };
        photos.insert(PhotoId::new(id), metadata);
    }
    Ok(photos)
}

/// Render a `photos.yml` sidecar. Photos without metadata are omitted.
pub fn render_photos<'a>(
    photos: impl IntoIterator<Item = (&'a PhotoId, &'a PhotoMetadata)>,
) -> Result<String, serde_yaml::Error> {
    #[derive(Serialize)]
    struct PhotoDocument<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date_taken: Option<String>,
    }

    let document: BTreeMap<&str, PhotoDocument<'_>> = photos
        .into_iter()
        .filter(|(_, metadata)| !metadata.is_empty())
        .map(|(id, metadata)| {
            (
                id.as_str(),
                PhotoDocument {
                    name: metadata.name.as_deref(),
                    description: metadata.description.as_deref(),
                    date_taken: metadata.date_taken.map(format_date),
                },
            )
        })
        .collect();
    serde_yaml::to_string(&document)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn invalid(owner: &str, field: &str, reason: impl ToString) -> GalleryError {
    GalleryError::InvalidMetadata {
        owner: owner.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Scalars as text; YAML reads `name: 2019` as a number.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Typed field access over one YAML mapping.
struct Fields<'a> {
    owner: &'a str,
    document: &'a Value,
}

impl<'a> Fields<'a> {
    fn new(owner: &'a str, document: &'a Value) -> Result<Self, GalleryError> {
        if !document.is_mapping() {
            return Err(invalid(owner, "-", "expected a mapping"));
        }
        Ok(Self { owner, document })
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.document.get(field).filter(|value| !value.is_null())
    }

    fn text(&self, field: &str) -> Result<Option<String>, GalleryError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => scalar_text(value)
                .map(Some)
                .ok_or_else(|| invalid(self.owner, field, "expected text")),
        }
    }

    fn date(&self, field: &str) -> Result<Option<NaiveDate>, GalleryError> {
        let Some(text) = self.text(field)? else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                let reason = format!("{:?} is not a YYYY-MM-DD date", text);
                invalid(self.owner, field, reason)
            })
    }

    fn integer(&self, field: &str) -> Result<Option<i64>, GalleryError> {
        let value = match self.get(field) {
            None => return Ok(None),
            Some(value) => value,
        };
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid(self.owner, field, "expected an integer"))
    }
}
