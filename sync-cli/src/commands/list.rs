//! List the albums of a gallery directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use sync_types::{Gallery, NaiveDate};

use super::endpoint;

/// One album in display order.
#[derive(Debug, Serialize)]
struct AlbumListing<'a> {
    id: &'a str,
    name: &'a str,
    photos: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<&'a str>,
}

fn listing(gallery: &Gallery) -> Vec<AlbumListing<'_>> {
    gallery
        .albums_by_rank()
        .into_iter()
        .map(|album| AlbumListing {
            id: album.id().as_str(),
            name: album.name(),
            photos: album.len(),
            rank: album.metadata().rank,
            date_from: album.metadata().date_from,
            cover: album.cover_photo().map(|photo| photo.id().as_str()),
        })
        .collect()
}

/// Run the list command.
pub async fn run(root: &Path, json: bool) -> Result<()> {
    let gallery = endpoint(root)
        .current_gallery()
        .await
        .with_context(|| format!("Failed to read gallery at {}", root.display()))?;
    print!("{}", render(&gallery, json)?);
    Ok(())
}

fn render(gallery: &Gallery, json: bool) -> Result<String> {
    let albums = listing(gallery);
    if json {
        let mut out = serde_json::to_string_pretty(&albums)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for album in &albums {
        let date = album
            .date_from
            .map(|d| d.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<24} {:<32} {:>5} photos  {}\n",
            album.id, album.name, album.photos, date
        ));
    }
    out.push_str(&format!(
        "{} albums, {} photos\n",
        gallery.len(),
        gallery.photo_count()
    ));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_types::{Album, AlbumId, AlbumMetadata, GalleryId, PhotoMetadata};

    fn gallery() -> Gallery {
        let mut gallery = Gallery::new(GalleryId::new("g"));
        let mut old = Album::new(AlbumId::new("old")).with_metadata(
            AlbumMetadata::default()
                .with_name("Old Trip")
                .with_dates(NaiveDate::from_ymd_opt(2010, 1, 1), None),
        );
        old.add_photo("a.jpg", PhotoMetadata::default());
        let mut pinned = Album::new(AlbumId::new("pinned"))
            .with_metadata(AlbumMetadata::default().with_rank(10));
        pinned.add_photo("b.jpg", PhotoMetadata::default());
        pinned.add_photo("c.jpg", PhotoMetadata::default());
        gallery.add_album(old);
        gallery.add_album(pinned);
        gallery
    }

    #[test]
    fn albums_are_listed_by_rank() {
        let text = render(&gallery(), false).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("pinned"));
        assert!(lines[1].starts_with("old"));
        assert!(lines[1].contains("Old Trip"));
        assert!(lines[1].contains("2010-01-01"));
        assert_eq!(lines[2], "2 albums, 3 photos");
    }

    #[test]
    fn json_listing_includes_cover() {
        let text = render(&gallery(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["id"], "pinned");
        assert_eq!(value[0]["photos"], 2);
        assert_eq!(value[0]["cover"], "b.jpg");
        assert_eq!(value[1]["date_from"], "2010-01-01");
        assert!(value[1].get("rank").is_none());
    }
}
