//! Listing shape returned by the catalog search endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// Most image URLs kept per listing (primary + thumbnails).
pub const MAX_IMAGES: usize = 3;

/// One catalog listing. Only `url` is mandatory; it is also the listing's
/// identity for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "brand_title")]
    pub brand: Option<String>,
    #[serde(default, rename = "size_title")]
    pub size: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default, rename = "user")]
    pub seller: Seller,
    #[serde(default)]
    pub photo: Option<Photo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Upstream sends either `"12.0"` or `12.0`; kept verbatim as text.
    #[serde(deserialize_with = "amount_as_text")]
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub business: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

impl Item {
    /// Identifier used by the dedup store.
    pub fn id(&self) -> &str {
        &self.url
    }

    /// Size label, with blank treated as unknown.
    pub fn size_label(&self) -> Option<&str> {
        self.size.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Primary image followed by distinct thumbnails, at most [`MAX_IMAGES`].
    pub fn image_urls(&self) -> Vec<&str> {
        let Some(photo) = &self.photo else {
            return Vec::new();
        };

        let mut urls: Vec<&str> = photo.url.as_deref().into_iter().collect();
        for thumb in &photo.thumbnails {
            if urls.len() >= MAX_IMAGES {
                break;
            }
            if let Some(url) = thumb.url.as_deref()
                && !urls.contains(&url)
            {
                urls.push(url);
            }
        }
        urls
    }
}

fn amount_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Amount::deserialize(deserializer)? {
        Amount::Text(text) => text,
        Amount::Number(n) => n.to_string(),
    })
}
