//! Gallery item model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{missing_required, Defaulted, Record};

fn default_category() -> String {
    "event".to_string()
}

/// A gallery image, addressed by position in `gallery.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// One of event, workshop, hackathon, club-life; not enforced
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub defaulted: Defaulted,
}

impl Record for GalleryItem {
    fn defaulted(&self) -> &Defaulted {
        &self.defaulted
    }

    fn defaulted_mut(&mut self) -> &mut Defaulted {
        &mut self.defaulted
    }
}

impl GalleryItem {
    pub fn missing_fields(&self) -> Vec<String> {
        missing_required(&[("title", &self.title), ("image", &self.image)])
    }
}

/// Request body for adding a gallery item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGalleryItemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateGalleryItemRequest {
    pub fn into_item(self) -> GalleryItem {
        GalleryItem {
            title: self.title,
            description: self.description,
            image: self.image,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(default_category),
            extra: Map::new(),
            defaulted: Defaulted::default(),
        }
    }
}

/// Request body for a partial gallery item update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGalleryItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpdateGalleryItemRequest {
    pub fn apply(&self, item: &mut GalleryItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(image) = &self.image {
            item.image = image.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
    }
}
