//! Trip media: cover images and their renditions.

use super::model::LocalizedText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown by an image carousel that has nothing to show.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://dummyimage.com/600x400/000/fff";

/// A named rendition size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSize {
    Thumbnail,
    Small,
    Large,
    Hero,
}

impl MediaSize {
    /// Pixel dimensions used for uploaded trip covers.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Thumbnail => (215, 140),
            Self::Small => (430, 280),
            Self::Large | Self::Hero => (860, 560),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MediaFile {
    fn sized(url: &str, size: MediaSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            url: url.to_string(),
            width: Some(width),
            height: Some(height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<MediaFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<MediaFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<MediaFile>,
}

impl MediaFiles {
    pub fn get(&self, size: MediaSize) -> Option<&MediaFile> {
        match size {
            MediaSize::Thumbnail => self.thumbnail.as_ref(),
            MediaSize::Small => self.small.as_ref(),
            MediaSize::Large => self.large.as_ref(),
            MediaSize::Hero => self.hero.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type", default = "default_media_type")]
    pub kind: String,
    #[serde(default)]
    pub hero: bool,
    #[serde(default)]
    pub names: LocalizedText,
    #[serde(default)]
    pub files: MediaFiles,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_media_type() -> String {
    "image".to_string()
}

impl Media {
    /// Builds the hero image that replaces a trip's media after a cover upload.
    /// Every rendition points at the same uploaded URL.
    pub fn trip_cover(url: &str) -> Self {
        Self {
            kind: default_media_type(),
            hero: true,
            names: LocalizedText::new("Trip image"),
            files: MediaFiles {
                thumbnail: Some(MediaFile::sized(url, MediaSize::Thumbnail)),
                small: Some(MediaFile::sized(url, MediaSize::Small)),
                large: Some(MediaFile::sized(url, MediaSize::Large)),
                hero: Some(MediaFile::sized(url, MediaSize::Hero)),
            },
            extra: Map::new(),
        }
    }
}

/// Where a selected file goes. Trips only have a cover slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaSlot {
    #[default]
    Cover,
}

/// A file picked by the user, ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// One image shown by an [`ImageCarousel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselImage {
    pub url: String,
    #[serde(default)]
    pub name: String,
}

/// Cycles through a list of images, wrapping at both ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageCarousel {
    images: Vec<CarouselImage>,
    index: usize,
}

impl ImageCarousel {
    pub fn new(images: Vec<CarouselImage>) -> Self {
        Self { images, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn go_to_next(&mut self) {
        if self.images.is_empty() {
            return;
        }
        self.index = if self.index + 1 >= self.images.len() {
            0
        } else {
            self.index + 1
        };
    }

    pub fn go_to_previous(&mut self) {
        if self.images.is_empty() {
            return;
        }
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.images.len() - 1);
    }

    /// URL of the current image, or the placeholder when there is none.
    pub fn current_url(&self) -> &str {
        self.images
            .get(self.index)
            .map(|image| image.url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    pub fn current_name(&self) -> &str {
        self.images
            .get(self.index)
            .map(|image| image.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("missing mainPicture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_cover_uses_fixed_rendition_sizes() {
        let media = Media::trip_cover("https://cdn.example/cover.jpg");

        assert!(media.hero);
        assert_eq!(media.kind, "image");
        assert_eq!(media.names.translate(), "Trip image");
        let thumbnail = media.files.get(MediaSize::Thumbnail).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (Some(215), Some(140)));
        let hero = media.files.get(MediaSize::Hero).unwrap();
        assert_eq!(hero.url, "https://cdn.example/cover.jpg");
        assert_eq!((hero.width, hero.height), (Some(860), Some(560)));
    }

    #[test]
    fn test_carousel_wraps_in_both_directions() {
        let mut carousel = ImageCarousel::new(vec![
            CarouselImage {
                url: "a.jpg".into(),
                name: "A".into(),
            },
            CarouselImage {
                url: "b.jpg".into(),
                name: "B".into(),
            },
        ]);

        carousel.go_to_previous();
        assert_eq!(carousel.current_url(), "b.jpg");
        carousel.go_to_next();
        assert_eq!(carousel.current_url(), "a.jpg");
        carousel.go_to_next();
        assert_eq!(carousel.current_name(), "B");
    }

    #[test]
    fn test_empty_carousel_shows_placeholder() {
        let mut carousel = ImageCarousel::default();
        carousel.go_to_next();
        carousel.go_to_previous();
        assert_eq!(carousel.index(), 0);
        assert_eq!(carousel.current_url(), PLACEHOLDER_IMAGE_URL);
    }
}
