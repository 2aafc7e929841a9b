//! Insertion requests.

use super::entry::{AssetRef, EntryKind, MediaDescriptor, Side, TimeBucket};
use super::error::ListError;
use serde::Serialize;

/// Text used when a message request carries neither text nor media.
pub const PLACEHOLDER_TEXT: &str = "Random text message";

/// Where new content lands.
///
/// `Top` marks historical (older) content, `Bottom` new incoming content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Above the oldest entry (history).
    Top,
    /// Below the newest entry (incoming).
    Bottom,
}

/// Media part of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSpec {
    /// Requested display width.
    pub width: Option<f64>,
    /// Requested display height.
    pub height: Option<f64>,
    /// Asset reference, e.g. `sim:300x200`.
    pub asset_ref: String,
}

impl MediaSpec {
    /// Image with no size hint.
    pub fn new(asset_ref: impl Into<String>) -> Self {
        Self {
            width: None,
            height: None,
            asset_ref: asset_ref.into(),
        }
    }

    /// Image with a requested size.
    pub fn sized(asset_ref: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            asset_ref: asset_ref.into(),
        }
    }

    pub(crate) fn descriptor(&self) -> MediaDescriptor {
        MediaDescriptor {
            requested_width: self.width,
            requested_height: self.height,
            asset_ref: AssetRef::new(self.asset_ref.clone()),
        }
    }
}

/// A request to insert one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySpec {
    /// Header or message.
    pub kind: EntryKind,
    /// Side of a message. Defaults to left.
    pub side: Option<Side>,
    /// Message text or header label.
    pub text: Option<String>,
    /// Image carried by a media message.
    pub media: Option<MediaSpec>,
    /// Explicit placement; `None` means incoming content at the bottom.
    pub location: Option<Location>,
    /// Dedup key for time dividers.
    pub bucket: Option<TimeBucket>,
    /// Externally chosen id (seed data). Renamed if it collides.
    pub id: Option<String>,
}

impl EntrySpec {
    /// Time divider for a bucket.
    pub fn header(bucket: TimeBucket) -> Self {
        Self {
            kind: EntryKind::Header,
            side: None,
            text: None,
            media: None,
            location: None,
            bucket: Some(bucket),
            id: None,
        }
    }

    /// Text message request.
    pub fn text(side: Side, text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Message,
            side: Some(side),
            text: Some(text.into()),
            media: None,
            location: None,
            bucket: None,
            id: None,
        }
    }

    /// Media message request.
    pub fn media(side: Side, media: MediaSpec) -> Self {
        Self {
            kind: EntryKind::Message,
            side: Some(side),
            text: None,
            media: Some(media),
            location: None,
            bucket: None,
            id: None,
        }
    }

    /// Set where the entry goes.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Ask for an external id. Rejected ids are replaced.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Id prefix used when the allocator names this entry.
    pub fn id_prefix(&self) -> &'static str {
        match self.kind {
            EntryKind::Header => "time",
            EntryKind::Message => "msg",
        }
    }

    /// Check that a message has a body.
    ///
    /// # Errors
    /// `ListError::MalformedSpec` for a message without text or media. The
    /// caller substitutes [`PLACEHOLDER_TEXT`] rather than failing.
    pub fn validate(&self) -> Result<(), ListError> {
        if self.kind == EntryKind::Message && self.text.is_none() && self.media.is_none() {
            return Err(ListError::MalformedSpec(
                "message has neither text nor media".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_spec_validates() {
        assert!(EntrySpec::text(Side::Left, "hi").validate().is_ok());
    }

    #[test]
    fn bodiless_message_is_malformed() {
        let mut spec = EntrySpec::text(Side::Left, "x");
        spec.text = None;
        assert!(matches!(spec.validate(), Err(ListError::MalformedSpec(_))));
    }

    #[test]
    fn header_without_text_is_fine() {
        let spec = EntrySpec::header(TimeBucket::from_hm(9, 0).unwrap());
        assert!(spec.validate().is_ok());
        assert_eq!(spec.id_prefix(), "time");
    }

    #[test]
    fn builder_sets_location_and_id() {
        let spec = EntrySpec::text(Side::Right, "x")
            .at(Location::Top)
            .with_id("seed-1");
        assert_eq!(spec.location, Some(Location::Top));
        assert_eq!(spec.id.as_deref(), Some("seed-1"));
        assert_eq!(spec.id_prefix(), "msg");
    }

    #[test]
    fn media_spec_descriptor_copies_request() {
        let d = MediaSpec::sized("a.png", 260.0, 560.0).descriptor();
        assert_eq!(d.requested_width, Some(260.0));
        assert_eq!(d.asset_ref.as_str(), "a.png");
    }
}
