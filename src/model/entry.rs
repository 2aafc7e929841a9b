//! List entries: time dividers and chat messages.
//!
//! Entries are immutable after insertion except for the media settlement,
//! which moves exactly once from `Pending` to `Settled`.

use super::identifiers::EntryId;
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

/// Kind of list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Time divider.
    Header,
    /// Text or media message.
    Message,
}

/// Which side of the list a message is drawn on. Affects rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Incoming side.
    Left,
    /// Outgoing side.
    Right,
}

/// Width/height pair in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoxSize {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl BoxSize {
    /// Size from its two extents.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height; `None` for degenerate boxes.
    pub fn ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    /// True if either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Minute-granular clock time used to deduplicate time dividers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket(NaiveTime);

impl TimeBucket {
    /// Bucket for an hour/minute pair; `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Bucket containing the given time (seconds are dropped).
    pub fn containing(time: NaiveTime) -> Self {
        // hour/minute come from a valid time, so this cannot fail
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }

    /// Start of the bucket.
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// Divider label, e.g. `9:05 AM`.
    pub fn label(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Reference to an external asset (image source).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wrap a raw asset reference.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a media message asks for before its asset is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescriptor {
    /// Width the request asked for, if any.
    pub requested_width: Option<f64>,
    /// Height the request asked for, if any.
    pub requested_height: Option<f64>,
    /// Where the asset comes from.
    pub asset_ref: AssetRef,
}

impl MediaDescriptor {
    /// Descriptor without a requested size.
    pub fn new(asset_ref: AssetRef) -> Self {
        Self {
            requested_width: None,
            requested_height: None,
            asset_ref,
        }
    }

    /// Add the size the request asked for.
    pub fn with_requested(mut self, width: f64, height: f64) -> Self {
        self.requested_width = Some(width);
        self.requested_height = Some(height);
        self
    }

    /// Requested size, if both dimensions are present and usable.
    pub fn requested(&self) -> Option<BoxSize> {
        match (self.requested_width, self.requested_height) {
            (Some(w), Some(h)) => Some(BoxSize::new(w, h)).filter(|b| !b.is_degenerate()),
            _ => None,
        }
    }
}

/// Intrinsic size state of a media entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SizeState {
    /// Asset has not reported its intrinsic size yet.
    Pending,
    /// Terminal state.
    Settled {
        /// Intrinsic width.
        width: f64,
        /// Intrinsic height.
        height: f64,
    },
}

/// How a settlement was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleOutcome {
    /// The asset reported a usable size.
    Loaded,
    /// The asset failed or timed out; the square fallback was applied.
    Fallback,
}

/// One-shot settlement of a media entry's rendered box.
///
/// Starts `Pending` with a reserved placeholder box and resolves exactly
/// once; later resolutions are rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    state: SizeState,
    display: BoxSize,
    outcome: Option<SettleOutcome>,
}

impl Settlement {
    /// Pending settlement holding the reserved placeholder.
    pub fn pending(placeholder: BoxSize) -> Self {
        Self {
            state: SizeState::Pending,
            display: placeholder,
            outcome: None,
        }
    }

    /// Pending or settled with the intrinsic size.
    pub fn state(&self) -> SizeState {
        self.state
    }

    /// Box currently reserved in the layout.
    pub fn display(&self) -> BoxSize {
        self.display
    }

    /// How the settlement was reached, once it was.
    pub fn outcome(&self) -> Option<SettleOutcome> {
        self.outcome
    }

    /// Whether the asset has not reported yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, SizeState::Pending)
    }

    /// Intrinsic size once settled.
    pub fn intrinsic(&self) -> Option<BoxSize> {
        match self.state {
            SizeState::Pending => None,
            SizeState::Settled { width, height } => Some(BoxSize::new(width, height)),
        }
    }

    /// Resolve with the intrinsic size and final box.
    ///
    /// Returns `false` (and changes nothing) if already settled.
    pub fn resolve(&mut self, intrinsic: BoxSize, display: BoxSize, outcome: SettleOutcome) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = SizeState::Settled {
            width: intrinsic.width,
            height: intrinsic.height,
        };
        self.display = display;
        self.outcome = Some(outcome);
        true
    }

    /// Replace the rendered box of a settled entry (container resize).
    pub(crate) fn refit(&mut self, display: BoxSize) {
        self.display = display;
    }
}

/// A media message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    descriptor: MediaDescriptor,
    settlement: Settlement,
}

impl Media {
    /// Pending media reserving `placeholder`.
    pub fn new(descriptor: MediaDescriptor, placeholder: BoxSize) -> Self {
        Self {
            descriptor,
            settlement: Settlement::pending(placeholder),
        }
    }

    /// What was requested.
    pub fn descriptor(&self) -> &MediaDescriptor {
        &self.descriptor
    }

    /// Size state of the asset.
    pub fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    /// Mutable size state, for the settlement coordinator.
    pub fn settlement_mut(&mut self) -> &mut Settlement {
        &mut self.settlement
    }
}

/// Entry payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Divider label.
    Label {
        /// Label text.
        text: String,
    },
    /// Immutable text body.
    Text {
        /// Body text.
        text: String,
    },
    /// Image body.
    Media(Media),
}

/// An addressable unit of the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    id: EntryId,
    kind: EntryKind,
    side: Option<Side>,
    content: Content,
    #[serde(skip)]
    bucket: Option<TimeBucket>,
}

impl Entry {
    /// Time divider for a bucket.
    pub fn header(id: EntryId, bucket: TimeBucket) -> Self {
        Self {
            id,
            kind: EntryKind::Header,
            side: None,
            content: Content::Label {
                text: bucket.label(),
            },
            bucket: Some(bucket),
        }
    }

    /// Divider with a free-form label and no dedup bucket.
    pub fn labelled_header(id: EntryId, label: impl Into<String>) -> Self {
        Self {
            id,
            kind: EntryKind::Header,
            side: None,
            content: Content::Label { text: label.into() },
            bucket: None,
        }
    }

    /// Text message.
    pub fn text(id: EntryId, side: Side, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: EntryKind::Message,
            side: Some(side),
            content: Content::Text { text: text.into() },
            bucket: None,
        }
    }

    /// Media message reserving `placeholder` until its asset reports.
    pub fn media_message(
        id: EntryId,
        side: Side,
        descriptor: MediaDescriptor,
        placeholder: BoxSize,
    ) -> Self {
        Self {
            id,
            kind: EntryKind::Message,
            side: Some(side),
            content: Content::Media(Media::new(descriptor, placeholder)),
            bucket: None,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &EntryId {
        &self.id
    }

    /// Same entry under another id.
    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }

    /// Prefix used when allocating an id for this kind of entry.
    pub fn id_prefix(&self) -> &'static str {
        match self.kind {
            EntryKind::Header => "time",
            EntryKind::Message => "msg",
        }
    }

    /// Header or message.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Side of a message; `None` for headers.
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// What the entry shows.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Dedup bucket of a time header.
    pub fn bucket(&self) -> Option<TimeBucket> {
        self.bucket
    }

    /// Whether this is a divider.
    pub fn is_header(&self) -> bool {
        self.kind == EntryKind::Header
    }

    /// Media content, if the entry carries an image.
    pub fn media(&self) -> Option<&Media> {
        match &self.content {
            Content::Media(media) => Some(media),
            _ => None,
        }
    }

    /// Mutable media content.
    pub fn media_mut(&mut self) -> Option<&mut Media> {
        match &mut self.content {
            Content::Media(media) => Some(media),
            _ => None,
        }
    }

    /// Text entries are always settled; media entries until their asset reports.
    pub fn size_state(&self) -> Option<SizeState> {
        self.media().map(|m| m.settlement().state())
    }

    /// Whether a media entry still waits for its asset.
    pub fn is_pending(&self) -> bool {
        self.media().is_some_and(|m| m.settlement().is_pending())
    }

    /// Text shown for the entry, if any.
    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            Content::Label { text } | Content::Text { text } => Some(text),
            Content::Media(_) => None,
        }
    }
}
