//! Asset settlement coordinator.
//!
//! Media entries enter the list with a reserved placeholder box and are
//! finalized exactly once, either from the asset's intrinsic size or from
//! the square fallback when the asset fails. Every box this module produces
//! is a uniform scale of the source size, so the aspect ratio is kept.

use crate::model::{BoxSize, EntryId, ListError, Media, MediaDescriptor, SettleOutcome};
use crate::view_state::Viewport;

/// Width cap for media boxes in layout units.
pub const DEFAULT_MEDIA_MAX_WIDTH: f64 = 320.0;
/// Fraction of the container width a media box may take.
pub const DEFAULT_MEDIA_WIDTH_FRACTION: f64 = 0.6;
/// Fraction of the viewport height a media box may take.
pub const DEFAULT_MEDIA_MAX_HEIGHT_FRACTION: f64 = 0.6;
/// Height per unit of width of the placeholder when no size was requested (4:3).
pub const PLACEHOLDER_HEIGHT_PER_WIDTH: f64 = 0.75;
/// Width/height of the box applied when an asset fails.
pub const FALLBACK_ASPECT: f64 = 1.0;

/// Sizing limits for media boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaPolicy {
    /// Upper bound on media width in layout units.
    pub max_width: f64,
    /// Width limit as a fraction of the container width.
    pub width_fraction: f64,
    /// Height limit as a fraction of the container height.
    pub max_height_fraction: f64,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MEDIA_MAX_WIDTH,
            width_fraction: DEFAULT_MEDIA_WIDTH_FRACTION,
            max_height_fraction: DEFAULT_MEDIA_MAX_HEIGHT_FRACTION,
        }
    }
}

impl MediaPolicy {
    /// Largest box a media entry may occupy in this viewport.
    pub fn limits(&self, viewport: Viewport) -> BoxSize {
        BoxSize::new(
            self.max_width.min(self.width_fraction * viewport.width),
            self.max_height_fraction * viewport.height,
        )
    }
}

/// Result of an asset-ready event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Readiness {
    /// First report: the box was finalized.
    Settled(BoxSize),
    /// The entry was already settled; nothing changed.
    AlreadySettled,
}

/// Reserves and finalizes media boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementCoordinator {
    policy: MediaPolicy,
}

impl SettlementCoordinator {
    /// Coordinator with the given limits.
    pub fn new(policy: MediaPolicy) -> Self {
        Self { policy }
    }

    /// Configured limits.
    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    /// Scale `source` uniformly so it fits the limits. Never upscales.
    ///
    /// Non-positive limits (a zero-sized viewport) are ignored rather than
    /// collapsing the box.
    pub fn fit(&self, source: BoxSize, viewport: Viewport) -> BoxSize {
        if source.is_degenerate() {
            return source;
        }
        let limits = self.policy.limits(viewport);
        let mut scale: f64 = 1.0;
        if limits.width > 0.0 {
            scale = scale.min(limits.width / source.width);
        }
        if limits.height > 0.0 {
            scale = scale.min(limits.height / source.height);
        }
        BoxSize::new(source.width * scale, source.height * scale)
    }

    /// Placeholder box for a media entry that has not loaded yet.
    ///
    /// Uses the requested size when one was given, otherwise a 4:3 box at
    /// the width limit. Either way the later finalize step is the only
    /// resize the entry goes through.
    pub fn reserve(&self, descriptor: &MediaDescriptor, viewport: Viewport) -> BoxSize {
        let source = descriptor.requested().unwrap_or_else(|| {
            let width = self.policy.limits(viewport).width.max(1.0);
            BoxSize::new(width, width * PLACEHOLDER_HEIGHT_PER_WIDTH)
        });
        self.fit(source, viewport)
    }

    /// Apply an intrinsic size reported by the asset.
    ///
    /// # Errors
    /// `ListError::AssetLoadFailure` when the reported size is unusable
    /// (zero, negative or not finite). The caller applies the fallback.
    pub fn on_asset_ready(
        &self,
        id: &EntryId,
        media: &mut Media,
        intrinsic: BoxSize,
        viewport: Viewport,
    ) -> Result<Readiness, ListError> {
        if !media.settlement().is_pending() {
            return Ok(Readiness::AlreadySettled);
        }
        if intrinsic.is_degenerate() {
            return Err(ListError::AssetLoadFailure {
                id: id.clone(),
                reason: format!(
                    "unusable intrinsic size {}x{}",
                    intrinsic.width, intrinsic.height
                ),
            });
        }
        let display = self.fit(intrinsic, viewport);
        media
            .settlement_mut()
            .resolve(intrinsic, display, SettleOutcome::Loaded);
        Ok(Readiness::Settled(display))
    }

    /// Settle a failed asset with the square fallback box.
    ///
    /// Returns `None` if the entry had already settled.
    pub fn on_asset_failed(&self, media: &mut Media, viewport: Viewport) -> Option<BoxSize> {
        if !media.settlement().is_pending() {
            return None;
        }
        let limits = self.policy.limits(viewport);
        let side = limits.width.min(limits.height * FALLBACK_ASPECT).max(1.0);
        let fallback = BoxSize::new(side, side / FALLBACK_ASPECT);
        let display = self.fit(fallback, viewport);
        media
            .settlement_mut()
            .resolve(fallback, display, SettleOutcome::Fallback);
        Some(display)
    }

    /// Recompute a media box after the container changed size.
    ///
    /// Settled entries are re-fit from their intrinsic size; pending ones
    /// get a fresh placeholder.
    pub fn refit(&self, media: &mut Media, viewport: Viewport) {
        let display = match media.settlement().intrinsic() {
            Some(intrinsic) => self.fit(intrinsic, viewport),
            None => self.reserve(media.descriptor(), viewport),
        };
        media.settlement_mut().refit(display);
    }
}

/// Relative ratio deviation of `display` from `intrinsic`, in percent.
pub fn aspect_diff_percent(intrinsic: BoxSize, display: BoxSize) -> Option<f64> {
    let natural = intrinsic.ratio()?;
    let shown = display.ratio()?;
    Some((shown - natural).abs() / natural * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetRef;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn id() -> EntryId {
        EntryId::new("msg-101").unwrap()
    }

    fn pending(requested: Option<(f64, f64)>) -> Media {
        let mut descriptor = MediaDescriptor::new(AssetRef::new("a"));
        if let Some((w, h)) = requested {
            descriptor = descriptor.with_requested(w, h);
        }
        let placeholder = SettlementCoordinator::default().reserve(&descriptor, viewport());
        Media::new(descriptor, placeholder)
    }

    #[test]
    fn limits_follow_container() {
        let policy = MediaPolicy::default();
        assert_eq!(policy.limits(viewport()), BoxSize::new(320.0, 360.0));
        assert_eq!(
            policy.limits(Viewport::new(400.0, 600.0)),
            BoxSize::new(240.0, 360.0)
        );
    }

    #[test]
    fn fit_never_upscales() {
        let c = SettlementCoordinator::default();
        assert_eq!(c.fit(BoxSize::new(100.0, 50.0), viewport()), BoxSize::new(100.0, 50.0));
    }

    #[test]
    fn fit_scales_wide_image_by_width() {
        let c = SettlementCoordinator::default();
        assert_eq!(c.fit(BoxSize::new(640.0, 320.0), viewport()), BoxSize::new(320.0, 160.0));
    }

    #[test]
    fn fit_scales_tall_image_by_height() {
        let c = SettlementCoordinator::default();
        let b = c.fit(BoxSize::new(260.0, 720.0), viewport());
        assert_eq!(b.height, 360.0);
        assert_eq!(b.width, 130.0);
    }

    #[test]
    fn reserve_uses_requested_size() {
        let c = SettlementCoordinator::default();
        let d = MediaDescriptor::new(AssetRef::new("a")).with_requested(200.0, 100.0);
        assert_eq!(c.reserve(&d, viewport()), BoxSize::new(200.0, 100.0));
    }

    #[test]
    fn reserve_defaults_to_four_by_three() {
        let c = SettlementCoordinator::default();
        let d = MediaDescriptor::new(AssetRef::new("a"));
        assert_eq!(c.reserve(&d, viewport()), BoxSize::new(320.0, 240.0));
    }

    #[test]
    fn ready_settles_once() {
        let c = SettlementCoordinator::default();
        let mut media = pending(None);

        let first = c.on_asset_ready(&id(), &mut media, BoxSize::new(300.0, 150.0), viewport());
        let second = c.on_asset_ready(&id(), &mut media, BoxSize::new(10.0, 90.0), viewport());

        assert_eq!(first, Ok(Readiness::Settled(BoxSize::new(300.0, 150.0))));
        assert_eq!(second, Ok(Readiness::AlreadySettled));
        assert_eq!(media.settlement().display(), BoxSize::new(300.0, 150.0));
    }

    #[test]
    fn degenerate_ready_is_an_asset_failure() {
        let c = SettlementCoordinator::default();
        let mut media = pending(None);
        let result = c.on_asset_ready(&id(), &mut media, BoxSize::new(0.0, 10.0), viewport());
        assert!(matches!(result, Err(ListError::AssetLoadFailure { .. })));
        assert!(media.settlement().is_pending());
    }

    #[test]
    fn failure_applies_square_fallback() {
        let c = SettlementCoordinator::default();
        let mut media = pending(Some((200.0, 100.0)));

        let display = c.on_asset_failed(&mut media, viewport()).unwrap();

        assert_eq!(display, BoxSize::new(320.0, 320.0));
        assert_eq!(media.settlement().outcome(), Some(SettleOutcome::Fallback));
        assert!(!media.settlement().is_pending());
    }

    #[test]
    fn failure_after_ready_is_ignored() {
        let c = SettlementCoordinator::default();
        let mut media = pending(None);
        c.on_asset_ready(&id(), &mut media, BoxSize::new(100.0, 100.0), viewport())
            .unwrap();
        assert_eq!(c.on_asset_failed(&mut media, viewport()), None);
        assert_eq!(media.settlement().outcome(), Some(SettleOutcome::Loaded));
    }

    #[test]
    fn refit_shrinks_settled_box_on_narrow_container() {
        let c = SettlementCoordinator::default();
        let mut media = pending(None);
        c.on_asset_ready(&id(), &mut media, BoxSize::new(300.0, 150.0), viewport())
            .unwrap();

        c.refit(&mut media, Viewport::new(250.0, 600.0));

        assert_eq!(media.settlement().display(), BoxSize::new(150.0, 75.0));
    }

    #[test]
    fn aspect_diff_of_uniform_scale_is_zero() {
        let d = aspect_diff_percent(BoxSize::new(300.0, 200.0), BoxSize::new(150.0, 100.0));
        assert_eq!(d, Some(0.0));
        assert_eq!(aspect_diff_percent(BoxSize::new(0.0, 1.0), BoxSize::new(1.0, 1.0)), None);
    }
}
