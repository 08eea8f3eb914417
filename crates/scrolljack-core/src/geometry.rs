#![forbid(unsafe_code)]

//! Viewport geometry used by activation decisions.
//!
//! All values are CSS pixels. Rectangles are relative to the viewport (as
//! `getBoundingClientRect` reports them); offsets are relative to the page.
//! Every helper tolerates zero, negative, and non-finite inputs.

/// Fraction of the viewport height the region midpoint may drift from the
/// viewport midpoint and still count as centered.
pub const CENTER_TOLERANCE: f64 = 0.3;

/// Overlap above which a region activates even when not centered.
pub const DOMINANT_OVERLAP: f64 = 0.5;

/// Viewport heights above the viewport within which a region is "nearby".
pub const NEARBY_ABOVE: f64 = 0.5;

/// Viewport heights from the viewport top within which a region is "nearby".
pub const NEARBY_BELOW: f64 = 1.5;

/// Denominator used when the region reports no usable height.
pub const FALLBACK_HEIGHT_PX: f64 = 1000.0;

/// Region bounds relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionRect {
    /// Top edge; negative once the region has scrolled above the viewport.
    pub top: f64,
    /// Rendered height.
    pub height: f64,
}

impl RegionRect {
    #[inline]
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical midpoint.
    #[inline]
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Page-space placement of the region (`offsetTop` / `offsetHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetMetrics {
    pub top: f64,
    pub height: f64,
}

impl OffsetMetrics {
    #[inline]
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Height used to scale pixel deltas into progress.
    #[inline]
    #[must_use]
    pub fn effective_height(&self) -> f64 {
        effective_height(self.height)
    }
}

/// Browser viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// `window.innerHeight`.
    pub height: f64,
    /// `window.scrollY`.
    pub scroll_y: f64,
}

impl Viewport {
    #[inline]
    #[must_use]
    pub const fn new(height: f64, scroll_y: f64) -> Self {
        Self { height, scroll_y }
    }
}

/// `height` if it is a usable positive number, else [`FALLBACK_HEIGHT_PX`].
#[inline]
#[must_use]
pub fn effective_height(height: f64) -> f64 {
    if height.is_finite() && height > 0.0 {
        height
    } else {
        FALLBACK_HEIGHT_PX
    }
}

/// Visible height of the region clipped to the viewport, divided by the
/// larger of the region height and the viewport height.
///
/// Returns 0 for degenerate geometry. Never negative.
#[must_use]
pub fn overlap_ratio(rect: RegionRect, viewport_height: f64) -> f64 {
    let denom = rect.height.max(viewport_height);
    if !denom.is_finite() || denom <= 0.0 || !rect.top.is_finite() {
        return 0.0;
    }
    let visible_top = (-rect.top).max(0.0);
    let visible_bottom = (viewport_height - rect.top).max(0.0);
    let visible = visible_bottom.min(rect.height) - visible_top;
    (visible / denom).max(0.0)
}

/// Whether the region midpoint lies within [`CENTER_TOLERANCE`] viewport
/// heights of the viewport midpoint.
#[must_use]
pub fn is_centered(rect: RegionRect, viewport_height: f64) -> bool {
    let distance = (rect.center_y() - viewport_height / 2.0).abs();
    distance < viewport_height * CENTER_TOLERANCE
}

/// Whether the region is close enough to the viewport that the per-frame
/// activation check should keep running.
#[must_use]
pub fn is_nearby(rect: RegionRect, viewport_height: f64) -> bool {
    rect.bottom() > -viewport_height * NEARBY_ABOVE && rect.top < viewport_height * NEARBY_BELOW
}
