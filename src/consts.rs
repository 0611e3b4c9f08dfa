//! Shared numeric constants for the painter crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Lowest allowed viewport scale; the page is never shown smaller than its natural size.
pub const MIN_SCALE: f64 = 1.0;

/// Fractional scale change applied per wheel notch (`scale × (1 ± ZOOM_STEP)`).
pub const ZOOM_STEP: f64 = 0.2;

/// Wheel zoom results are rounded to this many decimal places.
pub const SCALE_DECIMALS: i32 = 2;

// ── Snapshots ───────────────────────────────────────────────────

/// Separator between the parts of a persisted snapshot key.
pub const KEY_SEPARATOR: char = ':';

/// Escapes a literal separator (or itself) inside a key part.
pub const KEY_ESCAPE: char = '\\';
