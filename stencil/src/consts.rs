//! Shared constants for the stencil crate.

// ── Text layout ─────────────────────────────────────────────────

/// Line advance between wrapped lines, in ems.
pub const LINE_HEIGHT: f64 = 1.2;

/// Average glyph advance per display column, in ems, for width estimates.
pub const WIDTH_FACTOR: f64 = 0.55;

/// Font size assumed when an element declares none.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

// ── Generation ──────────────────────────────────────────────────

/// Longest value a generation rule may produce, in characters. Directive
/// counts, fills and legacy padding are clamped to it.
pub const MAX_GENERATED_LEN: usize = 10_000;

// ── Live preview ────────────────────────────────────────────────

/// Outline drawn around the highlighted element.
pub const HIGHLIGHT_OUTLINE: &str = "2px solid #2563eb";

/// Gap between the highlight outline and the element.
pub const HIGHLIGHT_OFFSET: &str = "2px";

// ── Editor ──────────────────────────────────────────────────────

/// Batches kept on the undo stack before the oldest is dropped.
pub const HISTORY_LIMIT: usize = 500;
