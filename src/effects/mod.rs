//! Pixel stages of the sticker pipeline
//!
//! - `border`: soft solid-color halo composited behind the subject
//! - `gloss`: additive highlight over the top of the subject
//! - `flatten`: paste onto an opaque background and encode PNG

pub mod border;
pub mod flatten;
pub mod gloss;

pub use border::{add_border, border_mask};
pub use flatten::{encode_png, flatten, flatten_to_rgb};
pub use gloss::{apply_gloss, highlight_mask};
