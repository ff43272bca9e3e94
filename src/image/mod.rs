//! Rendering helpers for producing PNG code images.

mod paint;

pub use paint::{CodeImageOptions, QUIET_ZONE_MODULES, render_code_image, save_code_image};
