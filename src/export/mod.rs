//! Output artifacts: the key-to-asset JSON map and expanded HTML templates.

pub mod map;
pub mod templates;
