//! Filesystem module.
//!
//! Provides:
//! - Target directory management
//! - Filename generation and manipulation

pub mod naming;
pub mod paths;

pub use naming::{
    disambiguate_filename, media_filename, media_stem, sanitize_filename,
    sanitize_path_component, timestamp_prefix,
};
pub use paths::{ensure_dir, target_directory};
