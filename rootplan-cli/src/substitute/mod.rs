//! Literal and pattern text replacement for a single file.

mod file;
mod flags;
mod replacer;

pub use file::{compute_replacement, write_atomic, FileReplacement, DEFAULT_MAX_FILE_BYTES};
pub use flags::{compile_pattern, translate_template};
pub use replacer::{Substituted, Substitution};
