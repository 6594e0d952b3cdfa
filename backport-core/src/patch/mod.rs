//! Line-range patching.
//!
//! A patch instruction names a file, a 1-based inclusive line range and a
//! flush-left replacement block. The block is indented to match the first
//! line of the range and spliced in; the file is then written back in full.

mod applicator;
mod error;
mod path;

pub use applicator::{
    RangeViolation, apply_line_range, indent_block, leading_indentation, splice_range,
    split_lines,
};
pub use error::PatchError;
pub use path::resolve_target;
