//! Audio decoding, encoding, and stitching.
//!
//! WAV I/O is built on the hound crate; the stitcher merges decoded
//! segments with an overlapping crossfade.

pub mod stitch;
pub mod wav;

// Re-export commonly used items
pub use stitch::stitch;
pub use wav::{read_wav, write_wav, AudioClip};
