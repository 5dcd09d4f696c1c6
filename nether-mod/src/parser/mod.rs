//! MOD file parser
//!
//! - `read` - decoding a MOD image into a [`TrackerModule`](nether_tracker::TrackerModule)
//! - `tests` - parser tests over synthesized files

mod read;


pub use read::{decode_effect, decode_note, parse_mod};
