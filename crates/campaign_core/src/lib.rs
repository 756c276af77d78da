//! Read and write campaign save files.
//!
//! A save is a fixed 0x500-byte header followed by 38 length-prefixed
//! segments, each stored under a zero-run-length codec. Segment 2 carries
//! string tables and the hashed dvar table.

pub mod campaign;
pub mod checksum;
pub mod codec;
pub mod core_api;
pub mod hash;
pub mod layout;
pub mod reader;
pub mod segment2;
