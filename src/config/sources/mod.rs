//! Configuration sources, in the order they are layered.

pub mod environment;
pub mod global_file;
pub mod local_file;
