//! Local tree access: walking the sync root, computing manifest keys, and
//! fingerprinting file content.

pub mod hasher;
pub mod path;
pub mod walker;
