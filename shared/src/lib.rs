//! Shared types for the mapdeck game catalog.
//!
//! Plain data used by the scanner, the CLI, and anything that later loads a
//! selected game: the parsed [`Descriptor`], engine versions, and a few
//! filesystem helpers.

pub mod constants;
pub mod descriptor;
pub mod fs;
pub mod version;

pub use constants::*;
pub use descriptor::Descriptor;
pub use fs::{MAX_DESCRIPTOR_BYTES, read_file_with_limit, read_to_end_with_limit};
pub use version::{ENGINE_VERSION, EngineVersion, VersionParseError, engine_version};
