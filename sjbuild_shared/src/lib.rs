//! Shared dependencies of the `sjbuild` crates. The other crates in the
//! workspace import these through this crate so that the versions are
//! declared in exactly one place.

pub use chrono;
pub use indoc;
pub use log;
pub use pathdiff;
pub use thiserror;
pub use walkdir;
