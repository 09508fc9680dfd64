//! # Overview
//!
//! Crate for building the source assets of a game project into the formats
//! that the engine loads at runtime.
//!
//! This crate is based around the idea of two structurally mirrored directory
//! trees per asset root. One is the asset directory, which contains the
//! source assets as they are edited, and the other is the data directory,
//! which contains their compiled counterparts. For every source file there is
//! a corresponding file in the data directory at the same relative location,
//! usually with a different extension. The compilation itself is done by
//! external compiler executables which receive the input and output paths on
//! the command line.
//!
//! ## Example:
//!
//! **Asset Directory:**
//!
//! ```text
//! assets/
//! ├─ ui/
//! │  ├─ logo.png
//! ├─ world/
//! │  ├─ rock.obj
//! │  ├─ level1.scene
//! ```
//!
//! **Data Directory:**
//!
//! ```text
//! data/
//! ├─ ui/
//! │  ├─ logo.sj_tex
//! ├─ world/
//! │  ├─ rock.sj_mesh
//! │  ├─ level1.sj_scene
//! ```
//!
//! # Components
//!
//! A [`BuilderSpec`] describes one kind of asset as data: the file extensions
//! it claims, the compiler executable and the shape of its command line. An
//! [`AssetBuilder`] runs the pass of a single spec over the asset roots and
//! the [`BuildOrchestrator`] runs the passes of all specs, usually the
//! [standard ones](standard_specs) over the engine and game roots of a
//! [`BuildConfig`].

mod builder;
mod common;
mod compiler;
mod config;
mod discovery;
mod orchestrator;
mod paths;

pub use builder::*;
pub use common::{AssetRoot, Error, Result};
pub use compiler::*;
pub use config::*;
pub use discovery::discover;
pub use orchestrator::*;
pub use paths::{map_output_path, relative_path};
