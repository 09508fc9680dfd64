use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{AssetRoot, Error, Result};

/// Directory layout of a build, read from a YAML file.
///
/// ```yaml
/// engine_asset_dir: engine/assets
/// engine_data_dir: engine/data
/// game_asset_dir: game/assets
/// game_data_dir: game/data
/// builders_bin_dir: tools/bin
/// ```
///
/// Relative paths are interpreted relative to the working directory of the
/// process, not relative to the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub engine_asset_dir: PathBuf,
    pub engine_data_dir: PathBuf,
    pub game_asset_dir: PathBuf,
    pub game_data_dir: PathBuf,
    pub builders_bin_dir: PathBuf,
}

impl BuildConfig {
    /// Reads the config from the YAML file at `path`.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|err| Error::InvalidConfig {
            path: path.as_ref().to_owned(),
            message: err.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|err| Error::InvalidConfig {
            path: path.as_ref().to_owned(),
            message: err.to_string(),
        })
    }

    /// The engine and game roots in the order in which they are built.
    pub fn asset_roots(&self) -> Vec<AssetRoot> {
        vec![
            AssetRoot::new("engine", self.engine_asset_dir.clone(), self.engine_data_dir.clone()),
            AssetRoot::new("game", self.game_asset_dir.clone(), self.game_data_dir.clone()),
        ]
    }

    /// Creates the engine and game data directories. Directories that already
    /// exist are left as they are.
    pub fn create_output_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.engine_data_dir)?;
        fs::create_dir_all(&self.game_data_dir)?;
        Ok(())
    }
}
