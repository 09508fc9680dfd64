use std::{
    fs, io,
    path::{Path, PathBuf},
    result,
    time::Duration,
};

use sjbuild_shared::thiserror;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Asset directory not found: {0}")]
    AssetDirNotFound(PathBuf),
    #[error("File '{file}' is not located in the asset directory '{asset_dir}'")]
    PathNotInAssetDir { file: PathBuf, asset_dir: PathBuf },
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
    #[error("Failed to launch the compiler '{compiler}': {source}")]
    CompilerLaunch { compiler: PathBuf, source: io::Error },
    #[error("Compiler '{compiler}' was killed because it ran longer than {timeout:?}")]
    CompilerTimeout { compiler: PathBuf, timeout: Duration },
    #[error("Invalid build config '{path}': {message}")]
    InvalidConfig { path: PathBuf, message: String },
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
}

/// One pair of mirrored directory trees: the asset directory that is searched
/// for source assets and the data directory that receives their compiled
/// counterparts at the same relative locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    label: String,
    asset_dir: PathBuf,
    data_dir: PathBuf,
}

impl AssetRoot {
    /// Creates a new [`AssetRoot`] without touching the filesystem.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sjbuild::AssetRoot;
    /// let root = AssetRoot::new("game", "game/assets", "game/data");
    /// assert_eq!(root.label(), "game");
    /// ```
    pub fn new(label: impl Into<String>, asset_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            asset_dir: asset_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Creates the data directory and checks that the asset directory exists.
    pub fn create_all_dir(label: impl Into<String>, asset_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let root = Self::new(label, asset_dir, data_dir);
        root.check()?;
        fs::create_dir_all(&root.data_dir)?;
        Ok(root)
    }

    /// Checks that the asset directory exists. The data directory is not
    /// checked because it is created on demand.
    pub fn check(&self) -> Result<()> {
        if !self.asset_dir.is_dir() {
            return Err(Error::AssetDirNotFound(self.asset_dir.clone()));
        }
        Ok(())
    }

    /// Name of the root as it appears in log messages, e.g. `"engine"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Directory that is searched for source assets.
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Directory that receives the compiled assets.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
