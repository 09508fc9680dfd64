use std::path::{Component, Path, PathBuf};

use sjbuild_shared::pathdiff;

use crate::{Error, Result};

/// Returns the path of `file` relative to `asset_dir`, joined with forward
/// slashes so that the same file yields the same string on every platform.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use sjbuild::relative_path;
/// let relative = relative_path(Path::new("/project/assets"), Path::new("/project/assets/ui/logo.png")).unwrap();
/// assert_eq!(relative, "ui/logo.png");
/// ```
pub fn relative_path(asset_dir: &Path, file: &Path) -> Result<String> {
    let relative = pathdiff::diff_paths(file, asset_dir).ok_or_else(|| Error::PathNotInAssetDir {
        file: file.to_owned(),
        asset_dir: asset_dir.to_owned(),
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::InvalidPath(file.to_owned()))?;
                parts.push(part);
            }
            // Any other component means that `file` is the asset directory
            // itself or lies outside of it.
            _ => {
                return Err(Error::PathNotInAssetDir {
                    file: file.to_owned(),
                    asset_dir: asset_dir.to_owned(),
                })
            }
        }
    }
    if parts.is_empty() {
        return Err(Error::PathNotInAssetDir {
            file: file.to_owned(),
            asset_dir: asset_dir.to_owned(),
        });
    }
    Ok(parts.join("/"))
}

/// Maps `file`, which must be located below `asset_dir`, to the path of its
/// compiled counterpart below `data_dir`. The relative location is preserved.
/// When `new_extension` is given (without the leading dot), it replaces the
/// extension behind the last dot of the file name; otherwise the file name is
/// kept as it is.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use sjbuild::map_output_path;
/// let output = map_output_path(
///     Path::new("/project/assets"),
///     Path::new("/project/data"),
///     Path::new("/project/assets/ui/logo.png"),
///     Some("sj_tex"),
/// )
/// .unwrap();
/// assert_eq!(output, Path::new("/project/data/ui/logo.sj_tex"));
/// ```
pub fn map_output_path(asset_dir: &Path, data_dir: &Path, file: &Path, new_extension: Option<&str>) -> Result<PathBuf> {
    let relative = relative_path(asset_dir, file)?;
    let mut output = data_dir.join(relative);
    if let Some(extension) = new_extension {
        output.set_extension(extension);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_the_asset_dir() {
        let relative = relative_path(Path::new("/project/assets"), Path::new("/project/assets/world/rock.obj")).unwrap();
        assert_eq!(relative, "world/rock.obj");
    }

    #[test]
    fn relative_path_inverts_the_concatenation() {
        let asset_dir = Path::new("/project/assets");
        let file = Path::new("/project/assets/world/crates/wooden.obj");

        let relative = relative_path(asset_dir, file).unwrap();

        assert_eq!(asset_dir.join(relative), file);
    }

    #[test]
    fn file_outside_the_asset_dir_is_rejected() {
        let result = relative_path(Path::new("/project/assets"), Path::new("/elsewhere/rock.obj"));
        assert!(matches!(result, Err(Error::PathNotInAssetDir { .. })));
    }

    #[test]
    fn asset_dir_itself_is_rejected() {
        let result = relative_path(Path::new("/project/assets"), Path::new("/project/assets"));
        assert!(matches!(result, Err(Error::PathNotInAssetDir { .. })));
    }

    #[test]
    fn map_output_path_swaps_the_extension() {
        let output = map_output_path(
            Path::new("/project/assets"),
            Path::new("/project/data"),
            Path::new("/project/assets/ui/logo.png"),
            Some("sj_tex"),
        )
        .unwrap();
        assert_eq!(output, Path::new("/project/data/ui/logo.sj_tex"));
    }

    #[test]
    fn map_output_path_keeps_the_extension_when_none_is_given() {
        let output = map_output_path(
            Path::new("/project/assets"),
            Path::new("/project/data"),
            Path::new("/project/assets/shaders/triangle.vert"),
            None,
        )
        .unwrap();
        assert_eq!(output, Path::new("/project/data/shaders/triangle.vert"));
    }

    #[test]
    fn map_output_path_replaces_only_the_last_extension() {
        let output = map_output_path(
            Path::new("/project/assets"),
            Path::new("/project/data"),
            Path::new("/project/assets/env/sky.day.png"),
            Some("sj_tex"),
        )
        .unwrap();
        assert_eq!(output, Path::new("/project/data/env/sky.day.sj_tex"));
    }
}
