use std::path::{Path, PathBuf};

use sjbuild_shared::log::{error, info};

use crate::{compiler::CompilerInvoker, discovery::discover, paths::map_output_path, AssetRoot};

/// Describes one kind of asset build pass. The kinds differ only in data:
/// which file extensions are picked up, which compiler executable is run and
/// how its command line is shaped. Adding a new asset kind therefore means
/// adding a value, not a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSpec {
    /// Name of the builder as it appears in log messages, e.g. `"Texture Builder"`.
    pub name: String,
    /// File extensions without the leading dot, e.g. `["jpg", "png"]`.
    pub extensions: Vec<String>,
    /// Path to the compiler executable.
    pub compiler: PathBuf,
    /// Extension of the compiled file without the leading dot. `None` keeps
    /// the extension of the source file.
    pub output_extension: Option<String>,
    /// Argument template for the compiler. The placeholders `{input}` and
    /// `{output}` are replaced per file.
    pub args: Vec<String>,
}

impl BuilderSpec {
    /// Creates a new [`BuilderSpec`] with the default argument template
    /// `{input} {output}`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sjbuild::BuilderSpec;
    /// let spec = BuilderSpec::new("Texture Builder", &["jpg", "png"], "tools/TextureBuilder", Some("sj_tex"));
    /// assert_eq!(spec.patterns(), vec!["*.jpg", "*.png"]);
    /// ```
    pub fn new(name: impl Into<String>, extensions: &[&str], compiler: impl Into<PathBuf>, output_extension: Option<&str>) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|extension| extension.to_string()).collect(),
            compiler: compiler.into(),
            output_extension: output_extension.map(|extension| extension.to_owned()),
            args: vec!["{input}".to_owned(), "{output}".to_owned()],
        }
    }

    /// Replaces the argument template.
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    /// File name patterns for the discovery, one per extension.
    pub fn patterns(&self) -> Vec<String> {
        self.extensions.iter().map(|extension| format!("*.{extension}")).collect()
    }
}

/// The standard asset kinds of a project, wired to their compilers below
/// `builders_bin_dir`. Every compiler lives at
/// `<builders_bin_dir>/<name>/Release/<name>` with the platform's executable
/// extension, e.g. `tools/bin/TextureBuilder/Release/TextureBuilder.exe`.
pub fn standard_specs(builders_bin_dir: &Path) -> Vec<BuilderSpec> {
    vec![
        // The shader compiler derives the artifact name itself by appending
        // `.spv` to the output path, which keeps `.vert` and `.frag` files
        // with the same stem from colliding.
        BuilderSpec::new("Shader Builder", &["vert", "frag"], builder_executable(builders_bin_dir, "ShaderBuilder"), None)
            .with_args(&["{input}", "-o", "{output}.spv"]),
        BuilderSpec::new(
            "Texture Builder",
            &["jpg", "png"],
            builder_executable(builders_bin_dir, "TextureBuilder"),
            Some("sj_tex"),
        ),
        BuilderSpec::new("Model Builder", &["obj"], builder_executable(builders_bin_dir, "ModelBuilder"), Some("sj_mesh")),
        BuilderSpec::new("Scene Builder", &["scene"], builder_executable(builders_bin_dir, "SceneBuilder"), Some("sj_scene")),
    ]
}

fn builder_executable(builders_bin_dir: &Path, name: &str) -> PathBuf {
    builders_bin_dir
        .join(name)
        .join("Release")
        .join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

/// Result of the build attempt for a single discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildItemResult {
    pub input: PathBuf,
    /// Path of the compiled counterpart. `None` when the output path could
    /// not be determined, in which case the compiler was never invoked.
    pub output: Option<PathBuf>,
    pub success: bool,
    /// Exit code of the compiler. `None` when the compiler could not be
    /// launched or did not exit on its own.
    pub exit_code: Option<i32>,
}

/// Aggregated result of a builder's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Whether every discovered file was built successfully.
    pub completed: bool,
    /// Number of compiler invocations that were attempted.
    pub items_processed: usize,
    /// The failure that aborted the pass, when there is one.
    pub first_failure: Option<BuildItemResult>,
}

impl BuildOutcome {
    fn aborted() -> Self {
        Self {
            completed: false,
            items_processed: 0,
            first_failure: None,
        }
    }
}

/// Runs the build pass of one [`BuilderSpec`] over asset roots.
pub struct AssetBuilder {
    spec: BuilderSpec,
    invoker: CompilerInvoker,
}

impl AssetBuilder {
    pub fn new(spec: BuilderSpec) -> Self {
        Self {
            spec,
            invoker: CompilerInvoker::new(),
        }
    }

    /// Replaces the [`CompilerInvoker`] that runs the compiler processes.
    pub fn with_invoker(mut self, invoker: CompilerInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn spec(&self) -> &BuilderSpec {
        &self.spec
    }

    /// Builds every matching file below the asset directory of `root`. The
    /// pass stops at the first file that fails to build; the files behind it
    /// are not attempted.
    pub fn build_root(&self, root: &AssetRoot) -> BuildOutcome {
        let files = match discover(root.asset_dir(), &self.spec.patterns()) {
            Ok(files) => files,
            Err(err) => {
                error!(
                    "{}: failed to discover items in '{}': {err}",
                    self.spec.name,
                    root.asset_dir().display()
                );
                return BuildOutcome::aborted();
            }
        };
        info!(
            "{}: found {} item(s) in '{}'",
            self.spec.name,
            files.len(),
            root.asset_dir().display()
        );

        let mut outcome = BuildOutcome {
            completed: true,
            items_processed: 0,
            first_failure: None,
        };
        for file in &files {
            let output = match map_output_path(root.asset_dir(), root.data_dir(), file, self.spec.output_extension.as_deref()) {
                Ok(output) => output,
                Err(err) => {
                    error!("Failed to determine the output path for '{}': {err}", file.display());
                    outcome.first_failure = Some(BuildItemResult {
                        input: file.clone(),
                        output: None,
                        success: false,
                        exit_code: None,
                    });
                    outcome.completed = false;
                    break;
                }
            };

            info!("Building item '{}'", file.display());
            outcome.items_processed += 1;
            match self.invoker.invoke(&self.spec.compiler, &self.spec.args, file, &output) {
                Ok(result) if result.is_success() => {}
                Ok(result) => {
                    let exit_code = result
                        .exit_code
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "no exit code".to_owned());
                    error!(
                        "Failed to build item '{}': compiler exited with {exit_code}. Aborting the pass over this root",
                        file.display()
                    );
                    if !result.stderr.is_empty() {
                        error!("Compiler stderr:\n{}", result.stderr.trim_end());
                    }
                    outcome.first_failure = Some(BuildItemResult {
                        input: file.clone(),
                        output: Some(output),
                        success: false,
                        exit_code: result.exit_code,
                    });
                    outcome.completed = false;
                    break;
                }
                Err(err) => {
                    error!(
                        "Failed to run the compiler for item '{}': {err}. Aborting the pass over this root",
                        file.display()
                    );
                    outcome.first_failure = Some(BuildItemResult {
                        input: file.clone(),
                        output: Some(output),
                        success: false,
                        exit_code: None,
                    });
                    outcome.completed = false;
                    break;
                }
            }
        }
        outcome
    }

    /// Builds every root in order. The roots are independent of each other: a
    /// pass that is aborted in one root does not prevent the following roots
    /// from being built.
    pub fn build_all(&self, roots: &[AssetRoot]) -> BuildOutcome {
        let mut merged = BuildOutcome {
            completed: true,
            items_processed: 0,
            first_failure: None,
        };
        for root in roots {
            info!("{}: building the '{}' root", self.spec.name, root.label());
            let outcome = self.build_root(root);
            merged.completed &= outcome.completed;
            merged.items_processed += outcome.items_processed;
            if merged.first_failure.is_none() {
                merged.first_failure = outcome.first_failure;
            }
        }
        merged
    }
}
