use std::{
    fs,
    io::Read,
    path::Path,
    process::{Child, Command, Output, Stdio},
    thread,
    time::{Duration, Instant},
};

use sjbuild_shared::log::{debug, trace};

use crate::{Error, Result};

/// Interval in which a child process with a timeout is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured completion state of one compiler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code of the process. `None` when the process was terminated by a
    /// signal instead of exiting on its own.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    /// Returns whether the compiler reported success, which is an exit code of 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches external compiler processes and waits for their completion.
///
/// The compilers are ordinary executables that receive the input and output
/// paths on the command line. An invoker without a timeout waits for the
/// compiler indefinitely.
#[derive(Debug, Clone)]
pub struct CompilerInvoker {
    timeout: Option<Duration>,
}

impl CompilerInvoker {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Limits every invocation to the given duration. A compiler that runs
    /// longer is killed and reported as [`Error::CompilerTimeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs `compiler` for a single asset. In `args`, the placeholders
    /// `{input}` and `{output}` are replaced by the respective paths. The
    /// parent directory of `output` is created before the compiler starts so
    /// that it can write its result directly.
    ///
    /// A compiler that exits with a non-zero exit code is not an error of this
    /// function; the caller inspects the returned [`ProcessResult`]. Errors
    /// are reserved for processes that cannot be launched or do not finish.
    pub fn invoke(&self, compiler: &Path, args: &[String], input: &Path, output: &Path) -> Result<ProcessResult> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let args = substitute_args(args, input, output)?;
        trace!("Invoking '{}' with arguments {args:?}", compiler.display());

        let mut command = Command::new(compiler);
        command.args(&args);

        let captured = match self.timeout {
            None => command.output().map_err(|source| Error::CompilerLaunch {
                compiler: compiler.to_owned(),
                source,
            })?,
            Some(timeout) => wait_with_timeout(&mut command, compiler, timeout)?,
        };

        let process_result = ProcessResult {
            exit_code: captured.status.code(),
            stdout: String::from_utf8_lossy(&captured.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&captured.stderr).into_owned(),
        };
        if !process_result.stdout.is_empty() {
            debug!("Compiler stdout:\n{}", process_result.stdout.trim_end());
        }
        Ok(process_result)
    }
}

/// Runs `command` like [`Command::output`] but kills the child when it is
/// still running after `timeout`.
fn wait_with_timeout(command: &mut Command, compiler: &Path, timeout: Duration) -> Result<Output> {
    command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn().map_err(|source| Error::CompilerLaunch {
        compiler: compiler.to_owned(),
        source,
    })?;

    // The pipes must be drained while the child runs. A compiler that writes
    // more than the pipe buffer would otherwise block on the full pipe and be
    // mistaken for a hanging one.
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                kill_and_reap(&mut child);
                // The readers see EOF once the child is dead.
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(Error::CompilerTimeout {
                    compiler: compiler.to_owned(),
                    timeout,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    Ok(Output { status, stdout, stderr })
}

/// Reads `pipe` to the end on a background thread.
fn spawn_pipe_reader<R>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

/// Kills the child and waits for it so that no zombie process remains. The
/// child is reported as timed out either way, so errors are only logged.
fn kill_and_reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!("Failed to kill the timed out compiler: {err}");
    }
    if let Err(err) = child.wait() {
        debug!("Failed to wait for the killed compiler: {err}");
    }
}

/// Replaces the `{input}` and `{output}` placeholders in the argument template.
fn substitute_args(template: &[String], input: &Path, output: &Path) -> Result<Vec<String>> {
    let input = input.to_str().ok_or(Error::InvalidPath(input.to_owned()))?;
    let output = output.to_str().ok_or(Error::InvalidPath(output.to_owned()))?;
    Ok(template
        .iter()
        .map(|arg| arg.replace("{input}", input).replace("{output}", output))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use sjbuild_test::setup_logger;
    use tempdir::TempDir;

    use super::*;

    fn default_args() -> Vec<String> {
        vec!["{input}".to_owned(), "{output}".to_owned()]
    }

    #[cfg(unix)]
    fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn substitutes_the_input_and_output_placeholders() {
        let args = substitute_args(
            &["{input}".to_owned(), "-o".to_owned(), "{output}.spv".to_owned()],
            Path::new("/project/assets/triangle.vert"),
            Path::new("/project/data/triangle.vert"),
        )
        .unwrap();
        assert_eq!(args, vec!["/project/assets/triangle.vert", "-o", "/project/data/triangle.vert.spv"]);
    }

    #[test]
    fn arguments_without_placeholders_are_passed_through() {
        let args = substitute_args(&["--fast".to_owned()], Path::new("/in"), Path::new("/out")).unwrap();
        assert_eq!(args, vec!["--fast"]);
    }

    #[test]
    fn missing_compiler_is_a_launch_error() {
        setup_logger();
        let dir = TempDir::new("compiler").unwrap();
        let missing = dir.path().join("does_not_exist");

        let result = CompilerInvoker::new().invoke(&missing, &default_args(), Path::new("input.png"), &dir.path().join("output.sj_tex"));

        assert!(matches!(result, Err(Error::CompilerLaunch { compiler, .. }) if compiler == missing));
    }

    #[cfg(unix)]
    #[test]
    fn captures_the_exit_code_and_the_output() {
        setup_logger();
        let dir = TempDir::new("compiler").unwrap();
        let stub = write_stub(dir.path(), "ok.sh", "#!/bin/sh\necho \"compiled $1\"\nexit 0\n");
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();

        let result = CompilerInvoker::new()
            .invoke(&stub, &default_args(), &input, &dir.path().join("out/stone.sj_tex"))
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("compiled"));
    }

    #[cfg(unix)]
    #[test]
    fn creates_the_parent_directory_of_the_output() {
        let dir = TempDir::new("compiler").unwrap();
        let stub = write_stub(dir.path(), "ok.sh", "#!/bin/sh\nexit 0\n");
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();
        let output = dir.path().join("data/textures/stone.sj_tex");

        CompilerInvoker::new().invoke(&stub, &default_args(), &input, &output).unwrap();

        assert!(output.parent().unwrap().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_code_is_not_a_launch_error() {
        let dir = TempDir::new("compiler").unwrap();
        let stub = write_stub(dir.path(), "broken.sh", "#!/bin/sh\necho \"bad asset\" >&2\nexit 3\n");
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();

        let result = CompilerInvoker::new()
            .invoke(&stub, &default_args(), &input, &dir.path().join("stone.sj_tex"))
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.exit_code, Some(3));
        assert!(result.stderr.contains("bad asset"));
    }

    #[cfg(unix)]
    #[test]
    fn fast_compiler_finishes_within_the_timeout() {
        let dir = TempDir::new("compiler").unwrap();
        let stub = write_stub(dir.path(), "ok.sh", "#!/bin/sh\nexit 0\n");
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();

        let result = CompilerInvoker::new()
            .with_timeout(Duration::from_secs(10))
            .invoke(&stub, &default_args(), &input, &dir.path().join("stone.sj_tex"))
            .unwrap();

        assert!(result.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn verbose_compiler_is_drained_while_waiting() {
        setup_logger();
        let dir = TempDir::new("compiler").unwrap();
        // Emits well more than a pipe buffer so that an undrained pipe would
        // block the compiler until the timeout expires.
        let stub = write_stub(
            dir.path(),
            "verbose.sh",
            "#!/bin/sh\nhead -c 262144 /dev/zero | tr '\\0' 'a'\nexit 0\n",
        );
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();

        let started = Instant::now();
        let result = CompilerInvoker::new()
            .with_timeout(Duration::from_secs(10))
            .invoke(&stub, &default_args(), &input, &dir.path().join("stone.sj_tex"))
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.stdout.len(), 262144);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn slow_compiler_is_killed_after_the_timeout() {
        setup_logger();
        let dir = TempDir::new("compiler").unwrap();
        let stub = write_stub(dir.path(), "slow.sh", "#!/bin/sh\nsleep 10\n");
        let input = dir.path().join("stone.png");
        fs::write(&input, b"").unwrap();

        let started = Instant::now();
        let result = CompilerInvoker::new()
            .with_timeout(Duration::from_millis(100))
            .invoke(&stub, &default_args(), &input, &dir.path().join("stone.sj_tex"));

        assert!(matches!(result, Err(Error::CompilerTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
