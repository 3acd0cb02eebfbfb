//! Shell command execution.

use crate::error::{Result, UpgraderError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Name passed as `$0` when a command receives positional arguments.
#[cfg(not(windows))]
const ARG0: &str = "upgrader";

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty unless captured).
    pub stdout: String,

    /// Standard error (empty unless captured).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Positional arguments, exposed to the command as `$1`, `$2`, ...
    pub args: Vec<String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Execute a shell command.
///
/// On Unix the command runs under `/bin/sh -c`, with `args` passed as
/// positional parameters so they are never re-split or re-quoted. On
/// Windows the arguments are appended to the command line.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let mut cmd = shell_command(command, &options.args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(if options.capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if options.capture_stderr {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    let output = cmd.output().map_err(|source| UpgraderError::CommandFailed {
        command: command.to_string(),
        source,
    })?;

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout,
        stderr,
        duration: start.elapsed(),
        success: output.status.success(),
    })
}

#[cfg(not(windows))]
fn shell_command(command: &str, args: &[String]) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    if !args.is_empty() {
        cmd.arg(ARG0).args(args);
    }
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str, args: &[String]) -> Command {
    let shell = std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string());
    let mut cmd = Command::new(shell);
    cmd.arg("/C").arg(command).args(args);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> CommandOptions {
        CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_env() {
        let mut options = captured();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let cmd = if cfg!(windows) {
            "echo %MY_VAR%"
        } else {
            "echo $MY_VAR"
        };

        let result = execute(cmd, &options).unwrap();
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    #[cfg(unix)]
    fn execute_passes_positional_args_verbatim() {
        let mut options = captured();
        options.args = vec!["--param1".to_string(), "two words".to_string()];

        let result = execute(r#"printf '%s|' "$@""#, &options).unwrap();

        assert!(result.success);
        assert_eq!(result.stdout, "--param1|two words|");
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut options = captured();
        options.cwd = Some(temp.path().to_path_buf());

        let cmd = if cfg!(windows) { "cd" } else { "pwd" };
        let result = execute(cmd, &options).unwrap();

        assert!(result.success);
    }

    #[test]
    fn execute_reports_why_spawn_failed() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut options = captured();
        options.cwd = Some(temp.path().join("missing"));

        let err = execute("echo hello", &options).unwrap_err();

        let UpgraderError::CommandFailed { command, source } = &err else {
            panic!("expected CommandFailed, got {:?}", err);
        };
        assert_eq!(command, "echo hello");
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("echo hello"));
    }
}
