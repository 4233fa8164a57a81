//! Subprocess execution utilities.
//!
//! Commands are spawned directly with an argument vector, never through a
//! shell, so addresses and paths are passed through verbatim. Quoting is
//! only applied by [`render_command`] when a command is shown to a person
//! (logs, dry runs).
//!
//! # Example
//!
//! ```ignore
//! use splitroute_common::shell;
//!
//! let result = shell::exec("route", &["print", "128.0.0.0", "-4"]).await?;
//! if result.success() {
//!     println!("{}", result.stdout);
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{CommonError, CommonResult};

/// Windows `route` utility, also used for the route-table listing.
pub const ROUTE_CMD: &str = "route";

/// Characters that force an argument to be quoted when rendered.
static NEEDS_QUOTING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^A-Za-z0-9_./:=@%+,-]"#).expect("Invalid regex pattern"));

/// Regex for characters that need escaping inside double quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for display in a shell-like command line.
///
/// # Example
///
/// ```
/// use splitroute_common::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Renders a program and its arguments as one command line.
///
/// Arguments made only of address-like characters are left bare.
pub fn render_command(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || NEEDS_QUOTING_RE.is_match(arg) {
            line.push_str(&shellquote(arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// The exit code of the command (0 = success, -1 = killed by signal).
    pub exit_code: i32,
    /// The captured stdout output.
    pub stdout: String,
    /// The captured stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a command asynchronously and captures its output.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command ran (whatever its exit code)
/// * `Err(CommonError)` - If the command could not be spawned
pub async fn exec(program: &str, args: &[&str]) -> CommonResult<ExecResult> {
    let command = render_command(program, args);
    tracing::debug!(command = %command, "Executing command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CommonError::ShellExec {
            command: command.clone(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let result = ExecResult {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %command, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %command,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}
