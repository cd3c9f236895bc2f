use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Check whether an external tool can be executed.
///
/// Paths containing a separator are checked directly; bare names are looked
/// up with `which`.
pub fn tool_available(tool: &str) -> bool {
    if tool.contains('/') {
        return Path::new(tool).is_file();
    }

    match Command::new("which").arg(tool).output() {
        Ok(output) => output.status.success(),
        Err(e) => {
            debug!("Could not run `which {}`: {}", tool, e);
            false
        }
    }
}

/// Subset of `tools` that are not available, in input order
pub fn missing_tools(tools: &[&str]) -> Vec<String> {
    tools
        .iter()
        .filter(|t| !tool_available(t))
        .map(|t| t.to_string())
        .collect()
}

/// Builds external tool invocations with an explicit working directory and a forced locale
#[derive(Debug, Clone)]
pub struct ToolRunner {
    locale: String,
}

impl ToolRunner {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// A command for `program` that runs in `cwd` with a UTF-8 locale.
    /// The process working directory is never changed.
    pub fn command(&self, program: &str, cwd: &Path) -> Command {
        let mut command = Command::new(program);
        command
            .current_dir(cwd)
            .env("LC_ALL", &self.locale)
            .env("LANG", &self.locale);
        command
    }
}

/// Human-readable reason for a failed tool run, preferring its stderr
pub fn describe_failure(tool: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let status = match output.status.code() {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    };
    if stderr.is_empty() {
        format!("{} {}", tool, status)
    } else {
        format!("{} {}: {}", tool, status, stderr)
    }
}
