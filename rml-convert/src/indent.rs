//! Optional re-indentation of the written output with Emacs in batch mode.
//!
//! Only attempted after a successful well-formedness check; if the output
//! needs eyeballing against the input, it is better left byte-comparable.
//! A missing or failing tool degrades to a notice, never to a failed run.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use which::which;

/// What happened to the indent request.
#[derive(Debug, Clone, PartialEq)]
pub enum IndentOutcome {
    /// The file was re-indented in place by the given tool.
    Indented(PathBuf),
    /// No indent tool could be found; the file is left as written.
    ToolUnavailable,
    /// The tool ran but exited non-zero; the file may be partially touched.
    ToolFailed { binary: PathBuf, code: Option<i32> },
}

/// Re-indent `path` in place.
///
/// Resolution order: configured binary, `RML_EMACS_BIN`, `emacs` on `PATH`.
pub fn indent_in_place(path: &Path, binary: Option<&Path>) -> IndentOutcome {
    let Some(bin) = resolve_indenter(binary) else {
        return IndentOutcome::ToolUnavailable;
    };
    let status = Command::new(&bin)
        .arg("-Q")
        .arg("-batch")
        .arg(path)
        .arg("--eval")
        .arg("(indent-region (point-min) (point-max) nil)")
        .arg("-f")
        .arg("save-buffer")
        .stdout(Stdio::null())
        .status();
    match status {
        Ok(status) if status.success() => IndentOutcome::Indented(bin),
        Ok(status) => IndentOutcome::ToolFailed {
            binary: bin,
            code: status.code(),
        },
        Err(_) => IndentOutcome::ToolUnavailable,
    }
}

fn resolve_indenter(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env::var_os("RML_EMACS_BIN") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    which("emacs").ok()
}
