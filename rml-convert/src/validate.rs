//! Well-formedness validation of the written output.
//!
//! The preferred checker is `xmllint` run as a subprocess, so the verdict
//! matches what the surrounding tooling greps for. Resolution order:
//! an explicitly configured binary, the `RML_XMLLINT_BIN` environment
//! variable, then `xmllint` on `PATH`. When none is available the check
//! falls back to an in-process parse, keeping the exit-status contract
//! total on machines without libxml2 installed.

use crate::error::ConvertError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which;

/// Which checker produced the verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Checker {
    /// An external binary, invoked as `<binary> --noout <path>`.
    External(PathBuf),
    /// The in-process parser fallback.
    Builtin,
}

/// Check that the file at `path` is well-formed XML.
///
/// A failed check is an error with exit code 1; the file stays on disk for
/// inspection. An explicitly configured binary that cannot be launched is
/// also a validation failure, never silently skipped.
pub fn check_well_formed(path: &Path, binary: Option<&Path>) -> Result<Checker, ConvertError> {
    match resolve_checker(binary) {
        Some(bin) => {
            let status = Command::new(&bin)
                .arg("--noout")
                .arg(path)
                .status()
                .map_err(|err| ConvertError::CheckerLaunch {
                    binary: bin.display().to_string(),
                    message: err.to_string(),
                })?;
            if status.success() {
                Ok(Checker::External(bin))
            } else {
                Err(ConvertError::Malformed {
                    path: path.display().to_string(),
                    message: format!("{} exited with {status}", bin.display()),
                })
            }
        }
        None => {
            let text = fs::read_to_string(path).map_err(|err| ConvertError::Malformed {
                path: path.display().to_string(),
                message: format!("cannot re-read output: {err}"),
            })?;
            match roxmltree::Document::parse(&text) {
                Ok(_) => Ok(Checker::Builtin),
                Err(err) => Err(ConvertError::Malformed {
                    path: path.display().to_string(),
                    message: err.to_string(),
                }),
            }
        }
    }
}

fn resolve_checker(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env::var_os("RML_XMLLINT_BIN") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    which("xmllint").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn explicit_binary_wins_resolution() {
        let resolved = resolve_checker(Some(Path::new("/opt/custom/xmllint")));
        assert_eq!(resolved, Some(PathBuf::from("/opt/custom/xmllint")));
    }

    #[test]
    fn well_formed_output_passes() {
        let file = write_temp("<?xml version=\"1.0\"?>\n<TRestRun name=\"r\"/>\n");
        check_well_formed(file.path(), None).expect("well-formed file passes");
    }

    #[test]
    fn mismatched_tags_fail_the_check() {
        let file = write_temp("<?xml version=\"1.0\"?>\n<TRestRun>\n</TRestGas>\n");
        let err = check_well_formed(file.path(), None).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unlaunchable_configured_checker_is_a_validation_failure() {
        let file = write_temp("<?xml version=\"1.0\"?>\n<TRestRun/>\n");
        let missing = Path::new("/nonexistent/bin/xmllint");
        let err = check_well_formed(file.path(), Some(missing)).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
