//! File-level conversion pipeline.
//!
//! Bridges the pure converter and file I/O: reads the source, refuses to
//! overwrite an existing destination, applies the no-op policy (a canonical
//! input produces no file at all — downstream tooling relies on
//! destination-file absence meaning "already canonical"), writes the output,
//! validates it, and optionally re-indents it.
//!
//! For more control over the conversion itself, use [`Converter`] directly.

use crate::convert::{ConversionReport, Converter};
use crate::error::ConvertError;
use crate::indent::{indent_in_place, IndentOutcome};
use crate::rootnode::RootNode;
use crate::validate::{check_well_formed, Checker};
use std::fs;
use std::path::{Path, PathBuf};

/// External tool settings, usually sourced from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    /// Run the well-formedness check after writing. On by default.
    pub validate: bool,
    /// Explicit checker binary; `None` resolves via environment and `PATH`.
    pub checker_binary: Option<PathBuf>,
    /// Explicit indent binary; `None` resolves via environment and `PATH`.
    pub indent_binary: Option<PathBuf>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            validate: true,
            checker_binary: None,
            indent_binary: None,
        }
    }
}

/// Specifies one file conversion.
///
/// ```ignore
/// let spec = ConvertSpec::new("detector.rml", "detector.xml", RootNode::Readouts)
///     .with_indent(true);
/// let outcome = convert_file(&spec)?;
/// ```
#[derive(Debug, Clone)]
pub struct ConvertSpec {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub root: RootNode,
    /// Re-indent the output after a successful check.
    pub indent: bool,
    pub tools: ToolSettings,
}

impl ConvertSpec {
    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>, root: RootNode) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            root,
            indent: false,
            tools: ToolSettings::default(),
        }
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }
}

/// Result of a file conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    /// No rewrite rule fired; the destination was deliberately not created.
    Unmodified,
    /// The destination was written (and validated, unless disabled).
    Written {
        report: ConversionReport,
        check: Option<Checker>,
        indent: Option<IndentOutcome>,
    },
}

/// Convert one file according to the specification.
///
/// # Errors
///
/// Structural and usage errors ([`ConvertError::exit_code`] = 2) leave no
/// output behind. A failed well-formedness check (exit code 1) keeps the
/// written destination on disk for inspection.
pub fn convert_file(spec: &ConvertSpec) -> Result<ConvertOutcome, ConvertError> {
    let source = fs::read_to_string(&spec.source).map_err(|err| ConvertError::SourceRead {
        path: spec.source.display().to_string(),
        message: err.to_string(),
    })?;

    // An existence test, not an atomic create: two simultaneous runs against
    // the same destination can race.
    if spec.destination.exists() {
        return Err(ConvertError::DestinationExists {
            path: spec.destination.display().to_string(),
        });
    }

    let conversion = Converter::new(spec.root).convert(&source)?;
    if !conversion.report.modified() {
        return Ok(ConvertOutcome::Unmodified);
    }

    fs::write(&spec.destination, conversion.text()).map_err(|err| {
        ConvertError::DestinationWrite {
            path: spec.destination.display().to_string(),
            message: err.to_string(),
        }
    })?;

    let check = if spec.tools.validate {
        Some(check_well_formed(
            &spec.destination,
            spec.tools.checker_binary.as_deref(),
        )?)
    } else {
        None
    };

    // Indentation comes last so a failed check leaves the output
    // byte-comparable with the input.
    let indent = if spec.indent {
        Some(indent_in_place(
            &spec.destination,
            spec.tools.indent_binary.as_deref(),
        ))
    } else {
        None
    };

    Ok(ConvertOutcome::Written {
        report: conversion.report,
        check,
        indent,
    })
}
