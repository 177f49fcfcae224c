//! Error types for conversion operations
//!
//! Structural errors carry the 1-based line number and the original line text
//! so the CLI can report them the way a human would locate them in an editor.

use std::fmt;

/// Errors that can occur while converting a document
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Source file could not be read
    SourceRead { path: String, message: String },
    /// Destination file already exists; conversion refuses to overwrite
    DestinationExists { path: String },
    /// Destination file could not be written
    DestinationWrite { path: String, message: String },
    /// First line does not open an XML declaration
    MissingDeclaration,
    /// The XML declaration never closes
    UnclosedDeclaration,
    /// A block comment never closes
    UnclosedComment { line: usize, text: String },
    /// A second `<environment>` block was opened
    DuplicateEnvironment { line: usize, opened: usize },
    /// A `</environment>` with no open `<environment>` block
    StrayEnvironmentClose { line: usize },
    /// An `<environment>` block never closes
    UnclosedEnvironment { opened: usize },
    /// A `<section` opened while the previous one is still open
    NestedSection {
        line: usize,
        text: String,
        opened: usize,
        opened_text: String,
    },
    /// A `<section` never closes
    UnclosedSection { opened: usize, text: String },
    /// The input already contains a tag named after the requested root node
    RootNodeCollision { line: usize, root: String },
    /// The configured well-formedness checker could not be launched
    CheckerLaunch { binary: String, message: String },
    /// The written output failed the well-formedness check
    Malformed { path: String, message: String },
}

impl ConvertError {
    /// Process exit status for this error: `1` when output was written but
    /// failed validation, `2` for anything that prevented output entirely.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::CheckerLaunch { .. } | ConvertError::Malformed { .. } => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::SourceRead { path, message } => {
                write!(f, "cannot read '{path}': {message}")
            }
            ConvertError::DestinationExists { path } => {
                write!(f, "destination '{path}' already exists; remove it first")
            }
            ConvertError::DestinationWrite { path, message } => {
                write!(f, "cannot write '{path}': {message}")
            }
            ConvertError::MissingDeclaration => {
                write!(f, "input does not start with an XML declaration (\"<?xml\")")
            }
            ConvertError::UnclosedDeclaration => {
                write!(f, "the XML declaration (\"<?xml\") is never closed (\"?>\")")
            }
            ConvertError::UnclosedComment { line, text } => {
                write!(f, "comment opened at line {line} is never closed:\n  \"{text}\"")
            }
            ConvertError::DuplicateEnvironment { line, opened } => {
                write!(
                    f,
                    "second <environment> block at line {line}; only one is permitted \
                     (first opened at line {opened})"
                )
            }
            ConvertError::StrayEnvironmentClose { line } => {
                write!(f, "</environment> at line {line} without a matching <environment>")
            }
            ConvertError::UnclosedEnvironment { opened } => {
                write!(f, "<environment> opened at line {opened} is never closed")
            }
            ConvertError::NestedSection {
                line,
                text,
                opened,
                opened_text,
            } => {
                write!(
                    f,
                    "a new <section opens at line {line}:\n  \"{text}\"\n\
                     while the <section opened at line {opened}:\n  \"{opened_text}\"\n\
                     is not closed"
                )
            }
            ConvertError::UnclosedSection { opened, text } => {
                write!(f, "<section opened at line {opened} is never closed:\n  \"{text}\"")
            }
            ConvertError::RootNodeCollision { line, root } => {
                write!(
                    f,
                    "input already contains a <{root}> tag at line {line} matching the \
                     requested root node; the file was most probably converted already"
                )
            }
            ConvertError::CheckerLaunch { binary, message } => {
                write!(f, "failed to run well-formedness checker '{binary}': {message}")
            }
            ConvertError::Malformed { path, message } => {
                write!(f, "'{path}' failed the well-formedness check: {message}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}
