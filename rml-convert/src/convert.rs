//! The single-pass conversion driver.
//!
//! Walks the input line by line, tracking declaration / comment /
//! `<environment>` / `<section>` context, applies the rewrite rules in their
//! fixed order, and assembles the output with the relocated environment
//! block and (when needed) the synthetic root element.

use crate::error::ConvertError;
use crate::rootnode::RootNode;
use crate::rules;
use crate::scan::{BlockState, RuleTally, ScanState};
use serde::Serialize;

/// What a conversion did, without the output text itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub tally: RuleTally,
    /// Renamed section tags, in document order.
    pub renamed_sections: Vec<String>,
    /// An `<environment>` body was merged into an existing `<globals>`.
    pub environment_moved: bool,
    /// An `<environment>` body was wrapped in a synthesized `<globals>`.
    pub globals_synthesized: bool,
    /// A synthetic root element was added around the document body.
    pub root_wrapped: bool,
}

impl ConversionReport {
    /// Whether any rewrite rule fired. When false, the conversion is a no-op
    /// and no output file should be created.
    pub fn modified(&self) -> bool {
        self.tally.any()
    }
}

/// The rewritten document plus its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Output lines, without trailing newlines.
    pub lines: Vec<String>,
    pub report: ConversionReport,
}

impl Conversion {
    /// The output document as a single string with a trailing newline.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Converts one document from the section/environment dialect to XML.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    root: RootNode,
}

impl Converter {
    pub fn new(root: RootNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> RootNode {
        self.root
    }

    /// Run the conversion over the full source text.
    ///
    /// Structural inconsistencies (unclosed blocks, nested sections, a second
    /// `<environment>`, a pre-existing tag named after the chosen root) are
    /// errors; a well-formed input that needs no rewriting comes back with an
    /// all-zero tally.
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let src: Vec<&str> = source.lines().collect();
        let mut st = ScanState::default();
        let mut out: Vec<String> = Vec::new();
        let root_open = format!("<{}>", self.root.as_str());

        for (idx, &raw) in src.iter().enumerate() {
            // The declaration must open at the first byte of the first line
            // and closes at the first line containing "?>". Declaration
            // lines pass through untouched by every other rule.
            if idx == 0 {
                if !raw.starts_with("<?xml") {
                    return Err(ConvertError::MissingDeclaration);
                }
                if !raw.contains("?>") {
                    st.declaration_open = true;
                }
                out.push(raw.to_string());
                continue;
            }
            if st.declaration_open {
                out.push(raw.to_string());
                if raw.contains("?>") {
                    st.declaration_open = false;
                }
                continue;
            }

            // Comment passthrough wins over everything below it.
            if st.comment.is_open() {
                out.push(raw.to_string());
                if raw.trim_end().ends_with("-->") {
                    st.comment = BlockState::Unopened;
                }
                continue;
            }

            // Environment body is captured verbatim, comments and blanks
            // included, until the closing marker.
            if let BlockState::OpenAt(opened) = st.environment {
                if raw.trim() == "<environment>" {
                    return Err(ConvertError::DuplicateEnvironment {
                        line: idx + 1,
                        opened: opened + 1,
                    });
                }
                if raw.trim() == "</environment>" {
                    st.environment = BlockState::ClosedAt(opened);
                    st.tally.environment_moves += 1;
                    continue;
                }
                st.env_lines.push(raw.to_string());
                continue;
            }

            // Leading blank lines are dropped so the root node can land
            // directly before the first real content; later ones survive.
            if raw.trim().is_empty() {
                if st.insert_at.is_some() {
                    out.push(raw.to_string());
                }
                continue;
            }

            if raw.trim_start().starts_with("<!--") {
                out.push(raw.to_string());
                if !raw.trim_end().ends_with("-->") {
                    st.comment = BlockState::OpenAt(idx);
                }
                continue;
            }

            if raw.trim() == "</environment>" {
                return Err(ConvertError::StrayEnvironmentClose { line: idx + 1 });
            }
            if raw.trim() == "<environment>" {
                match st.environment {
                    BlockState::Unopened => {
                        if st.insert_at.is_none() {
                            st.insert_at = Some(out.len());
                        }
                        st.environment = BlockState::OpenAt(idx);
                        continue;
                    }
                    BlockState::ClosedAt(opened) => {
                        return Err(ConvertError::DuplicateEnvironment {
                            line: idx + 1,
                            opened: opened + 1,
                        });
                    }
                    BlockState::OpenAt(_) => unreachable!("handled while the block is open"),
                }
            }

            // First content line: remember where a synthetic root would go.
            if st.insert_at.is_none() {
                st.insert_at = Some(out.len());
            }

            // A tag already named after the requested root means the input
            // was almost certainly converted once before.
            if raw.trim_start().starts_with(&root_open) {
                return Err(ConvertError::RootNodeCollision {
                    line: idx + 1,
                    root: self.root.as_str().to_string(),
                });
            }

            if st.globals_line.is_none() && raw.trim() == "<globals>" {
                st.globals_line = Some(out.len());
                st.top_level += 1;
            }

            let mut line = raw.to_string();
            let mut is_section_line = false;
            if rules::is_section_open(&line) {
                if let BlockState::OpenAt(opened) = st.section {
                    return Err(ConvertError::NestedSection {
                        line: idx + 1,
                        text: raw.to_string(),
                        opened: opened + 1,
                        opened_text: src[opened].to_string(),
                    });
                }
                is_section_line = true;
                let (stripped, name) = rules::strip_section_keyword(&line);
                line = stripped;
                st.section = BlockState::OpenAt(idx);
                st.section_name = name;
                // Opening and closing may share a line.
                if let Some(rewritten) = rules::close_section_inline(&line, &st.section_name) {
                    line = rewritten;
                    st.section = BlockState::Unopened;
                    st.top_level += 1;
                    st.tally.renamed_sections += 1;
                    st.renamed.push(st.section_name.clone());
                }
            } else if st.section.is_open() {
                if let Some(rewritten) = rules::close_section_line(&line, &st.section_name) {
                    line = rewritten;
                    st.section = BlockState::Unopened;
                    st.top_level += 1;
                    st.tally.renamed_sections += 1;
                    st.renamed.push(st.section_name.clone());
                }
            }

            if let Some((rewritten, folds)) = rules::fold_units(&line) {
                line = rewritten;
                st.tally.unit_folds += folds;
            }
            if let Some((rewritten, fixed)) = rules::escape_value_brackets(&line) {
                line = rewritten;
                st.tally.bracket_escapes += fixed;
            }
            if let Some(rewritten) = rules::reopen_for_loop(&line) {
                line = rewritten;
                st.tally.for_loops += 1;
            }
            // A section head can look like a self-closing candidate (its
            // name may start with "add"); it never is one.
            if !is_section_line {
                if let Some(rewritten) = rules::close_self_closing(&line) {
                    line = rewritten;
                    st.tally.self_closing += 1;
                }
            }

            out.push(line);
        }

        if src.is_empty() {
            return Err(ConvertError::MissingDeclaration);
        }
        if st.declaration_open {
            return Err(ConvertError::UnclosedDeclaration);
        }
        if let BlockState::OpenAt(opened) = st.comment {
            return Err(ConvertError::UnclosedComment {
                line: opened + 1,
                text: src[opened].to_string(),
            });
        }
        if let BlockState::OpenAt(opened) = st.environment {
            return Err(ConvertError::UnclosedEnvironment { opened: opened + 1 });
        }
        if let BlockState::OpenAt(opened) = st.section {
            return Err(ConvertError::UnclosedSection {
                opened: opened + 1,
                text: src[opened].to_string(),
            });
        }

        Ok(self.assemble(out, st))
    }

    /// Splice the environment block back in and decide on the root wrapper.
    fn assemble(&self, out: Vec<String>, st: ScanState) -> Conversion {
        let environment_present = matches!(st.environment, BlockState::ClosedAt(_));
        let globals_synthesized = environment_present && st.globals_line.is_none();

        // The synthesized <globals> is itself a top-level element.
        let mut top_level = st.top_level;
        if globals_synthesized {
            top_level += 1;
        }
        let root_wrapped = top_level > 1;
        let insert_at = st.insert_at.unwrap_or(out.len());
        let total = out.len();

        let mut lines: Vec<String> = Vec::with_capacity(total + st.env_lines.len() + 6);
        let emit_prelude = |lines: &mut Vec<String>| {
            if root_wrapped {
                lines.push(format!("<{}>", self.root.as_str()));
            }
            if globals_synthesized {
                lines.push(String::new());
                lines.push("<globals>".to_string());
                lines.extend(st.env_lines.iter().cloned());
                lines.push("</globals>".to_string());
            }
        };

        for (i, line) in out.into_iter().enumerate() {
            if i == insert_at {
                emit_prelude(&mut lines);
            }
            let splice_globals = environment_present && st.globals_line == Some(i);
            lines.push(line);
            if splice_globals {
                lines.push("\t<!-- Environment -->".to_string());
                lines.extend(st.env_lines.iter().cloned());
                lines.push("\t<!-- Globals proper -->".to_string());
            }
        }
        if insert_at >= total {
            emit_prelude(&mut lines);
        }
        if root_wrapped {
            lines.push(format!("</{}>", self.root.as_str()));
        }

        Conversion {
            lines,
            report: ConversionReport {
                tally: st.tally,
                renamed_sections: st.renamed,
                environment_moved: environment_present && !globals_synthesized,
                globals_synthesized,
                root_wrapped,
            },
        }
    }
}
