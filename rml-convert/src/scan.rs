//! Scan state threaded through the single-pass conversion loop.

use serde::Serialize;

/// Lifecycle of a block construct (comment, `<environment>`, `<section>`).
///
/// An explicit three-state value: a block either never opened, is currently
/// open (and we remember where, for error reporting), or opened and closed
/// again (and the opening position still matters, e.g. to know an
/// `<environment>` block exists when deciding whether to synthesize
/// `<globals>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BlockState {
    #[default]
    Unopened,
    /// Open since the given 0-based source line.
    OpenAt(usize),
    /// Closed, having opened at the given 0-based source line.
    ClosedAt(usize),
}

impl BlockState {
    pub(crate) fn is_open(&self) -> bool {
        matches!(self, BlockState::OpenAt(_))
    }
}

/// Per-rule fire counters.
///
/// The conversion writes an output file only when at least one counter is
/// non-zero; an all-zero tally means the input was already canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RuleTally {
    /// `<section Tag>` / `</section>` pairs renamed.
    pub renamed_sections: usize,
    /// `<environment>` blocks captured for relocation (0 or 1).
    pub environment_moves: usize,
    /// `name="<numeric>" units="<word>"` attribute pairs folded.
    pub unit_folds: usize,
    /// Tags rewritten from `...>` to `.../>`.
    pub self_closing: usize,
    /// `<` / `>` occurrences escaped inside attribute values.
    pub bracket_escapes: usize,
    /// Self-closed `<for .../>` tags reopened.
    pub for_loops: usize,
}

impl RuleTally {
    /// Whether any rewrite rule fired at least once.
    pub fn any(&self) -> bool {
        self.renamed_sections
            + self.environment_moves
            + self.unit_folds
            + self.self_closing
            + self.bracket_escapes
            + self.for_loops
            > 0
    }
}

/// Accumulated lexical context while walking the input lines.
#[derive(Debug, Default)]
pub(crate) struct ScanState {
    /// Inside the `<?xml ... ?>` region.
    pub(crate) declaration_open: bool,
    pub(crate) comment: BlockState,
    pub(crate) environment: BlockState,
    pub(crate) section: BlockState,
    /// Tag name captured from the open `<section`, reused at `</section>`.
    pub(crate) section_name: String,
    /// Verbatim body of the `<environment>` block.
    pub(crate) env_lines: Vec<String>,
    /// Output index of the `<globals>` opening line, if one was seen.
    pub(crate) globals_line: Option<usize>,
    /// Output index of the first content line; where a synthetic root lands.
    pub(crate) insert_at: Option<usize>,
    /// Completed top-level elements (renamed sections plus `<globals>`).
    pub(crate) top_level: usize,
    pub(crate) tally: RuleTally,
    /// Names of renamed sections, in document order.
    pub(crate) renamed: Vec<String>,
}
