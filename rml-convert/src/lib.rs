//! Conversion of legacy RML detector-configuration files to standard XML
//!
//!     The legacy dialect predates the framework's move to a stock XML
//!     parser. It differs from XML in a handful of ways: top-level blocks
//!     are introduced with a `section` keyword, variables live in an
//!     `<environment>` block instead of `<globals>`, numeric attributes
//!     carry a separate `units` attribute, a known set of tags is written
//!     open but meant self-closed, and multiple top-level elements are
//!     allowed. This crate rewrites all of that, line by line, into XML the
//!     current framework accepts.
//!
//!     This is a pure lib: it powers the rml CLI but is shell agnostic.
//!     Nothing in here prints or exits; everything comes back as values and
//!     the caller decides how to present them.
//!
//!     The file structure:
//!     .
//!     ├── error.rs        # ConvertError and the exit-status mapping
//!     ├── rootnode.rs     # the closed set of root element names
//!     ├── scan.rs         # block states and rule tally
//!     ├── rules.rs        # the per-line rewrite rules, in application order
//!     ├── convert.rs      # the single-pass driver and output assembly
//!     ├── validate.rs     # well-formedness check (xmllint, with fallback)
//!     ├── indent.rs       # optional Emacs batch re-indentation
//!     └── pipeline.rs     # file-level policy: no-op, refuse-overwrite, write
//!
//! Design
//!
//!     The conversion is a single pass over the input lines. Block context
//!     (declaration, comment, environment, section) is explicit tagged
//!     state, and each rewrite concern is a named function that either
//!     leaves the line alone or returns the rewritten text; the driver
//!     composes them in a fixed order. Comment and declaration lines are
//!     exempt from every rule.
//!
//!     The dialect has documented rough edges that are kept, not fixed:
//!     units attached to `${...}` variable references are left untouched,
//!     at most one `<` and one `>` per line are escaped, and only a closed
//!     list of tag names (plus the `add*` prefix) is ever self-closed.
//!     Configurations in the wild depend on these exact boundaries.

pub mod convert;
pub mod error;
pub mod indent;
pub mod pipeline;
pub mod rootnode;
pub mod validate;

mod rules;
mod scan;

pub use convert::{Conversion, ConversionReport, Converter};
pub use error::ConvertError;
pub use indent::IndentOutcome;
pub use pipeline::{convert_file, ConvertOutcome, ConvertSpec, ToolSettings};
pub use rootnode::RootNode;
pub use scan::RuleTally;
pub use validate::Checker;
