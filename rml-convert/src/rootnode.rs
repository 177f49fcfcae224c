//! The closed set of root element names a converted document may be wrapped in.

use std::fmt;
use std::str::FromStr;

/// Root element assigned when the converted document needs a common ancestor.
///
/// The set is deliberately closed: these are the document kinds the analysis
/// framework accepts as a top-level element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootNode {
    RestG4,
    RestManager,
    Processes,
    Gases,
    Readouts,
}

impl RootNode {
    /// All accepted root node names, in display order.
    pub const NAMES: [&'static str; 5] =
        ["restG4", "restManager", "processes", "gases", "readouts"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RootNode::RestG4 => "restG4",
            RootNode::RestManager => "restManager",
            RootNode::Processes => "processes",
            RootNode::Gases => "gases",
            RootNode::Readouts => "readouts",
        }
    }
}

impl fmt::Display for RootNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootNode {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "restG4" => Ok(RootNode::RestG4),
            "restManager" => Ok(RootNode::RestManager),
            "processes" => Ok(RootNode::Processes),
            "gases" => Ok(RootNode::Gases),
            "readouts" => Ok(RootNode::Readouts),
            other => Err(format!(
                "'{other}' is not an accepted root node (expected one of: {})",
                RootNode::NAMES.join(", ")
            )),
        }
    }
}
