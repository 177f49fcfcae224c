//! The per-line rewrite rules.
//!
//! Each rule is a named function taking the current line (possibly already
//! rewritten by an earlier rule) and returning `Some(rewritten)` when it
//! fires, `None` when it leaves the line alone. The driver applies them in a
//! fixed order; declaration and comment lines never reach them.
//!
//! The dialect's documented limitations are preserved here on purpose:
//! a single tag per line, at most one `<` and one `>` escaped per line, and
//! no unit folding onto `${...}` variable references. Completing the grammar
//! would change what existing configurations mean.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Tags that the dialect writes as `<tag ...>` but XML requires to be
/// self-closed. Closed list plus the `add*` prefix; unconstrained tag names
/// would risk rewriting elements that really do carry a body.
pub(crate) const SELF_CLOSING_TAGS: [&str; 10] = [
    "parameter",
    "variable",
    "observable",
    "canvas",
    "cut",
    "energyDist",
    "angularDist",
    "style",
    "labels",
    "legendPosition",
];

static SECTION_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<section\s+\S").unwrap());
static SECTION_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*<)section\s+").unwrap());
static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<([^\s/>]+)").unwrap());
static SECTION_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s*)</section>").unwrap());
static SECTION_CLOSE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)</section>\s*$").unwrap());

static UNITS_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\s\w+="[+\-0-9.(),]+)" units="([A-Za-z]+)""#).unwrap());

static LT_IN_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*<[^>]*)<").unwrap());
static GT_AT_EOL: Lazy<Regex> = Lazy::new(|| Regex::new(r">([^<]*>)\s*$").unwrap());

static FOR_SELF_CLOSED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*<for .*)/>\s*$").unwrap());

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<(\w+)\s+[^>]+[^/]>").unwrap());
static SC_PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<[^>]+[^/]>\s*$").unwrap());
static SC_XML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<[^>]+[^/]>\s*<!--.+-->\s*$").unwrap());
static SC_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<[^>]+[^/]>\s*%.*$").unwrap());
static SC_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<[^>]+[^/]>\s*//.*$").unwrap());

static TRAIL_PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s*$").unwrap());
static TRAIL_XML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r">(\s*<!--.+-->)\s*$").unwrap());
static TRAIL_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r">(\s*%.*)$").unwrap());
static TRAIL_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r">(\s*//.*)$").unwrap());

/// Does this line open a `<section` block?
pub(crate) fn is_section_open(line: &str) -> bool {
    SECTION_OPEN.is_match(line)
}

/// Strip the `section` keyword from an opening line and capture the tag name
/// that follows it. `<section TRestRun name="r">` becomes
/// `<TRestRun name="r">` with tag name `TRestRun`.
pub(crate) fn strip_section_keyword(line: &str) -> (String, String) {
    let stripped = SECTION_KEYWORD.replace(line, "${1}").into_owned();
    let name = TAG_NAME
        .captures(&stripped)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    (stripped, name)
}

/// Rewrite a `</section>` occurring on the same line as the opening tag.
pub(crate) fn close_section_inline(line: &str, name: &str) -> Option<String> {
    if !line.contains("</section>") {
        return None;
    }
    Some(
        SECTION_CLOSE
            .replace(line, |caps: &Captures| format!("{}</{}>", &caps[1], name))
            .into_owned(),
    )
}

/// Rewrite a whole-line `</section>` close, keeping its indentation.
pub(crate) fn close_section_line(line: &str, name: &str) -> Option<String> {
    let caps = SECTION_CLOSE_LINE.captures(line)?;
    Some(format!("{}</{}>", &caps[1], name))
}

/// Fold `name="<numeric>" units="<word>"` pairs into `name="<numeric><word>"`.
///
/// Every qualifying pair on the line folds; returns the rewritten line and
/// the number of folds. Values that are not literal numerics (notably
/// `${...}` variable references) never qualify: whether the framework wants
/// `size="${RADIUS}mm"` or the unit moved into the variable is an open
/// question of the dialect, so those pairs are left exactly as written.
pub(crate) fn fold_units(line: &str) -> Option<(String, usize)> {
    let folds = UNITS_PAIR.find_iter(line).count();
    if folds == 0 {
        return None;
    }
    Some((
        UNITS_PAIR.replace_all(line, "${1}${2}\"").into_owned(),
        folds,
    ))
}

/// Escape a literal `<` opening a nested tag inside an attribute value, and
/// a literal `>` inside an attribute value at end of line.
///
/// At most one occurrence of each per line.
pub(crate) fn escape_value_brackets(line: &str) -> Option<(String, usize)> {
    let mut fixed = 0;
    let mut out = line.to_string();
    if LT_IN_VALUE.is_match(&out) {
        out = LT_IN_VALUE.replace(&out, "${1}&lt;").into_owned();
        fixed += 1;
    }
    if GT_AT_EOL.is_match(&out) {
        out = GT_AT_EOL.replace(&out, "&gt;${1}").into_owned();
        fixed += 1;
    }
    if fixed == 0 {
        None
    } else {
        Some((out, fixed))
    }
}

/// Turn a self-closed `<for ... />` back into an open tag.
///
/// `for` is a block construct whose body follows on later lines, despite the
/// source dialect writing the head as if it were self-closing.
pub(crate) fn reopen_for_loop(line: &str) -> Option<String> {
    if !FOR_SELF_CLOSED.is_match(line) {
        return None;
    }
    Some(FOR_SELF_CLOSED.replace(line, "${1}>").into_owned())
}

/// Self-close a known tag written as `<tag ...>` with no separate close.
///
/// A trailing same-line XML comment, `%` comment, or `//` comment is
/// tolerated; the inserted `/>` lands before it. Tags carrying same-line
/// body text (`<tag ...>text</tag>`) never match and are left alone.
pub(crate) fn close_self_closing(line: &str) -> Option<String> {
    let listed = match OPEN_TAG.captures(line) {
        Some(caps) => {
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            SELF_CLOSING_TAGS.contains(&tag)
        }
        None => false,
    };
    if !listed && !line.trim_start().starts_with("<add") {
        return None;
    }
    if SC_XML_COMMENT.is_match(line) {
        return Some(TRAIL_XML_COMMENT.replace(line, "/>${1}").into_owned());
    }
    if SC_PLAIN.is_match(line) {
        return Some(TRAIL_PLAIN.replace(line, "/>").into_owned());
    }
    if SC_PERCENT.is_match(line) {
        return Some(TRAIL_PERCENT.replace(line, "/>${1}").into_owned());
    }
    if SC_SLASH.is_match(line) {
        return Some(TRAIL_SLASH.replace(line, "/>${1}").into_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_keyword_is_stripped_and_name_captured() {
        let (line, name) = strip_section_keyword("<section TRestRun name=\"run\">");
        assert_eq!(line, "<TRestRun name=\"run\">");
        assert_eq!(name, "TRestRun");

        let (line, name) = strip_section_keyword("  <section TRestGas>");
        assert_eq!(line, "  <TRestGas>");
        assert_eq!(name, "TRestGas");
    }

    #[test]
    fn section_open_requires_a_name() {
        assert!(is_section_open("<section TRestRun>"));
        assert!(is_section_open("   <section TRestGas name=\"g\">"));
        assert!(!is_section_open("<sectioned>"));
        assert!(!is_section_open("<section>"));
        assert!(!is_section_open("</section>"));
    }

    #[test]
    fn inline_section_close_reuses_the_name() {
        let rewritten =
            close_section_inline("<TRestRun name=\"run\"> </section>", "TRestRun").unwrap();
        assert_eq!(rewritten, "<TRestRun name=\"run\"> </TRestRun>");
    }

    #[test]
    fn whole_line_section_close_keeps_indentation() {
        assert_eq!(
            close_section_line("    </section>", "TRestRun").unwrap(),
            "    </TRestRun>"
        );
        assert_eq!(close_section_line("</section> junk", "TRestRun"), None);
    }

    #[test]
    fn units_fold_onto_numeric_values() {
        let (line, folds) =
            fold_units("<parameter name=\"radius\" value=\"12.5\" units=\"mm\"/>").unwrap();
        assert_eq!(line, "<parameter name=\"radius\" value=\"12.5mm\"/>");
        assert_eq!(folds, 1);
    }

    #[test]
    fn units_fold_signed_and_vector_values() {
        let (line, _) = fold_units("<parameter name=\"z\" value=\"-3.2\" units=\"cm\"/>").unwrap();
        assert_eq!(line, "<parameter name=\"z\" value=\"-3.2cm\"/>");

        let (line, _) =
            fold_units("<parameter name=\"size\" value=\"(10,20,30)\" units=\"mm\"/>").unwrap();
        assert_eq!(line, "<parameter name=\"size\" value=\"(10,20,30)mm\"/>");
    }

    #[test]
    fn units_fold_every_pair_on_the_line() {
        let (line, folds) =
            fold_units("<p a=\"1\" units=\"mm\" b=\"2\" units=\"cm\"/>").unwrap();
        assert_eq!(line, "<p a=\"1mm\" b=\"2cm\"/>");
        assert_eq!(folds, 2);
    }

    #[test]
    fn units_on_variable_references_are_left_alone() {
        assert_eq!(
            fold_units("<parameter name=\"radius\" value=\"${REST_RADIUS}\" units=\"mm\"/>"),
            None
        );
    }

    #[test]
    fn nested_open_bracket_in_value_is_escaped() {
        let (line, fixed) =
            escape_value_brackets("<cut name=\"c\" condition=\"<observable\"/>").unwrap();
        assert_eq!(line, "<cut name=\"c\" condition=\"&lt;observable\"/>");
        assert_eq!(fixed, 1);
    }

    #[test]
    fn trailing_close_bracket_in_value_is_escaped() {
        let (line, fixed) = escape_value_brackets("<cut condition=\"x>3\">").unwrap();
        assert_eq!(line, "<cut condition=\"x&gt;3\">");
        assert_eq!(fixed, 1);
    }

    #[test]
    fn body_text_between_tags_is_not_escaping_material() {
        assert_eq!(escape_value_brackets("<myTag a=\"1\">text</myTag>"), None);
    }

    #[test]
    fn for_loop_head_is_reopened() {
        assert_eq!(
            reopen_for_loop("<for variable=\"n\" from=\"1\" to=\"4\" step=\"1\" />").unwrap(),
            "<for variable=\"n\" from=\"1\" to=\"4\" step=\"1\" >"
        );
        assert_eq!(reopen_for_loop("<for variable=\"n\" from=\"1\" to=\"4\">"), None);
    }

    #[test]
    fn listed_tags_are_self_closed() {
        assert_eq!(
            close_self_closing("<parameter name=\"x\" value=\"1\">").unwrap(),
            "<parameter name=\"x\" value=\"1\"/>"
        );
        assert_eq!(
            close_self_closing("   <variable name=\"A\" value=\"2\" overwrite=\"true\">").unwrap(),
            "   <variable name=\"A\" value=\"2\" overwrite=\"true\"/>"
        );
    }

    #[test]
    fn add_prefixed_tags_are_self_closed() {
        assert_eq!(
            close_self_closing("<addPixel id=\"0\" origin=\"(0,0)\">").unwrap(),
            "<addPixel id=\"0\" origin=\"(0,0)\"/>"
        );
        // No attributes still qualifies through the prefix.
        assert_eq!(close_self_closing("<addNoise>").unwrap(), "<addNoise/>");
    }

    #[test]
    fn already_closed_tags_are_left_alone() {
        assert_eq!(close_self_closing("<parameter name=\"x\" value=\"1\"/>"), None);
        assert_eq!(close_self_closing("<addPixel id=\"0\"/>"), None);
    }

    #[test]
    fn unlisted_tags_are_left_alone() {
        assert_eq!(close_self_closing("<TRestRun name=\"run\">"), None);
        assert_eq!(close_self_closing("<globals>"), None);
    }

    #[test]
    fn trailing_comments_survive_self_closing() {
        assert_eq!(
            close_self_closing("<parameter name=\"x\" value=\"1\"> <!-- in mm -->").unwrap(),
            "<parameter name=\"x\" value=\"1\"/> <!-- in mm -->"
        );
        assert_eq!(
            close_self_closing("<parameter name=\"x\" value=\"1\"> % in mm").unwrap(),
            "<parameter name=\"x\" value=\"1\"/> % in mm"
        );
        assert_eq!(
            close_self_closing("<parameter name=\"x\" value=\"1\"> // in mm").unwrap(),
            "<parameter name=\"x\" value=\"1\"/> // in mm"
        );
    }

    #[test]
    fn tags_with_body_text_are_not_self_closed() {
        assert_eq!(
            close_self_closing("<parameter name=\"x\">1</parameter>"),
            None
        );
    }
}
