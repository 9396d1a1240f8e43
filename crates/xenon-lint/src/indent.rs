//! Indentation normalisation.
//!
//! XenonCode indents with tabs. Editors that insert spaces produce lines
//! the compiler rejects, so leading space runs are rewritten before each
//! line is checked: four spaces become a tab, and a remaining pair of
//! spaces also becomes a tab. Tabs already present at the start of the line
//! are kept and absorbed as the rewrite proceeds, so `"\t    x"` becomes
//! `"\t\tx"`. A single space left over stays where it is, which makes the
//! rewrite stable when applied again.

use std::borrow::Cow;

const WIDE_INDENT: &str = "    ";
const NARROW_INDENT: &str = "  ";

/// Normalises the leading whitespace of one line.
///
/// Returns the input unchanged (borrowed) when no rewrite applies. Text
/// after the first character that is neither a tab nor a rewritten space
/// run is never touched.
#[must_use]
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    let mut tabs = 0_usize;
    let mut rewritten = false;
    let mut rest = line;
    loop {
        let stripped = rest.trim_start_matches('\t');
        tabs += rest.len() - stripped.len();
        if let Some(after) = stripped.strip_prefix(WIDE_INDENT) {
            rest = after;
        } else if let Some(after) = stripped.strip_prefix(NARROW_INDENT) {
            rest = after;
        } else {
            rest = stripped;
            break;
        }
        tabs += 1;
        rewritten = true;
    }

    if rewritten {
        let mut normalised = "\t".repeat(tabs);
        normalised.push_str(rest);
        Cow::Owned(normalised)
    } else {
        Cow::Borrowed(line)
    }
}

/// Normalises every `\n`-separated line of `text`, keeping the line
/// structure intact.
#[must_use]
pub fn normalize_document(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}
