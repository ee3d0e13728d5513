//! Comment-tag check (§4.5, second bullet): `TODO`/`FIXME`/`XXX` inside a
//! comment become an informational diagnostic, tag as code, trailer as
//! message.

use crate::scan::{scan, Tok};
use hdlc_diagnostics::Diagnostic;
use hdlc_model::SourceKind;
use std::path::Path;

const TAGS: [&str; 3] = ["TODO", "FIXME", "XXX"];

/// Reports one `Note`-severity diagnostic per tagged comment, in source order.
pub fn check(path: &Path, kind: SourceKind, source: &str) -> Vec<Diagnostic> {
    scan(source, kind)
        .into_iter()
        .filter_map(|tok| match tok {
            Tok::Comment { text, line, col } => {
                let (tag, message) = extract_tag(text)?;
                Some(Diagnostic::note(path.to_path_buf(), line, message).with_col(col).with_code(tag))
            }
            _ => None,
        })
        .collect()
}

/// Finds the earliest `TODO`/`FIXME`/`XXX` word in `comment` and splits off
/// its trailer (stripped of a leading `:` and surrounding whitespace) as the
/// message. Falls back to the whole trimmed comment when there is no
/// trailer text, so the diagnostic is never empty.
fn extract_tag(comment: &str) -> Option<(&'static str, String)> {
    let mut best: Option<(usize, &'static str)> = None;
    for tag in TAGS {
        if let Some(idx) = find_word(comment, tag) {
            let better = match best {
                Some((b, _)) => idx < b,
                None => true,
            };
            if better {
                best = Some((idx, tag));
            }
        }
    }
    let (idx, tag) = best?;
    let after = &comment[idx + tag.len()..];
    let trailer = after.trim_start_matches([':', ' ', '\t']).trim();
    let message = if trailer.is_empty() { comment.trim().to_string() } else { trailer.to_string() };
    Some((tag, message))
}

/// Finds `word` in `haystack` at a word boundary (not embedded in a longer
/// identifier, e.g. `TODOLIST` does not match `TODO`).
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let idx = start + pos;
        let before_ok = idx == 0 || !bytes[idx - 1].is_ascii_alphanumeric();
        let after_idx = idx + word.len();
        let after_ok = after_idx >= bytes.len() || !bytes[after_idx].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(idx);
        }
        start = idx + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlc_diagnostics::Severity;
    use std::path::PathBuf;

    #[test]
    fn extracts_todo_trailer() {
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, "signal a : std_logic; -- TODO: widen this bus");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Note);
        assert_eq!(diags[0].code.as_deref(), Some("TODO"));
        assert_eq!(diags[0].message, "widen this bus");
    }

    #[test]
    fn picks_earliest_tag_when_comment_has_several() {
        let (tag, _) = extract_tag("FIXME later, also a TODO here").unwrap();
        assert_eq!(tag, "FIXME");
    }

    #[test]
    fn does_not_match_tag_inside_longer_word() {
        assert!(find_word("a TODOLIST exists", "TODO").is_none());
    }

    #[test]
    fn plain_comment_yields_no_diagnostic() {
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, "-- just a note, nothing special");
        assert!(diags.is_empty());
    }

    #[test]
    fn verilog_block_comment_tag() {
        let diags = check(&PathBuf::from("foo.v"), SourceKind::Verilog, "wire a; /* XXX: check polarity */");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("XXX"));
        assert_eq!(diags[0].message, "check polarity");
    }
}
