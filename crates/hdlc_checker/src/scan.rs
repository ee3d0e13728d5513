//! A shared, language-aware byte scanner feeding both static checks.
//!
//! This is not a parser: it recognizes just enough structure — words,
//! comments, and the handful of punctuation characters declarations are
//! built from (`( ) : ; ,`) — to let [`crate::unused`] and [`crate::tags`]
//! walk a file without re-deriving comment/string-literal handling twice.
//! String and character literals are skipped so their contents never look
//! like declarations or tags.

use hdlc_model::SourceKind;

/// One scanned token, carrying its 0-based line/column.
#[derive(Debug, Clone, Copy)]
pub enum Tok<'a> {
    /// An identifier-shaped word (keyword or name).
    Word { text: &'a str, line: u32, col: u32 },
    /// A comment's text, with the comment marker itself stripped.
    Comment { text: &'a str, line: u32, col: u32 },
    /// One of `( ) : ; ,` — the punctuation declaration-parsing needs.
    Punct { ch: char, line: u32, col: u32 },
}

/// Scans `source`, recognizing VHDL's `--` comments or Verilog/SystemVerilog's
/// `//` and `/* */` comments depending on `kind`.
pub fn scan(source: &str, kind: SourceKind) -> Vec<Tok<'_>> {
    let vhdl = matches!(kind, SourceKind::Vhdl);
    let bytes = source.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0usize;
    let mut line = 0u32;
    let mut line_start = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
            line_start = i + 1;
            i += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\n' {
                    line += 1;
                    line_start = i + 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            continue;
        }
        if vhdl && b == b'\'' && bytes.get(i + 2) == Some(&b'\'') {
            i += 3;
            continue;
        }
        if vhdl && b == b'-' && bytes.get(i + 1) == Some(&b'-') {
            let col = (i - line_start) as u32;
            i += 2;
            let start = i;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            toks.push(Tok::Comment { text: &source[start..i], line, col });
            continue;
        }
        if !vhdl && b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            let col = (i - line_start) as u32;
            i += 2;
            let start = i;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            toks.push(Tok::Comment { text: &source[start..i], line, col });
            continue;
        }
        if !vhdl && b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let col = (i - line_start) as u32;
            let start_line = line;
            i += 2;
            let start = i;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                if bytes[i] == b'\n' {
                    line += 1;
                    line_start = i + 1;
                }
                i += 1;
            }
            let end = i.min(bytes.len());
            toks.push(Tok::Comment { text: &source[start..end], line: start_line, col });
            i = (i + 2).min(bytes.len());
            continue;
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            let col = (i - line_start) as u32;
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            toks.push(Tok::Word { text: &source[start..i], line, col });
            continue;
        }
        if matches!(b, b'(' | b')' | b':' | b';' | b',') {
            let col = (i - line_start) as u32;
            toks.push(Tok::Punct { ch: b as char, line, col });
            i += 1;
            continue;
        }
        i += 1;
    }
    toks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_comments_and_punct_for_vhdl() {
        let toks = scan("signal a, b : std_logic; -- trailing note", SourceKind::Vhdl);
        let words: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                Tok::Word { text, .. } => Some(*text),
                _ => None,
            })
            .collect();
        assert_eq!(words, vec!["signal", "a", "b", "std_logic"]);
        assert!(toks.iter().any(|t| matches!(t, Tok::Comment { text, .. } if text.trim() == "trailing note")));
    }

    #[test]
    fn recognizes_verilog_block_comments() {
        let toks = scan("wire a; /* keep\n this */", SourceKind::Verilog);
        assert!(toks.iter().any(|t| matches!(t, Tok::Comment { text, .. } if text.contains("keep"))));
    }

    #[test]
    fn string_contents_are_not_scanned_as_words() {
        let toks = scan(r#"report "signal not a keyword here";"#, SourceKind::Vhdl);
        assert!(!toks.iter().any(|t| matches!(t, Tok::Word { text, .. } if *text == "not")));
    }
}
