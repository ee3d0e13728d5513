//! Unused-declaration check (§4.5, first bullet).
//!
//! Scoped to VHDL, since the declaration shapes named by the check —
//! `signal`, `constant`, `variable` (including `shared variable`),
//! `generic`, `library`, `type`, `attribute` — are VHDL vocabulary with no
//! direct Verilog/SystemVerilog equivalent. A name is flagged when it never
//! occurs anywhere else in the file; since the scanner never recognizes
//! component, procedure, or function formal parameters as declarations in
//! the first place, those are never flagged, matching the known caveat.

use crate::scan::{scan, Tok};
use hdlc_diagnostics::Diagnostic;
use hdlc_model::SourceKind;
use std::collections::HashMap;
use std::path::Path;

struct Declaration {
    name: String,
    line: u32,
    col: u32,
}

/// Reports one `unused`-coded Warning per declared identifier that never
/// reappears elsewhere in the file. A no-op outside VHDL.
pub fn check(path: &Path, kind: SourceKind, source: &str) -> Vec<Diagnostic> {
    if !matches!(kind, SourceKind::Vhdl) {
        return Vec::new();
    }

    let tokens = scan(source, kind);
    let mut word_counts: HashMap<String, u32> = HashMap::new();
    for tok in &tokens {
        if let Tok::Word { text, .. } = tok {
            *word_counts.entry(text.to_ascii_lowercase()).or_insert(0) += 1;
        }
    }

    let declarations = collect_declarations(&tokens);
    declarations
        .into_iter()
        .filter(|decl| word_counts.get(&decl.name.to_ascii_lowercase()).copied().unwrap_or(0) <= 1)
        .map(|decl| {
            Diagnostic::warning(path.to_path_buf(), decl.line, format!("declared but never used: '{}'", decl.name))
                .with_col(decl.col)
                .with_code("unused")
        })
        .collect()
}

fn collect_declarations(tokens: &[Tok<'_>]) -> Vec<Declaration> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < tokens.len() {
        let Tok::Word { text, .. } = tokens[i] else {
            i += 1;
            continue;
        };
        match text.to_ascii_lowercase().as_str() {
            "signal" | "constant" | "variable" | "library" => {
                i = collect_identifier_list(tokens, i + 1, &mut out);
            }
            "type" => {
                if let Some(Tok::Word { text, line, col }) = tokens.get(i + 1) {
                    out.push(Declaration { name: (*text).to_string(), line: *line, col: *col });
                }
                i += 2;
            }
            "attribute" => {
                if let (Some(Tok::Word { text, line, col }), Some(Tok::Punct { ch: ':', .. })) =
                    (tokens.get(i + 1), tokens.get(i + 2))
                {
                    out.push(Declaration { name: (*text).to_string(), line: *line, col: *col });
                }
                i += 2;
            }
            "generic" => {
                if matches!(tokens.get(i + 1), Some(Tok::Punct { ch: '(', .. })) {
                    i = collect_generic_list(tokens, i + 2, &mut out);
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    out
}

/// Collects a comma-separated identifier list, then skips to (and past) the
/// terminating `;`, ignoring any nested `( )` the type/default expression
/// contains.
fn collect_identifier_list(tokens: &[Tok<'_>], i: usize, out: &mut Vec<Declaration>) -> usize {
    let i = collect_names(tokens, i, out);
    let i = skip_balanced_to(tokens, i, &[';']);
    match tokens.get(i) {
        Some(Tok::Punct { ch: ';', .. }) => i + 1,
        _ => i,
    }
}

/// Collects one or more `name [, name]* : type [:= default]` entries inside
/// a `generic ( ... )` list, stopping after the closing `)`.
fn collect_generic_list(tokens: &[Tok<'_>], mut i: usize, out: &mut Vec<Declaration>) -> usize {
    loop {
        match tokens.get(i) {
            Some(Tok::Punct { ch: ')', .. }) => return i + 1,
            None => return i,
            _ => {}
        }
        i = collect_names(tokens, i, out);
        i = skip_balanced_to(tokens, i, &[';', ')']);
        match tokens.get(i) {
            Some(Tok::Punct { ch: ';', .. }) => i += 1,
            Some(Tok::Punct { ch: ')', .. }) => return i + 1,
            _ => return i,
        }
    }
}

fn collect_names(tokens: &[Tok<'_>], mut i: usize, out: &mut Vec<Declaration>) -> usize {
    loop {
        match tokens.get(i) {
            Some(Tok::Word { text, line, col }) => {
                out.push(Declaration { name: (*text).to_string(), line: *line, col: *col });
                i += 1;
            }
            _ => break,
        }
        if matches!(tokens.get(i), Some(Tok::Punct { ch: ',', .. })) {
            i += 1;
            continue;
        }
        break;
    }
    i
}

/// Advances past tokens, tracking `( )` nesting, until a character in
/// `stop_chars` is reached at nesting depth 0 (or input runs out).
fn skip_balanced_to(tokens: &[Tok<'_>], mut i: usize, stop_chars: &[char]) -> usize {
    let mut depth = 0i32;
    loop {
        match tokens.get(i) {
            None => return i,
            Some(Tok::Punct { ch, .. }) => {
                if depth == 0 && stop_chars.contains(ch) {
                    return i;
                }
                if *ch == '(' {
                    depth += 1;
                } else if *ch == ')' {
                    depth -= 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_an_unused_signal() {
        let src = "architecture rtl of foo is\nsignal neat_signal : std_logic_vector(7 downto 0);\nbegin\nend architecture;";
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("unused"));
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn does_not_flag_a_used_signal() {
        let src = "architecture rtl of foo is\nsignal en : std_logic;\nbegin\nout_sig <= en;\nend architecture;";
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, src);
        assert!(diags.is_empty());
    }

    #[test]
    fn flags_unused_generic_but_not_port() {
        let src = "entity foo is\ngeneric ( WIDTH : integer := 8 );\nport ( clk : in std_logic );\nend entity;";
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("WIDTH"));
    }

    #[test]
    fn does_not_check_verilog() {
        let src = "module foo;\nwire unused_wire;\nendmodule";
        let diags = check(&PathBuf::from("foo.v"), SourceKind::Verilog, src);
        assert!(diags.is_empty());
    }

    #[test]
    fn multiple_signals_in_one_declaration() {
        let src = "architecture rtl of foo is\nsignal a, b : std_logic;\nbegin\nx <= a;\nend architecture;";
        let diags = check(&PathBuf::from("foo.vhd"), SourceKind::Vhdl, src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains('b'));
    }
}
