//! Extracts design units, dependencies, and includes from a token stream.
//!
//! Like [`hdlc_vhdl_parser::parser`], this walks the token stream looking
//! for a handful of recognizable shapes and ignores everything else:
//! `module`/`package`/`interface`/`program` declarations, `` `include ``
//! directives, `import PKG::...` references, and bare module instantiations
//! (`TYPE inst_name (`). Nothing here fails — an unrecognized or malformed
//! construct is simply not matched.

use crate::token::{Token, VerilogToken};
use hdlc_common::Interner;
use hdlc_model::{DependencyLibrary, DesignUnit, DesignUnitKind, Dependency, Location};
use std::path::PathBuf;

/// Which dialect is being scanned. `import` references and the
/// `interface`/`program` design-unit kinds are SystemVerilog-only
/// constructs; under [`Dialect::Verilog`] those tokens are treated as plain
/// identifiers instead, since Verilog-2005 does not reserve them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dialect {
    /// Verilog-2005.
    Verilog,
    /// SystemVerilog-2017.
    SystemVerilog,
}

/// The result of scanning one Verilog/SystemVerilog file.
pub struct ScanResult {
    /// Declared design units.
    pub design_units: Vec<DesignUnit>,
    /// Referenced dependencies: `import`s and module instantiations.
    ///
    /// Verilog and SystemVerilog have no VHDL-style library prefixing, so
    /// every dependency here uses [`DependencyLibrary::Work`] as a "resolve
    /// by name, ignoring library" sentinel rather than a true same-library
    /// reference.
    pub dependencies: Vec<Dependency>,
    /// `` `include `` targets, relative to the including file.
    pub includes: Vec<PathBuf>,
}

/// Identifiers that can begin a statement or declaration and must not be
/// mistaken for an instantiation's type name when immediately followed by
/// `IDENT (` — this scanner has no keyword entry for them, so without this
/// list `wire foo (...)` would look exactly like a module instantiation.
const NON_INSTANCE_LEADERS: &[&str] = &[
    "wire", "reg", "input", "output", "inout", "parameter", "localparam", "integer", "real",
    "genvar", "function", "task", "always", "always_comb", "always_ff", "always_latch", "initial",
    "assign", "begin", "end", "if", "else", "for", "while", "case", "casex", "casez", "generate",
    "endgenerate", "signed", "unsigned", "automatic", "defparam", "disable", "forever", "repeat",
    "supply0", "supply1", "tri", "buf", "not", "and", "or", "nand", "nor", "xor", "xnor",
    "posedge", "negedge", "edge", "wait", "return", "typedef", "struct", "enum", "logic", "bit",
    "byte", "int", "longint", "shortint", "void",
];

/// Scans `tokens` (as produced by [`crate::lexer::lex`]) and extracts design
/// units, dependencies, and includes. Identifiers are interned case-sensitively
/// per Verilog/SystemVerilog's identifier rule.
pub fn scan(
    tokens: &[Token],
    source: &str,
    owner: &hdlc_common::SourcePath,
    interner: &Interner,
    dialect: Dialect,
) -> ScanResult {
    let mut cursor = Cursor {
        tokens,
        source,
        pos: 0,
    };
    let mut design_units = Vec::new();
    let mut dependencies = Vec::new();
    let mut includes = Vec::new();

    while !cursor.at_eof() {
        let tok = cursor.peek();
        match tok.kind {
            VerilogToken::Module => {
                cursor.advance();
                push_unit(&mut cursor, &mut design_units, owner, interner, DesignUnitKind::VerilogModule);
            }
            VerilogToken::Package => {
                cursor.advance();
                push_unit(&mut cursor, &mut design_units, owner, interner, DesignUnitKind::VerilogPackage);
            }
            VerilogToken::Interface if dialect == Dialect::SystemVerilog => {
                cursor.advance();
                push_unit(&mut cursor, &mut design_units, owner, interner, DesignUnitKind::VerilogInterface);
            }
            VerilogToken::Program if dialect == Dialect::SystemVerilog => {
                cursor.advance();
                push_unit(&mut cursor, &mut design_units, owner, interner, DesignUnitKind::VerilogProgram);
            }
            VerilogToken::Import if dialect == Dialect::SystemVerilog => {
                cursor.advance();
                if let Some(pkg_tok) = cursor.expect_identifier() {
                    if cursor.eat(VerilogToken::ColonColon) {
                        let name = hdlc_common::Identifier::case_sensitive(
                            interner,
                            cursor.text(pkg_tok),
                        );
                        dependencies.push(Dependency::new(DependencyLibrary::Work, name, loc(pkg_tok)));
                    }
                }
                while !cursor.at_eof() && cursor.peek().kind != VerilogToken::Semicolon {
                    cursor.advance();
                }
                cursor.eat(VerilogToken::Semicolon);
            }
            VerilogToken::Include => {
                cursor.advance();
                if cursor.peek().kind == VerilogToken::StringLiteral {
                    let str_tok = cursor.advance();
                    let raw = cursor.text(str_tok);
                    let inner = raw.trim_matches('"');
                    includes.push(PathBuf::from(inner));
                }
            }
            VerilogToken::Identifier => {
                let text = cursor.text(tok);
                if !NON_INSTANCE_LEADERS.contains(&text) {
                    // `TYPE inst (` or `TYPE #( params ) inst (` — the
                    // parameter list, if present, is skipped by matching
                    // parens before looking for the instance name.
                    let mut offset = 1;
                    let param_ok = if cursor.peek_at(offset).map(|t| t.kind) == Some(VerilogToken::Hash) {
                        match skip_param_list(&cursor, offset) {
                            Some(new_offset) => {
                                offset = new_offset;
                                true
                            }
                            None => false,
                        }
                    } else {
                        true
                    };
                    if param_ok
                        && cursor.peek_at(offset).map(|t| t.kind) == Some(VerilogToken::Identifier)
                        && cursor.peek_at(offset + 1).map(|t| t.kind) == Some(VerilogToken::LParen)
                    {
                        let name = hdlc_common::Identifier::case_sensitive(interner, text);
                        dependencies.push(Dependency::new(DependencyLibrary::Work, name, loc(tok)));
                    }
                }
                cursor.advance();
            }
            _ => {
                cursor.advance();
            }
        }
    }

    ScanResult {
        design_units,
        dependencies,
        includes,
    }
}

fn push_unit(
    cursor: &mut Cursor,
    design_units: &mut Vec<DesignUnit>,
    owner: &hdlc_common::SourcePath,
    interner: &Interner,
    kind: DesignUnitKind,
) {
    if let Some(name_tok) = cursor.expect_identifier() {
        let name = hdlc_common::Identifier::case_sensitive(interner, cursor.text(name_tok));
        design_units.push(DesignUnit::new(name, kind, owner.clone(), loc(name_tok)));
    }
}

/// Given `offset` pointing at a `#` token, skips the balanced `#( ... )`
/// parameter list and returns the offset just past its closing paren, or
/// `None` if the parens never balance before EOF.
fn skip_param_list(cursor: &Cursor, mut offset: usize) -> Option<usize> {
    if cursor.peek_at(offset).map(|t| t.kind) != Some(VerilogToken::Hash) {
        return None;
    }
    offset += 1;
    if cursor.peek_at(offset).map(|t| t.kind) != Some(VerilogToken::LParen) {
        return None;
    }
    let mut depth = 0i32;
    loop {
        match cursor.peek_at(offset).map(|t| t.kind) {
            Some(VerilogToken::LParen) => {
                depth += 1;
                offset += 1;
            }
            Some(VerilogToken::RParen) => {
                depth -= 1;
                offset += 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            Some(VerilogToken::Eof) | None => return None,
            _ => offset += 1,
        }
    }
}

fn loc(tok: Token) -> Location {
    Location::new(tok.line, tok.col)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at_eof(&self) -> bool {
        self.tokens[self.pos].kind == VerilogToken::Eof
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: VerilogToken) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self) -> Option<Token> {
        if self.peek().kind == VerilogToken::Identifier {
            Some(self.advance())
        } else {
            None
        }
    }

    fn text(&self, tok: Token) -> &'a str {
        self.source.get(tok.start..tok.end).unwrap_or("")
    }
}
