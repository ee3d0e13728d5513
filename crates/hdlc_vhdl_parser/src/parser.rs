//! Extracts design units and dependencies from a token stream.
//!
//! This is *not* a full VHDL parser: it walks the token stream looking for
//! the handful of clauses §4.1 cares about (`entity`, `architecture`,
//! `package [body]`, `context`, `configuration`, `library`, `use`, and
//! dotted `LIB.NAME` references) and skips everything else. Malformed or
//! unrecognized constructs are never reported as errors — they are simply
//! not matched, so editor interactivity is never blocked on a syntax error
//! in code the user hasn't finished typing yet.

use crate::token::{Token, VhdlToken};
use hdlc_common::Interner;
use hdlc_model::{DependencyLibrary, DesignUnit, DesignUnitKind, Dependency, Location};

/// The result of scanning one VHDL file: its declared design units and the
/// dependencies it references. VHDL has no include directive, so the third
/// element of C2's output contract is always empty for this parser.
pub struct ScanResult {
    /// Declared design units.
    pub design_units: Vec<DesignUnit>,
    /// Referenced dependencies.
    pub dependencies: Vec<Dependency>,
}

/// Scans `tokens` (as produced by [`crate::lexer::lex`]) and extracts design
/// units and dependencies, interning identifiers case-insensitively per
/// VHDL's folding rule.
pub fn scan(tokens: &[Token], source: &str, owner: &hdlc_common::SourcePath, interner: &Interner) -> ScanResult {
    let mut cursor = Cursor {
        tokens,
        source,
        pos: 0,
    };
    let mut design_units = Vec::new();
    let mut dependencies = Vec::new();

    while !cursor.at_eof() {
        let tok = cursor.peek();
        match tok.kind {
            VhdlToken::Entity => {
                cursor.advance();
                if let Some(name_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Is) {
                        let name = intern_name(&cursor, name_tok, interner);
                        design_units.push(DesignUnit::new(
                            name,
                            DesignUnitKind::Entity,
                            owner.clone(),
                            loc(name_tok),
                        ));
                    }
                }
            }
            VhdlToken::Architecture => {
                cursor.advance();
                if let Some(name_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Of) {
                        // The referenced entity name is consumed but not
                        // recorded as a Dependency — it is declared in the
                        // same design (§4.1 lists only `use` clauses and
                        // dotted/instantiation references as dependencies).
                        cursor.expect_identifier();
                        if cursor.eat(VhdlToken::Is) {
                            let name = intern_name(&cursor, name_tok, interner);
                            design_units.push(DesignUnit::new(
                                name,
                                DesignUnitKind::Architecture,
                                owner.clone(),
                                loc(name_tok),
                            ));
                        }
                    }
                }
            }
            VhdlToken::Package => {
                cursor.advance();
                let is_body = cursor.eat(VhdlToken::Body);
                if let Some(name_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Is) {
                        let name = intern_name(&cursor, name_tok, interner);
                        let kind = if is_body {
                            DesignUnitKind::PackageBody
                        } else {
                            DesignUnitKind::Package
                        };
                        design_units.push(DesignUnit::new(name, kind, owner.clone(), loc(name_tok)));
                    }
                }
            }
            VhdlToken::Context => {
                cursor.advance();
                if let Some(name_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Is) {
                        let name = intern_name(&cursor, name_tok, interner);
                        design_units.push(DesignUnit::new(
                            name,
                            DesignUnitKind::Context,
                            owner.clone(),
                            loc(name_tok),
                        ));
                    }
                }
            }
            VhdlToken::Configuration => {
                cursor.advance();
                if let Some(name_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Of) {
                        let name = intern_name(&cursor, name_tok, interner);
                        design_units.push(DesignUnit::new(
                            name,
                            DesignUnitKind::Configuration,
                            owner.clone(),
                            loc(name_tok),
                        ));
                    }
                }
            }
            VhdlToken::Library => {
                cursor.advance();
                // `library LIB, LIB2;` — establishes known library prefixes.
                // Not a Dependency itself; only consumed so its identifiers
                // are not mistaken for a dotted reference later.
                while !cursor.at_eof() && cursor.peek().kind != VhdlToken::Semicolon {
                    cursor.advance();
                }
                cursor.eat(VhdlToken::Semicolon);
            }
            VhdlToken::Use => {
                cursor.advance();
                if let Some(lib_tok) = cursor.expect_identifier() {
                    if cursor.eat(VhdlToken::Dot) {
                        if let Some(pkg_tok) = cursor.expect_identifier() {
                            let lib = intern_library(&cursor, lib_tok, interner);
                            let name = intern_name(&cursor, pkg_tok, interner);
                            dependencies.push(Dependency::new(lib, name, loc(pkg_tok)));
                        }
                    }
                }
                while !cursor.at_eof() && cursor.peek().kind != VhdlToken::Semicolon {
                    cursor.advance();
                }
                cursor.eat(VhdlToken::Semicolon);
            }
            VhdlToken::Identifier => {
                // A bare `LIB.NAME` reference — covers both `entity
                // work.NAME` instantiations and direct `LIB.ENTITY_NAME`
                // references inside an architecture body.
                if cursor.peek_at(1).map(|t| t.kind) == Some(VhdlToken::Dot)
                    && cursor.peek_at(2).map(|t| t.kind) == Some(VhdlToken::Identifier)
                {
                    let lib_tok = tok;
                    let name_tok = cursor.peek_at(2).unwrap();
                    let lib = intern_library(&cursor, lib_tok, interner);
                    let name = intern_name(&cursor, name_tok, interner);
                    dependencies.push(Dependency::new(lib, name, loc(name_tok)));
                    cursor.advance();
                    cursor.advance();
                    cursor.advance();
                } else {
                    cursor.advance();
                }
            }
            _ => {
                cursor.advance();
            }
        }
    }

    ScanResult {
        design_units,
        dependencies,
    }
}

fn loc(tok: Token) -> Location {
    Location::new(tok.line, tok.col)
}

fn text_of<'a>(source: &'a str, tok: Token) -> &'a str {
    source.get(tok.start..tok.end).unwrap_or("")
}

fn intern_name(
    cursor: &Cursor,
    tok: Token,
    interner: &Interner,
) -> hdlc_common::Identifier {
    hdlc_common::Identifier::case_insensitive(interner, text_of(cursor.source, tok))
}

fn intern_library(cursor: &Cursor, tok: Token, interner: &Interner) -> DependencyLibrary {
    let text = text_of(cursor.source, tok);
    if text.eq_ignore_ascii_case("work") {
        DependencyLibrary::Work
    } else {
        DependencyLibrary::Named(hdlc_common::Identifier::case_insensitive(interner, text))
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at_eof(&self) -> bool {
        self.tokens[self.pos].kind == VhdlToken::Eof
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

    fn eat(&mut self, kind: VhdlToken) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self) -> Option<Token> {
        if self.peek().kind == VhdlToken::Identifier {
            Some(self.advance())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use hdlc_common::SourcePath;

    fn scan_str(src: &str) -> (ScanResult, Interner) {
        let interner = Interner::new();
        let path = SourcePath::missing("/tmp/test.vhd");
        let tokens = lex(src);
        (scan(&tokens, src, &path, &interner), interner)
    }

    #[test]
    fn entity_and_architecture() {
        let (r, interner) = scan_str(
            "entity foo is\nend entity foo;\narchitecture rtl of foo is\nbegin\nend architecture rtl;",
        );
        assert_eq!(r.design_units.len(), 2);
        assert_eq!(r.design_units[0].kind, DesignUnitKind::Entity);
        assert_eq!(r.design_units[1].kind, DesignUnitKind::Architecture);
        assert_eq!(r.design_units[0].name.render(&interner), "foo");
    }

    #[test]
    fn package_and_body_distinguished() {
        let (r, _) = scan_str("package p is\nend package p;\npackage body p is\nend package body p;");
        assert_eq!(r.design_units[0].kind, DesignUnitKind::Package);
        assert_eq!(r.design_units[1].kind, DesignUnitKind::PackageBody);
    }

    #[test]
    fn use_clause_dependency() {
        let (r, interner) = scan_str("library lib_a;\nuse lib_a.pkg.all;\nentity foo is\nend entity foo;");
        assert_eq!(r.dependencies.len(), 1);
        assert_eq!(
            r.dependencies[0].library,
            DependencyLibrary::Named(hdlc_common::Identifier::case_insensitive(&interner, "lib_a"))
        );
        assert_eq!(r.dependencies[0].name.render(&interner), "pkg");
    }

    #[test]
    fn work_sentinel_instantiation() {
        let (r, _) = scan_str(
            "architecture rtl of top is\nbegin\n  u1 : entity work.sub port map (a => b);\nend architecture rtl;",
        );
        assert!(r
            .dependencies
            .iter()
            .any(|d| d.library == DependencyLibrary::Work));
    }

    #[test]
    fn identifiers_fold_case() {
        let (r, interner) = scan_str("ENTITY Foo IS\nEND entity Foo;");
        let name = r.design_units[0].name;
        assert_eq!(
            name,
            hdlc_common::Identifier::case_insensitive(&interner, "foo")
        );
    }

    #[test]
    fn malformed_construct_is_skipped_not_errored() {
        let (r, _) = scan_str("entity is begin end; -- missing name, must not panic");
        assert!(r.design_units.is_empty());
    }

    #[test]
    fn context_and_configuration() {
        let (r, _) = scan_str(
            "context ctx is\nend context ctx;\nconfiguration cfg of top is\nend configuration cfg;",
        );
        assert_eq!(r.design_units[0].kind, DesignUnitKind::Context);
        assert_eq!(r.design_units[1].kind, DesignUnitKind::Configuration);
    }
}
