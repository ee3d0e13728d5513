//! Byte-oriented lexical scanner for Verilog/SystemVerilog source text.
//!
//! Strips `//` line comments and `/* */` block comments, skips over string
//! literal and escaped-identifier bodies, recognizes `` `include "path" ``
//! directives and passes every other backtick directive through unexamined,
//! and emits everything else as a [`Token`].

use crate::token::{lookup_keyword, Token, VerilogToken};

/// Lexes `source` into a vector of tokens, always ending with `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let line_starts = compute_line_starts(source);
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        line_starts: &line_starts,
    };
    lexer.lex_all()
}

fn compute_line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line_starts: &'a [usize],
}

impl<'a> Lexer<'a> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(self.make_token(VerilogToken::Eof, self.pos, self.pos));
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line as u32, col as u32)
    }

    fn make_token(&self, kind: VerilogToken, start: usize, end: usize) -> Token {
        let (line, col) = self.line_col(start);
        Token {
            kind,
            start,
            end,
            line,
            col,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.pos += 2;
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                self.pos += 2;
                while self.pos < self.source.len()
                    && !(self.peek() == b'*' && self.peek_at(1) == b'/')
                {
                    self.pos += 1;
                }
                if self.pos < self.source.len() {
                    self.pos += 2;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if b == b'`' {
            return self.lex_directive(start);
        }
        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }
        if b == b'\\' {
            return self.lex_escaped_identifier(start);
        }
        if b == b'"' {
            return self.lex_string(start);
        }
        if b == b':' && self.peek_at(1) == b':' {
            self.pos += 2;
            return self.make_token(VerilogToken::ColonColon, start, self.pos);
        }

        self.pos += 1;
        let kind = match b {
            b'.' => VerilogToken::Dot,
            b'#' => VerilogToken::Hash,
            b'(' => VerilogToken::LParen,
            b')' => VerilogToken::RParen,
            b';' => VerilogToken::Semicolon,
            b',' => VerilogToken::Comma,
            _ => VerilogToken::Other,
        };
        self.make_token(kind, start, self.pos)
    }

    fn lex_directive(&mut self, start: usize) -> Token {
        self.pos += 1; // backtick
        let name_start = self.pos;
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }
        let name = std::str::from_utf8(&self.source[name_start..self.pos]).unwrap_or("");
        if name == "include" {
            return self.make_token(VerilogToken::Include, start, self.pos);
        }
        // Any other directive (`ifdef, `define, `timescale, ...) is out of
        // scope for dependency extraction — swallow through end of line.
        while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
            self.pos += 1;
        }
        self.make_token(VerilogToken::OtherDirective, start, self.pos)
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = lookup_keyword(text).unwrap_or(VerilogToken::Identifier);
        self.make_token(kind, start, self.pos)
    }

    fn lex_escaped_identifier(&mut self, start: usize) -> Token {
        self.pos += 1;
        while self.pos < self.source.len() && !self.source[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        self.make_token(VerilogToken::Identifier, start, self.pos)
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1;
        while self.pos < self.source.len() && self.source[self.pos] != b'"' {
            if self.source[self.pos] == b'\\' {
                self.pos += 1;
            }
            self.pos += 1;
        }
        if self.pos < self.source.len() {
            self.pos += 1;
        }
        self.make_token(VerilogToken::StringLiteral, start, self.pos)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_line_and_block_comments() {
        let toks = lex("module foo // trailing\n/* block */ ;");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VerilogToken::Module,
                VerilogToken::Identifier,
                VerilogToken::Semicolon,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let toks = lex("Module foo");
        assert_eq!(toks[0].kind, VerilogToken::Identifier);
    }

    #[test]
    fn include_directive_recognized() {
        let toks = lex(r#"`include "foo/bar.vh""#);
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VerilogToken::Include,
                VerilogToken::StringLiteral,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn other_directive_is_swallowed() {
        let toks = lex("`timescale 1ns/1ps\nmodule foo;");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VerilogToken::OtherDirective,
                VerilogToken::Module,
                VerilogToken::Identifier,
                VerilogToken::Semicolon,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn scope_resolution_token() {
        let toks = lex("import my_pkg::*;");
        assert_eq!(toks[0].kind, VerilogToken::Import);
        assert_eq!(toks[1].kind, VerilogToken::Identifier);
        assert_eq!(toks[2].kind, VerilogToken::ColonColon);
    }
}
