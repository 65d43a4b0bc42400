//! Recursive-descent parser for the persisted condition syntax
//!
//! Grammar (loosest binding first):
//!
//! ```text
//! expr  := and ( ("|" | "||") and )*
//! and   := unary ( ("&" | "&&") unary )*
//! unary := ("!" | "-") unary | atom
//! atom  := "(" expr ")" | constant | feature
//! ```
//!
//! Constants are `true`/`false` (case-insensitive) and `1`/`0`. Feature names
//! are runs of `[A-Za-z0-9_]`. Whitespace is insignificant. Both the single
//! and doubled operator spellings are accepted, matching the notations found
//! in extractor output.

use crate::error::FormulaError;
use crate::formula::Formula;

pub(crate) fn parse(text: &str) -> Result<Formula, FormulaError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    if parser.is_at_end() {
        return Err(FormulaError::Empty);
    }
    let formula = parser.expr()?;
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(FormulaError::TrailingInput {
            input: text.to_string(),
            offset: parser.offset,
        });
    }
    Ok(formula)
}

struct Parser<'a> {
    input: &'a str,
    rest: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            rest: input.as_bytes(),
            offset: 0,
        }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.rest.len()
    }

    fn peek(&self) -> Option<u8> {
        self.rest.get(self.offset).copied()
    }

    fn bump(&mut self) {
        self.offset += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Consume `byte`, tolerating the doubled spelling (`&&`, `||`)
    fn eat_operator(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            if self.peek() == Some(byte) {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Formula, FormulaError> {
        let mut operands = vec![self.and()?];
        loop {
            self.skip_whitespace();
            if !self.eat_operator(b'|') {
                break;
            }
            operands.push(self.and()?);
        }
        Ok(Formula::or(operands))
    }

    fn and(&mut self) -> Result<Formula, FormulaError> {
        let mut operands = vec![self.unary()?];
        loop {
            self.skip_whitespace();
            if !self.eat_operator(b'&') {
                break;
            }
            operands.push(self.unary()?);
        }
        Ok(Formula::and(operands))
    }

    fn unary(&mut self) -> Result<Formula, FormulaError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'!') | Some(b'-') => {
                self.bump();
                Ok(Formula::not(self.unary()?))
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Formula, FormulaError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(FormulaError::UnexpectedEnd {
                input: self.input.to_string(),
            }),
            Some(b'(') => {
                self.bump();
                let inner = self.expr()?;
                self.skip_whitespace();
                if self.peek() == Some(b')') {
                    self.bump();
                    Ok(inner)
                } else {
                    Err(FormulaError::UnclosedParenthesis {
                        input: self.input.to_string(),
                    })
                }
            }
            Some(b) if is_feature_byte(b) => Ok(self.word()),
            Some(other) => Err(FormulaError::UnexpectedChar {
                input: self.input.to_string(),
                offset: self.offset,
                found: other as char,
            }),
        }
    }

    fn word(&mut self) -> Formula {
        let start = self.offset;
        while matches!(self.peek(), Some(b) if is_feature_byte(b)) {
            self.bump();
        }
        let word = &self.input[start..self.offset];
        if word == "1" || word.eq_ignore_ascii_case("true") {
            Formula::True
        } else if word == "0" || word.eq_ignore_ascii_case("false") {
            Formula::False
        } else {
            Formula::feature(word)
        }
    }
}

fn is_feature_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feat(name: &str) -> Formula {
        Formula::feature(name)
    }

    #[test]
    fn parses_single_feature() {
        assert_eq!(parse("A").unwrap(), feat("A"));
        assert_eq!(parse("  CONFIG_NET  ").unwrap(), feat("CONFIG_NET"));
    }

    #[test]
    fn parses_constants() {
        assert_eq!(parse("true").unwrap(), Formula::True);
        assert_eq!(parse("False").unwrap(), Formula::False);
        assert_eq!(parse("1").unwrap(), Formula::True);
        assert_eq!(parse("0").unwrap(), Formula::False);
    }

    #[test]
    fn parses_operators_in_both_spellings() {
        let expected = Formula::and([feat("A"), feat("B")]);
        assert_eq!(parse("A & B").unwrap(), expected);
        assert_eq!(parse("A && B").unwrap(), expected);

        let expected = Formula::or([feat("A"), feat("B")]);
        assert_eq!(parse("A | B").unwrap(), expected);
        assert_eq!(parse("A || B").unwrap(), expected);
    }

    #[test]
    fn parses_negation_in_both_spellings() {
        assert_eq!(parse("!A").unwrap(), Formula::not(feat("A")));
        assert_eq!(parse("-A").unwrap(), Formula::not(feat("A")));
        assert_eq!(parse("!!A").unwrap(), feat("A"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let parsed = parse("C & D | E").unwrap();
        assert_eq!(
            parsed,
            Formula::or([Formula::and([feat("C"), feat("D")]), feat("E")])
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let parsed = parse("(C | D) & E").unwrap();
        assert_eq!(
            parsed,
            Formula::and([Formula::or([feat("C"), feat("D")]), feat("E")])
        );
    }

    #[test]
    fn kernel_style_condition() {
        let parsed = parse("(CONFIG_A && !CONFIG_B) || CONFIG_C").unwrap();
        assert_eq!(
            parsed,
            Formula::or([
                Formula::and([feat("CONFIG_A"), Formula::not(feat("CONFIG_B"))]),
                feat("CONFIG_C"),
            ])
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse("").unwrap_err(), FormulaError::Empty);
        assert_eq!(parse("   ").unwrap_err(), FormulaError::Empty);
    }

    #[test]
    fn rejects_trailing_input() {
        assert!(matches!(
            parse("A B").unwrap_err(),
            FormulaError::TrailingInput { offset: 2, .. }
        ));
    }

    #[test]
    fn rejects_unclosed_parenthesis() {
        assert!(matches!(
            parse("(A & B").unwrap_err(),
            FormulaError::UnclosedParenthesis { .. }
        ));
    }

    #[test]
    fn rejects_dangling_operator() {
        assert!(matches!(
            parse("A &").unwrap_err(),
            FormulaError::UnexpectedEnd { .. }
        ));
    }

    #[test]
    fn render_parse_render_is_stable() {
        for text in ["A & (B | C)", "!(A & B) | C", "C && D || E", "!A"] {
            let first = parse(text).unwrap().to_string();
            let second = parse(&first).unwrap().to_string();
            assert_eq!(first, second);
        }
    }
}
