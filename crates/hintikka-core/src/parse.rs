//! Formula parsers: the s-expression text grammar and tagged JSON objects.
//!
//! Text grammar:
//!
//! ```text
//! formula := item (op item)*            top level, parentheses optional
//! item    := atom | top | bottom | true | false | "(" group ")"
//! group   := not item
//!          | K agent item | Kpos agent item | Kw agent item
//!          | Y item
//!          | exactly N atom*
//!          | item (op item)*
//! op      := and | or | xor | imply | -> | equiv | <->
//! ```
//!
//! A group uses a single operator kind; `(p and q or r)` is rejected.

use serde_json::Value;

use crate::error::ParseError;
use crate::formula::Formula;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    Word(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

impl Token {
    fn text(&self) -> String {
        match &self.kind {
            TokenKind::Open => "(".to_string(),
            TokenKind::Close => ")".to_string(),
            TokenKind::Word(w) => w.clone(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']' | '.' | '-' | '\'' | '<' | '>')
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(Token { kind: TokenKind::Open, offset });
        } else if c == ')' {
            chars.next();
            tokens.push(Token { kind: TokenKind::Close, offset });
        } else if is_word_char(c) {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token { kind: TokenKind::Word(word), offset });
        } else {
            return Err(ParseError::UnexpectedToken {
                token: c.to_string(),
                offset,
            });
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
    Xor,
    Imply,
    Equiv,
}

impl Connective {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "and" => Some(Connective::And),
            "or" => Some(Connective::Or),
            "xor" => Some(Connective::Xor),
            "imply" | "->" => Some(Connective::Imply),
            "equiv" | "<->" => Some(Connective::Equiv),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
            Connective::Xor => "xor",
            Connective::Imply => "imply",
            Connective::Equiv => "equiv",
        }
    }
}

fn is_reserved(word: &str) -> bool {
    Connective::from_word(word).is_some()
        || matches!(word, "not" | "K" | "Kpos" | "Kw" | "Y" | "exactly")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.text(),
            offset: token.offset,
        }
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Close => Ok(()),
            _ => Err(Self::unexpected(&token)),
        }
    }

    /// A bare word that is not a keyword: an agent label or atom name.
    fn name(&mut self) -> Result<String, ParseError> {
        let token = self.next()?;
        match &token.kind {
            TokenKind::Word(w) if !is_reserved(w) => Ok(w.clone()),
            _ => Err(Self::unexpected(&token)),
        }
    }

    fn item(&mut self) -> Result<Formula, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Open => {
                let formula = self.group()?;
                self.expect_close()?;
                Ok(formula)
            }
            TokenKind::Close => Err(Self::unexpected(&token)),
            TokenKind::Word(ref w) => match w.as_str() {
                "top" | "true" => Ok(Formula::True),
                "bottom" | "false" => Ok(Formula::False),
                w if is_reserved(w) => Err(Self::unexpected(&token)),
                w => Ok(Formula::atom(w)),
            },
        }
    }

    /// The inside of a parenthesized group, up to but excluding `)`.
    fn group(&mut self) -> Result<Formula, ParseError> {
        let keyword = match self.peek() {
            Some(Token { kind: TokenKind::Word(w), .. }) => w.clone(),
            Some(_) => return self.infix(),
            None => return Err(ParseError::UnexpectedEnd),
        };
        match keyword.as_str() {
            "not" => {
                self.pos += 1;
                Ok(self.item()?.negate())
            }
            "K" | "Kpos" | "Kw" => {
                self.pos += 1;
                let agent = self.name()?;
                let inner = self.item()?;
                Ok(match keyword.as_str() {
                    "K" => Formula::k(agent, inner),
                    "Kpos" => Formula::kpos(agent, inner),
                    _ => Formula::kw(agent, inner),
                })
            }
            "Y" => {
                self.pos += 1;
                Ok(Formula::yesterday(self.item()?))
            }
            "exactly" => {
                self.pos += 1;
                let count_token = self.next()?;
                let count = match &count_token.kind {
                    TokenKind::Word(w) => w
                        .parse::<usize>()
                        .map_err(|_| ParseError::InvalidCount(w.clone()))?,
                    _ => return Err(Self::unexpected(&count_token)),
                };
                let mut atoms = Vec::new();
                while let Some(Token { kind: TokenKind::Word(_), .. }) = self.peek() {
                    atoms.push(self.name()?);
                }
                Ok(Formula::Exactly { count, atoms })
            }
            _ => self.infix(),
        }
    }

    /// `item (op item)*`, stopping before `)` or at end of input.
    fn infix(&mut self) -> Result<Formula, ParseError> {
        let mut operands = vec![self.item()?];
        let mut connective: Option<(Connective, String)> = None;

        while let Some(token) = self.peek() {
            let word = match &token.kind {
                TokenKind::Close => break,
                TokenKind::Word(w) => w.clone(),
                TokenKind::Open => return Err(Self::unexpected(token)),
            };
            let op = Connective::from_word(&word).ok_or_else(|| Self::unexpected(token))?;
            match &connective {
                None => connective = Some((op, word)),
                Some((seen, first)) if *seen != op => {
                    return Err(ParseError::MixedConnectives {
                        first: first.clone(),
                        second: word,
                    });
                }
                Some(_) => {}
            }
            self.pos += 1;
            operands.push(self.item()?);
        }

        let Some((op, _)) = connective else {
            return Ok(operands.remove(0));
        };
        match op {
            Connective::And => Ok(Formula::And(operands)),
            Connective::Or => Ok(Formula::Or(operands)),
            Connective::Xor => Ok(Formula::Xor(operands)),
            Connective::Imply | Connective::Equiv => {
                let [a, b]: [Formula; 2] = operands
                    .try_into()
                    .map_err(|_| ParseError::BinaryArity(op.name()))?;
                Ok(if op == Connective::Imply {
                    Formula::imply(a, b)
                } else {
                    Formula::equiv(a, b)
                })
            }
        }
    }
}

/// Parse the s-expression text grammar.
pub fn parse_formula(input: &str) -> Result<Formula, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let formula = parser.infix()?;
    match parser.peek() {
        None => Ok(formula),
        Some(token) => Err(Parser::unexpected(token)),
    }
}

fn field<'a>(object: &'a Value, key: &str) -> Result<&'a Value, ParseError> {
    object
        .get(key)
        .ok_or_else(|| ParseError::Malformed(format!("missing `{key}`")))
}

fn string_field<'a>(object: &'a Value, key: &str) -> Result<&'a str, ParseError> {
    field(object, key)?
        .as_str()
        .ok_or_else(|| ParseError::Malformed(format!("`{key}` must be a string")))
}

/// Parse a tagged formula object such as
/// `{"type": "modal", "modal": "know", "formula": {"type": "prop", "prop": "p"}}`.
///
/// Modal objects without an `agent` field use `default_agent`.
pub fn parse_formula_object(object: &Value, default_agent: &str) -> Result<Formula, ParseError> {
    let kind = string_field(object, "type")?;
    match kind {
        "prop" => Ok(match string_field(object, "prop")? {
            "true" => Formula::True,
            "false" => Formula::False,
            name => Formula::atom(name),
        }),
        "not" => Ok(parse_formula_object(field(object, "formula")?, default_agent)?.negate()),
        "and" | "or" => {
            let items = field(object, "formulas")?
                .as_array()
                .ok_or_else(|| ParseError::Malformed("`formulas` must be an array".into()))?;
            let operands = items
                .iter()
                .map(|item| parse_formula_object(item, default_agent))
                .collect::<Result<Vec<_>, _>>()?;
            if kind == "and" {
                Formula::and(operands)
            } else {
                Formula::or(operands)
            }
        }
        "implies" | "equiv" => {
            let a = parse_formula_object(field(object, "antecedent")?, default_agent)?;
            let b = parse_formula_object(field(object, "consequent")?, default_agent)?;
            Ok(if kind == "implies" {
                Formula::imply(a, b)
            } else {
                Formula::equiv(a, b)
            })
        }
        "modal" => {
            let inner = parse_formula_object(field(object, "formula")?, default_agent)?;
            let agent = match object.get("agent") {
                Some(value) => value
                    .as_str()
                    .ok_or_else(|| ParseError::Malformed("`agent` must be a string".into()))?,
                None => default_agent,
            };
            match string_field(object, "modal")? {
                "know" => Ok(Formula::k(agent, inner)),
                "poss" => Ok(Formula::kpos(agent, inner)),
                other => Err(ParseError::UnsupportedFormula(format!("modal `{other}`"))),
            }
        }
        other => Err(ParseError::UnsupportedFormula(format!("type `{other}`"))),
    }
}
