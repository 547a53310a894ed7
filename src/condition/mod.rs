//! Condition expressions used by `if`
//!
//! `&&` and `||` have the same precedence and are applied strictly left to
//! right, so `a && b || c` means `(a && b) || c` and `a || b && c` means
//! `(a || b) && c`. Evaluation never fails: unknown variables and malformed
//! numbers count as zero.

use crate::types::state::GameState;


/// Parenthesis nesting beyond this depth is ignored
pub const MAX_PAREN_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Variable,
    Number,
    Operator,
    ParenOpen,
    ParenClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Le),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    pub fn is_comparison(self) -> bool {
        !matches!(self, Self::And | Self::Or)
    }

    fn compare(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
            Self::And | Self::Or => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionToken {
    pub kind: TokenKind,
    pub text: String,
    /// Set for operator tokens. A lone `&`, `|`, `=` or `!` is an operator
    /// token without an operator and is skipped during evaluation.
    pub op: Option<Operator>,
}

impl ConditionToken {
    fn operand(text: &str) -> Self {
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        let kind = if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            TokenKind::Number
        } else {
            TokenKind::Variable
        };
        Self {
            kind,
            text: text.to_string(),
            op: None,
        }
    }

    fn symbol(text: String) -> Self {
        let (kind, op) = match text.as_str() {
            "(" => (TokenKind::ParenOpen, None),
            ")" => (TokenKind::ParenClose, None),
            other => (TokenKind::Operator, Operator::from_lexeme(other)),
        };
        Self { kind, text, op }
    }

    fn comparison(&self) -> Option<Operator> {
        self.op.filter(|op| op.is_comparison())
    }
}

fn is_symbol_char(c: char) -> bool {
    matches!(c, '&' | '|' | '=' | '!' | '<' | '>' | '(' | ')')
}

fn pairs_with(first: char, second: char) -> bool {
    matches!(
        (first, second),
        ('&', '&') | ('|', '|') | ('=', '=') | ('!', '=') | ('<', '=') | ('>', '=')
    )
}

/// Split a condition into tokens
pub fn tokenize(expr: &str) -> Vec<ConditionToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = expr.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || is_symbol_char(c) {
            if !current.is_empty() {
                tokens.push(ConditionToken::operand(&current));
                current.clear();
            }
            if c.is_whitespace() {
                continue;
            }

            let mut lexeme = c.to_string();
            if let Some(&next) = chars.peek()
                && pairs_with(c, next)
            {
                lexeme.push(next);
                chars.next();
            }
            tokens.push(ConditionToken::symbol(lexeme));
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() {
        tokens.push(ConditionToken::operand(&current));
    }

    tokens
}

/// Resolve an operand: integer literal if it looks numeric, otherwise an int variable
fn operand_value(text: &str, state: &GameState) -> i64 {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        text.parse::<i64>().unwrap_or_else(|_| {
            log::debug!("condition: '{text}' is not a valid integer, using 0");
            0
        })
    } else {
        state.get_int(text)
    }
}

/// Evaluate a token sequence against the state. Pure: the state is only read.
pub fn evaluate(tokens: &[ConditionToken], state: &GameState) -> bool {
    let mut index = 0;
    evaluate_group(tokens, state, &mut index, 0)
}

/// Tokenize and evaluate in one step
pub fn evaluate_str(expr: &str, state: &GameState) -> bool {
    evaluate(&tokenize(expr), state)
}

/// Evaluate until the end of input or a `)` that closes this group
fn evaluate_group(
    tokens: &[ConditionToken],
    state: &GameState,
    index: &mut usize,
    depth: usize,
) -> bool {
    let mut values: Vec<bool> = Vec::new();
    let mut connectives: Vec<Operator> = Vec::new();

    while let Some(token) = tokens.get(*index) {
        match token.kind {
            TokenKind::ParenOpen => {
                *index += 1;
                if depth < MAX_PAREN_DEPTH {
                    values.push(evaluate_group(tokens, state, index, depth + 1));
                } else {
                    log::warn!("condition: parentheses nested deeper than {MAX_PAREN_DEPTH}");
                }
            }
            TokenKind::ParenClose => {
                *index += 1;
                break;
            }
            TokenKind::Variable | TokenKind::Number => {
                if let (Some(op_token), Some(right)) =
                    (tokens.get(*index + 1), tokens.get(*index + 2))
                    && let Some(op) = op_token.comparison()
                {
                    let left = operand_value(&token.text, state);
                    let right = operand_value(&right.text, state);
                    values.push(op.compare(left, right));
                    *index += 3;
                    continue;
                }

                values.push(operand_value(&token.text, state) != 0);
                *index += 1;
            }
            TokenKind::Operator => {
                if let Some(op @ (Operator::And | Operator::Or)) = token.op {
                    connectives.push(op);
                }
                *index += 1;
            }
        }
    }

    let mut values = values.into_iter();
    let Some(mut result) = values.next() else {
        return false;
    };
    for (value, op) in values.zip(connectives) {
        result = match op {
            Operator::And => result && value,
            _ => result || value,
        };
    }
    result
}
