use crate::error::Span;
use crate::lexer::{Token, TokenKind};
use std::fmt;
use std::mem;

/// Root of a parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        token: Token,
        name: Identifier,
        value: Option<Expression>,
    },
    Print {
        token: Token,
        value: Option<Expression>,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Assign { token, .. } => token,
            Statement::Print { token, .. } => token,
            Statement::Expression { token, .. } => token,
        }
    }

    pub fn span(&self) -> Span {
        self.token().span
    }
}

/// `{ ... }` body of an `if` or `while`. Blocks do not exist on their own at
/// statement level, so this is not a `Statement` variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl InfixOp {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Subtract,
            TokenKind::Star => InfixOp::Multiply,
            TokenKind::Slash => InfixOp::Divide,
            TokenKind::Percent => InfixOp::Modulo,
            TokenKind::EqualEqual => InfixOp::Equal,
            TokenKind::BangEqual => InfixOp::NotEqual,
            TokenKind::Less => InfixOp::Less,
            TokenKind::LessEqual => InfixOp::LessEqual,
            TokenKind::Greater => InfixOp::Greater,
            TokenKind::GreaterEqual => InfixOp::GreaterEqual,
            TokenKind::AndAnd => InfixOp::And,
            TokenKind::OrOr => InfixOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Modulo => "%",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::LessEqual => "<=",
            InfixOp::Greater => ">",
            InfixOp::GreaterEqual => ">=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: InfixOp,
        right: Option<Box<Expression>>,
    },
    /// Reserved: the grammar has no prefix operators, so the parser never
    /// builds one.
    Prefix {
        token: Token,
        operator: String,
        right: Option<Box<Expression>>,
    },
    If {
        token: Token,
        condition: Option<Box<Expression>>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    While {
        token: Token,
        condition: Option<Box<Expression>>,
        body: BlockStatement,
    },
}

impl Expression {
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(ident) => &ident.token,
            Expression::IntegerLiteral { token, .. } => token,
            Expression::Infix { token, .. } => token,
            Expression::Prefix { token, .. } => token,
            Expression::If { token, .. } => token,
            Expression::While { token, .. } => token,
        }
    }

    /// Moves the direct subexpressions of `self` into `out`, leaving
    /// placeholders behind.
    fn take_children(&mut self, out: &mut Vec<Expression>) {
        match self {
            Expression::Infix { left, right, .. } => {
                out.push(mem::replace(left.as_mut(), Expression::placeholder()));
                out.extend(right.take().map(|right| *right));
            }
            Expression::Prefix { right, .. } => out.extend(right.take().map(|right| *right)),
            Expression::If { condition, .. } | Expression::While { condition, .. } => {
                out.extend(condition.take().map(|condition| *condition))
            }
            Expression::Identifier(_) | Expression::IntegerLiteral { .. } => {}
        }
    }

    fn placeholder() -> Self {
        Expression::IntegerLiteral {
            token: Token::new(TokenKind::Eof, String::new(), Span::default()),
            value: 0,
        }
    }
}

// Operator chains nest through `left` and can be arbitrarily deep, so
// dropping them must not recurse.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expression) = pending.pop() {
            expression.take_children(&mut pending);
        }
    }
}

// Rendering produces source text that parses back to the same tree. A missing
// subtree renders as `?`, which lexes as ILLEGAL and parses back to nothing.

fn write_optional<T: fmt::Display>(f: &mut fmt::Formatter, node: &Option<T>) -> fmt::Result {
    match node {
        Some(node) => write!(f, "{}", node),
        None => f.write_str("?"),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Assign { name, value, .. } => {
                write!(f, "{} = ", name)?;
                write_optional(f, value)
            }
            Statement::Print { value, .. } => {
                write!(f, "print ")?;
                write_optional(f, value)
            }
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{{")?;
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            Expression::Infix { .. } => {
                // Walk the left spine instead of recursing into it.
                let mut spine = Vec::new();
                let mut node = self;
                while let Expression::Infix {
                    left,
                    operator,
                    right,
                    ..
                } = node
                {
                    spine.push((operator, right));
                    node = &**left;
                }

                for _ in 0..spine.len() {
                    f.write_str("(")?;
                }
                write!(f, "{}", node)?;
                for (operator, right) in spine.into_iter().rev() {
                    write!(f, " {} ", operator)?;
                    write_optional(f, right)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Expression::Prefix {
                operator, right, ..
            } => {
                write!(f, "({}", operator)?;
                write_optional(f, right)?;
                write!(f, ")")
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if (")?;
                write_optional(f, condition)?;
                write!(f, ") {}", consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expression::While {
                condition, body, ..
            } => {
                write!(f, "while (")?;
                write_optional(f, condition)?;
                write!(f, ") {}", body)
            }
        }
    }
}
