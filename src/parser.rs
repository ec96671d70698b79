use crate::ast::{BlockStatement, Expression, Identifier, InfixOp, Program, Statement};
use crate::lexer::{Lexer, Token, TokenKind};

/// Binding power, lowest first. `||` binds tighter than `&&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    LogicalAnd,
    LogicalOr,
    Equals,
    LessGreater,
    Sum,
    Product,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::AndAnd => Precedence::LogicalAnd,
            TokenKind::OrOr => Precedence::LogicalOr,
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equals,
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
            _ => Precedence::Lowest,
        }
    }
}

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Expression;

fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn> {
    match kind {
        TokenKind::Identifier => Some(Parser::parse_identifier),
        TokenKind::Number => Some(Parser::parse_integer_literal),
        TokenKind::LeftParen => Some(Parser::parse_grouped_expression),
        TokenKind::If => Some(Parser::parse_if_expression),
        TokenKind::While => Some(Parser::parse_while_expression),
        _ => None,
    }
}

fn infix_parse_fn(kind: TokenKind) -> Option<InfixParseFn> {
    InfixOp::from_kind(kind).map(|_| Parser::parse_infix_expression as InfixParseFn)
}

/// Pratt parser over a two-token window. Malformed input never aborts the
/// parse; the affected subtree is simply absent.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program { statements }
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn skip_peek_newline(&mut self) {
        if self.peek_is(TokenKind::Newline) {
            self.next_token();
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Identifier if self.peek_is(TokenKind::Assign) => {
                Some(self.parse_assign_statement())
            }
            TokenKind::Print => Some(self.parse_print_statement()),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_assign_statement(&mut self) -> Statement {
        let token = self.current.clone();
        let name = Identifier {
            token: token.clone(),
            name: token.literal.clone(),
        };

        // Past the name and the '='.
        self.next_token();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest);
        self.skip_peek_newline();

        Statement::Assign { token, name, value }
    }

    fn parse_print_statement(&mut self) -> Statement {
        let token = self.current.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);

        // Anything left on the line is dropped.
        while !self.current_is(TokenKind::Newline) && !self.current_is(TokenKind::Eof) {
            self.next_token();
        }

        Statement::Print { token, value }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest);
        self.skip_peek_newline();

        expression.map(|expression| Statement::Expression { token, expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = prefix_parse_fn(self.current.kind)?;
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Newline) && precedence < self.peek_precedence() {
            let Some(infix) = infix_parse_fn(self.peek.kind) else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left);
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier {
            token: self.current.clone(),
            name: self.current.literal.clone(),
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        // Out-of-range literals read as 0.
        let value = self.current.literal.parse::<i64>().unwrap_or(0);
        Some(Expression::IntegerLiteral {
            token: self.current.clone(),
            value,
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Expression {
        let token = self.current.clone();
        let operator = match InfixOp::from_kind(token.kind) {
            Some(operator) => operator,
            None => return left,
        };

        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence).map(Box::new);

        Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right,
        }
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest);
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        expression
    }

    /// Parses `( condition )` and leaves `current` on the `)`.
    fn parse_condition(&mut self) -> Option<Option<Box<Expression>>> {
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest).map(Box::new);

        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        Some(condition)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let condition = self.parse_condition()?;

        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            token,
            condition,
            consequence,
            alternative,
        })
    }

    fn parse_while_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let condition = self.parse_condition()?;

        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::While {
            token,
            condition,
            body,
        })
    }

    /// Expects `current` on `{`. Stops with `current` on the closing `}` (or
    /// `Eof`); the caller's next advance consumes it.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.current_is(TokenKind::RightBrace) && !self.current_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }
}

/// Convenience: lex and parse a whole source text.
pub fn parse(source: &str) -> Program {
    Parser::new(Lexer::new(source)).parse_program()
}
