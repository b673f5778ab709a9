//! mcc-par - Recursive-descent parser.
//!
//! One function per grammar rule, single token of lookahead via
//! [`TokenStream`]. Operator precedence comes from the
//! expression/additive/term/factor stratification; all arithmetic operators
//! are left-associative, comparisons are non-associative and sit at the top
//! of `expression`. The first mismatched token aborts the parse.

pub mod ast;
pub mod pretty;

use mcc_lex::{LexError, Token, TokenKind, TokenStream};
use mcc_util::{Symbol, KW_INT};
use thiserror::Error;

use ast::{BinOp, CmpOp, CompoundStmt, Expr, FunctionDecl, Program, Stmt, VarDecl};

/// Error produced on the first token that does not fit the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token kind was required.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },

    /// One of several constructs was possible; none matched.
    #[error("expected {expected}, found {found}")]
    UnexpectedSyntax {
        expected: &'static str,
        found: TokenKind,
    },

    /// A decimal literal that does not fit a signed 64-bit integer.
    #[error("number literal '{literal}' out of range")]
    NumberOutOfRange { literal: Symbol },
}

/// Parse a complete compilation unit.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse_program()
}

pub struct Parser<'src> {
    tokens: TokenStream<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: TokenStream::new(source),
        }
    }

    /// `program := { function_decl }`
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while self.tokens.peek()?.kind != TokenKind::Eof {
            items.push(self.parse_function_decl()?);
        }
        Ok(Program { items })
    }

    /// `function_decl := "int" IDENT "(" [ param { "," param } ] ")" "{" compound "}"`
    fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::Int)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        while self.tokens.peek()?.kind != TokenKind::RParen {
            if !params.is_empty() {
                self.expect(TokenKind::Comma)?;
            }
            self.expect(TokenKind::Int)?;
            let param = self.expect_ident()?;
            params.push(VarDecl {
                name: param,
                type_name: KW_INT,
                init: None,
            });
        }
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_compound()?;
        self.expect(TokenKind::RBrace)?;

        Ok(FunctionDecl { name, params, body })
    }

    /// `compound := { statement }`, terminated by the caller's `}`.
    fn parse_compound(&mut self) -> Result<CompoundStmt, ParseError> {
        let mut stmts = Vec::new();
        loop {
            let next = self.tokens.peek()?.kind;
            if next == TokenKind::RBrace {
                return Ok(CompoundStmt { stmts });
            }
            if next == TokenKind::Eof {
                return Err(ParseError::UnexpectedToken {
                    expected: TokenKind::RBrace,
                    found: TokenKind::Eof,
                });
            }
            stmts.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.tokens.peek()?.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Int => self.parse_var_decl(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Ident => self.parse_assign_or_call(),
            found => Err(ParseError::UnexpectedSyntax {
                expected: "statement",
                found,
            }),
        }
    }

    /// `if_stmt := "if" "(" expression ")" "{" compound "}" [ "else" "{" compound "}" ]`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let then_body = self.parse_compound()?;
        self.expect(TokenKind::RBrace)?;

        let else_body = if self.tokens.peek()?.kind == TokenKind::Else {
            self.tokens.next()?;
            self.expect(TokenKind::LBrace)?;
            let body = self.parse_compound()?;
            self.expect(TokenKind::RBrace)?;
            Some(body)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    /// `while_stmt := "while" "(" expression ")" "{" compound "}"`
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_compound()?;
        self.expect(TokenKind::RBrace)?;

        Ok(Stmt::While { cond, body })
    }

    /// `var_decl := "int" IDENT [ "=" expression ] ";"`
    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Int)?;
        let name = self.expect_ident()?;

        let init = if self.tokens.peek()?.kind == TokenKind::Assign {
            self.tokens.next()?;
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::VarDecl(VarDecl {
            name,
            type_name: KW_INT,
            init,
        }))
    }

    /// `return_stmt := "return" expression ";"`
    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Return)?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return { value })
    }

    /// `assign_or_call := IDENT "=" expression ";" | expression ";"`
    ///
    /// The identifier is consumed first, then one peeked token decides:
    /// `=` selects assignment, anything else continues the identifier as
    /// the leading factor of an expression statement.
    fn parse_assign_or_call(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_ident()?;

        if self.tokens.peek()?.kind == TokenKind::Assign {
            self.tokens.next()?;
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Assign {
                target: name,
                value,
            });
        }

        let factor = self.finish_ident_factor(name)?;
        let term = self.term_tail(factor)?;
        let lhs = self.additive_tail(term)?;
        let expr = self.comparison_tail(lhs)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }

    /// `expression := additive [ cmp_op additive ]`
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_additive()?;
        self.comparison_tail(lhs)
    }

    fn comparison_tail(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let op = match self.tokens.peek()?.kind {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::Ne,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::Le,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.tokens.next()?;
        let rhs = self.parse_additive()?;
        Ok(Expr::Comparison {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// `additive := term { ("+"|"-") term }`
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let term = self.parse_term()?;
        self.additive_tail(term)
    }

    fn additive_tail(&mut self, mut node: Expr) -> Result<Expr, ParseError> {
        loop {
            let op = match self.tokens.peek()?.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(node),
            };
            self.tokens.next()?;
            let rhs = self.parse_term()?;
            node = Expr::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
    }

    /// `term := factor { ("*"|"/") factor }`
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let factor = self.parse_factor()?;
        self.term_tail(factor)
    }

    fn term_tail(&mut self, mut node: Expr) -> Result<Expr, ParseError> {
        loop {
            let op = match self.tokens.peek()?.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(node),
            };
            self.tokens.next()?;
            let rhs = self.parse_factor()?;
            node = Expr::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
    }

    /// `factor := NUMBER | IDENT | IDENT "(" args ")" | "(" expression ")"`
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let token = self.tokens.next()?;
        match token.kind {
            TokenKind::Number => self.number_value(token),
            TokenKind::Ident => {
                let name = token.lexeme.unwrap_or_else(|| Symbol::intern(""));
                self.finish_ident_factor(name)
            }
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            found => Err(ParseError::UnexpectedSyntax {
                expected: "expression",
                found,
            }),
        }
    }

    /// An identifier whose token is already consumed: a call if `(`
    /// follows, a plain variable reference otherwise.
    fn finish_ident_factor(&mut self, name: Symbol) -> Result<Expr, ParseError> {
        if self.tokens.peek()?.kind != TokenKind::LParen {
            return Ok(Expr::Ident(name));
        }
        self.tokens.next()?;

        let mut args = Vec::new();
        while self.tokens.peek()?.kind != TokenKind::RParen {
            if !args.is_empty() {
                self.expect(TokenKind::Comma)?;
            }
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;

        Ok(Expr::Call { name, args })
    }

    fn number_value(&self, token: Token) -> Result<Expr, ParseError> {
        let literal = token.lexeme.unwrap_or_else(|| Symbol::intern(""));
        literal
            .as_str()
            .parse::<i64>()
            .map(Expr::Number)
            .map_err(|_| ParseError::NumberOutOfRange { literal })
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.tokens.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: kind,
                found: token.kind,
            })
        }
    }

    fn expect_ident(&mut self) -> Result<Symbol, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(token.lexeme.unwrap_or_else(|| Symbol::intern("")))
    }
}
