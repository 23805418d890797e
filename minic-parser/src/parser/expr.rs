use super::*;
use crate::lexer::PREFIX_BP;

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> ParseResult<Expression> {
        self.parse_expr_bp(0)
    }

    /// Parses an expression whose operators bind at least as tightly as `min_bp`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expression> {
        self.nested(|parser| parser.parse_operators(min_bp))
    }

    fn parse_operators(&mut self, min_bp: u8) -> ParseResult<Expression> {
        let mut lhs = self.parse_primary_expr()?;

        while let Some((l_bp, r_bp)) = self.current.kind.binop_bp() {
            if l_bp < min_bp {
                break;
            }

            if self.current.kind.is_assignment() {
                let location = match lhs {
                    Expression::ReadLocation(read) => read.location,
                    // only a location can be assigned to
                    _ => return Err(self.unexpected()),
                };
                let op = self.next();
                let value = self.parse_expr_bp(r_bp)?;
                lhs = write_location(location, op, value);
            } else {
                let op = self.next();
                let rhs = self.parse_expr_bp(r_bp)?;
                let line = lhs.line().unwrap_or(op.line);
                lhs = BinaryOp::new(op.kind.to_string(), Box::new(lhs), Box::new(rhs))
                    .with_line(line)
                    .into();
            }
        }

        Ok(lhs)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::IntLit(_)
            | TokenKind::FloatLit(_)
            | TokenKind::BoolLit(_)
            | TokenKind::CharLit(_)
            | TokenKind::StringLit(_) => self.parse_literal_expr(),
            TokenKind::Identifier(_) => self.parse_identifier_expr(),
            TokenKind::OpenParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::Minus | TokenKind::Plus | TokenKind::LogicalNot | TokenKind::Not => {
                self.parse_unary_expr()
            }
            TokenKind::New => self.parse_new_array_expr(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_literal_expr(&mut self) -> ParseResult<Expression> {
        let mut expr: Expression = match &self.current.kind {
            TokenKind::IntLit(value) => IntegerLiteral::new(*value).into(),
            TokenKind::FloatLit(value) => FloatLiteral::new(*value).into(),
            TokenKind::BoolLit(value) => BoolLiteral::new(*value).into(),
            TokenKind::CharLit(value) => CharLiteral::new(*value).into(),
            TokenKind::StringLit(value) => StringLiteral::new(value.clone()).into(),
            _ => return Err(self.unexpected()),
        };
        // eat parsed token
        expr.set_line(self.next().line);
        Ok(expr)
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        let op = self.next();

        // `-` directly in front of a number is part of the literal
        if op.kind == TokenKind::Minus {
            let negated: Option<Expression> = match self.current.kind {
                TokenKind::IntLit(value) => Some(IntegerLiteral::new(-value).into()),
                TokenKind::FloatLit(value) => Some(FloatLiteral::new(-value).into()),
                _ => None,
            };
            if let Some(mut literal) = negated {
                self.next();
                literal.set_line(op.line);
                return Ok(literal);
            }
        }

        let operand = self.parse_expr_bp(PREFIX_BP)?;
        Ok(UnaryOp::new(op.kind.to_string(), Box::new(operand))
            .with_line(op.line)
            .into())
    }

    /// Parses a variable read, an array element read, a call or `name.size`.
    fn parse_identifier_expr(&mut self) -> ParseResult<Expression> {
        let (name, line) = self.expect_ident()?;

        match self.current.kind {
            TokenKind::OpenParen => {
                self.next();
                let args = self.parse_args()?;
                Ok(FuncCall::new(name, args).with_line(line).into())
            }
            TokenKind::OpenBracket => {
                self.next();
                let index = self.parse_expr()?;
                self.expect(TokenKind::CloseBracket)?;
                let location = ArrayLocation::new(name, Box::new(index)).with_line(line);
                Ok(ReadLocation::new(location.into()).with_line(line).into())
            }
            TokenKind::Dot => {
                self.next();
                self.expect(TokenKind::Size)?;
                Ok(ArraySize::new(name).with_line(line).into())
            }
            _ => {
                let location = SimpleLocation::new(name).with_line(line);
                Ok(ReadLocation::new(location.into()).with_line(line).into())
            }
        }
    }

    /// Parses call arguments after `(`, up to and including `)`.
    fn parse_args(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.eat(TokenKind::CloseParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);
            if self.eat(TokenKind::CloseParen) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        Ok(args)
    }

    /// Parses `new type[size]`.
    fn parse_new_array_expr(&mut self) -> ParseResult<Expression> {
        let line = self.expect(TokenKind::New)?.line;
        let ty = self.parse_type_spec()?;
        self.expect(TokenKind::OpenBracket)?;
        let size = self.parse_expr()?;
        self.expect(TokenKind::CloseBracket)?;
        Ok(NewArrayExpr::new(ty, Box::new(size)).with_line(line).into())
    }
}

/// Builds the assignment `location op value`. A compound assignment `a op= e` becomes
/// `a = a op e`.
///
/// The location is cloned into the read, so for `a[i] op= e` the index expression `i` appears
/// twice in the tree. Passes that evaluate it must not rely on it being evaluated once.
fn write_location(location: Location, op: Token, value: Expression) -> Expression {
    let line = location.line().unwrap_or(op.line);
    let value = match op.kind.compound_op() {
        Some(binop) => {
            let current = ReadLocation::new(location.clone()).with_line(line);
            BinaryOp::new(binop.to_string(), Box::new(current.into()), Box::new(value))
                .with_line(line)
                .into()
        }
        None => value,
    };
    WriteLocation::new(location, Box::new(value))
        .with_line(line)
        .into()
}
