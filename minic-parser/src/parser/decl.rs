use super::*;

impl<'a> Parser<'a> {
    /// Parses a top level declaration.
    pub fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        self.declaration(true)
    }

    /// Parses a declaration at the start of a compound statement. Functions do not nest.
    pub(super) fn parse_local_declaration(&mut self) -> ParseResult<Declaration> {
        self.declaration(false)
    }

    fn declaration(&mut self, allow_functions: bool) -> ParseResult<Declaration> {
        if self.at(&TokenKind::Const) {
            return self.parse_const_declaration();
        }

        let line = self.current.line;
        let ty = self.parse_type_spec()?;
        let (name, _) = self.expect_ident()?;

        match self.current.kind {
            TokenKind::OpenParen if allow_functions => self
                .parse_func_declaration(line, name, ty)
                .map(Into::into),
            TokenKind::OpenBracket => {
                self.next();
                self.expect(TokenKind::CloseBracket)?;
                let value = self.parse_initializer()?;
                Ok(ArrayDeclaration::new(name, ty, value)
                    .with_line(line)
                    .into())
            }
            _ => {
                let value = self.parse_initializer()?;
                Ok(VarDeclaration::new(name, ty, value).with_line(line).into())
            }
        }
    }

    fn parse_const_declaration(&mut self) -> ParseResult<Declaration> {
        let line = self.expect(TokenKind::Const)?.line;
        let ty = self.parse_type_spec()?;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(ConstDeclaration::new(name, ty, Some(value))
            .with_line(line)
            .into())
    }

    /// Parses an optional `= expr` and the terminating `;`.
    fn parse_initializer(&mut self) -> ParseResult<Option<Expression>> {
        let value = if self.eat(TokenKind::Equals) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;
        Ok(value)
    }

    fn parse_func_declaration(
        &mut self,
        line: usize,
        name: String,
        return_type: TypeSpec,
    ) -> ParseResult<FuncDeclaration> {
        self.expect(TokenKind::OpenParen)?;
        let params = self.parse_params()?;
        let body = self.parse_compound_stmt()?;
        Ok(FuncDeclaration::new(name, params, return_type, body).with_line(line))
    }

    /// Parses the parameter list after `(`, up to and including `)`.
    fn parse_params(&mut self) -> ParseResult<Vec<FuncParameter>> {
        let mut params = Vec::new();
        if self.eat(TokenKind::CloseParen) {
            return Ok(params);
        }

        let line = self.current.line;
        let ty = self.parse_type_spec()?;
        if is_void(&ty) && self.eat(TokenKind::CloseParen) {
            // `(void)`
            return Ok(params);
        }
        params.push(self.parse_param(line, ty)?);

        while self.eat(TokenKind::Comma) {
            let line = self.current.line;
            let ty = self.parse_type_spec()?;
            params.push(self.parse_param(line, ty)?);
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(params)
    }

    fn parse_param(&mut self, line: usize, ty: TypeSpec) -> ParseResult<FuncParameter> {
        let (name, _) = self.expect_ident()?;
        let ty = if self.eat(TokenKind::OpenBracket) {
            self.expect(TokenKind::CloseBracket)?;
            ArrayType::new(Box::new(ty)).with_line(line).into()
        } else {
            ty
        };
        Ok(FuncParameter::new(name, ty).with_line(line))
    }

    /// Parses a primitive type name.
    pub fn parse_type_spec(&mut self) -> ParseResult<TypeSpec> {
        if !self.current.kind.is_type() {
            return Err(self.unexpected());
        }
        let token = self.next();
        Ok(SimpleType::named(token.kind).with_line(token.line).into())
    }
}

fn is_void(ty: &TypeSpec) -> bool {
    matches!(ty, TypeSpec::SimpleType(simple) if simple.name == "void")
}
