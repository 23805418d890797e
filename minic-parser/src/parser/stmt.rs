use super::*;

impl<'a> Parser<'a> {
    pub fn parse_stmt(&mut self) -> ParseResult<Statement> {
        self.nested(Self::parse_any_stmt)
    }

    fn parse_any_stmt(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::OpenBrace => self.parse_compound_stmt().map(Into::into),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => self.parse_break_stmt(),
            TokenKind::Semi => {
                let line = self.next().line;
                Ok(NullStatement::new().with_line(line).into())
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// Parses a block: local declarations first, then statements.
    pub fn parse_compound_stmt(&mut self) -> ParseResult<CompoundStatement> {
        let line = self.expect(TokenKind::OpenBrace)?.line;

        let mut decls = Vec::new();
        while self.current.kind.is_type() || self.at(&TokenKind::Const) {
            decls.push(self.parse_local_declaration()?);
        }

        let mut stmts = Vec::new();
        while !self.eat(TokenKind::CloseBrace) {
            stmts.push(self.parse_stmt()?);
        }

        Ok(CompoundStatement::new(decls, stmts).with_line(line))
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.current.line;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(ExprStatement::new(expr).with_line(line).into())
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::If)?.line;
        let condition = self.parse_paren_expr()?;
        let then_branch = Box::new(self.parse_stmt()?);
        // an `else` belongs to the innermost `if` without one
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(IfStatement::new(condition, then_branch, else_branch)
            .with_line(line)
            .into())
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::While)?.line;
        let condition = self.parse_paren_expr()?;
        let body = Box::new(self.parse_stmt()?);
        Ok(WhileStatement::new(condition, body).with_line(line).into())
    }

    fn parse_for_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::For)?.line;
        self.expect(TokenKind::OpenParen)?;

        let init = if self.eat(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_expr_stmt()?))
        };
        let condition = self.parse_optional_expr(TokenKind::Semi)?;
        let update = self.parse_optional_expr(TokenKind::CloseParen)?;
        let body = Box::new(self.parse_stmt()?);

        Ok(ForStatement::new(init, condition, update, body)
            .with_line(line)
            .into())
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::Return)?.line;
        let value = self.parse_optional_expr(TokenKind::Semi)?;
        Ok(ReturnStatement::new(value).with_line(line).into())
    }

    fn parse_break_stmt(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::Break)?.line;
        self.expect(TokenKind::Semi)?;
        Ok(BreakStatement::new().with_line(line).into())
    }

    /// Parses `( expr )`.
    fn parse_paren_expr(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::OpenParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        Ok(expr)
    }

    /// Parses an expression unless `terminator` comes first, then eats `terminator`.
    fn parse_optional_expr(&mut self, terminator: TokenKind) -> ParseResult<Option<Expression>> {
        let expr = if self.at(&terminator) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(terminator)?;
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::dump;
    use insta::assert_snapshot;
    use minic_source::Sink;

    fn stmt(text: &str) -> Statement {
        let source = Source::new(text).with_sink(Sink::Silent);
        let stmt = Parser::new(&source).parse_stmt();
        assert!(source.has_no_errors(), "{}", source.errors);
        stmt.unwrap()
    }

    #[test]
    fn test_dangling_else() {
        let Statement::IfStatement(outer) = stmt("if (a) if (b) x(); else y();") else {
            panic!("expected an if statement");
        };
        assert_eq!(outer.else_branch, None);

        let Statement::IfStatement(inner) = *outer.then_branch else {
            panic!("expected a nested if statement");
        };
        assert_eq!(
            inner.else_branch.map(|stmt| stmt.kind()),
            Some(NodeKind::ExprStatement)
        );
    }

    #[test]
    fn test_if_else() {
        assert_snapshot!(dump(&stmt("if (x < 0)\n  x = 0;\nelse\n  ;")), @r###"
        1: IfStatement(condition=BinaryOp, then_branch=ExprStatement, else_branch=NullStatement)
        1:     BinaryOp(op="<", left=ReadLocation, right=IntegerLiteral)
        1:         ReadLocation(location=SimpleLocation)
        1:             SimpleLocation(name="x")
        1:         IntegerLiteral(value=0)
        2:     ExprStatement(expr=WriteLocation)
        2:         WriteLocation(location=SimpleLocation, value=IntegerLiteral)
        2:             SimpleLocation(name="x")
        2:             IntegerLiteral(value=0)
        4:     NullStatement()
        "###);
    }

    #[test]
    fn test_for() {
        assert_snapshot!(dump(&stmt("for (i = 0; i < n; i += 1) break;")), @r###"
        1: ForStatement(init=ExprStatement, condition=BinaryOp, update=WriteLocation, body=BreakStatement)
        1:     ExprStatement(expr=WriteLocation)
        1:         WriteLocation(location=SimpleLocation, value=IntegerLiteral)
        1:             SimpleLocation(name="i")
        1:             IntegerLiteral(value=0)
        1:     BinaryOp(op="<", left=ReadLocation, right=ReadLocation)
        1:         ReadLocation(location=SimpleLocation)
        1:             SimpleLocation(name="i")
        1:         ReadLocation(location=SimpleLocation)
        1:             SimpleLocation(name="n")
        1:     WriteLocation(location=SimpleLocation, value=BinaryOp)
        1:         SimpleLocation(name="i")
        1:         BinaryOp(op="+", left=ReadLocation, right=IntegerLiteral)
        1:             ReadLocation(location=SimpleLocation)
        1:                 SimpleLocation(name="i")
        1:             IntegerLiteral(value=1)
        1:     BreakStatement()
        "###);
    }

    #[test]
    fn test_for_without_clauses() {
        let Statement::ForStatement(stmt) = stmt("for (;;) ;") else {
            panic!("expected a for statement");
        };
        assert_eq!(stmt.init, None);
        assert_eq!(stmt.condition, None);
        assert_eq!(stmt.update, None);
        assert_eq!(stmt.body.kind(), NodeKind::NullStatement);
    }

    #[test]
    fn test_compound() {
        let Statement::CompoundStatement(block) =
            stmt("{\n  int a;\n  const int b = 1;\n  a = b;\n  while (a) return;\n}")
        else {
            panic!("expected a compound statement");
        };
        let decls: Vec<_> = block.decls.iter().map(|decl| decl.kind()).collect();
        assert_eq!(
            decls,
            vec![NodeKind::VarDeclaration, NodeKind::ConstDeclaration]
        );
        let stmts: Vec<_> = block
            .stmts
            .iter()
            .map(|stmt| (stmt.kind(), stmt.line()))
            .collect();
        assert_eq!(
            stmts,
            vec![
                (NodeKind::ExprStatement, Some(4)),
                (NodeKind::WhileStatement, Some(5))
            ]
        );
        assert_eq!(block.line, Some(1));
    }

    #[test]
    fn test_return() {
        assert_eq!(
            stmt("return;"),
            Statement::from(ReturnStatement::new(None).with_line(1))
        );
        let Statement::ReturnStatement(ret) = stmt("return 1;") else {
            panic!("expected a return statement");
        };
        assert_eq!(ret.value.map(|value| value.kind()), Some(NodeKind::IntegerLiteral));
    }
}
