//! Visitor pattern for AST nodes.
//!
//! [`Visitor::visit_node`] dispatches on the node kind to the matching `visit_*` method. Every
//! `visit_*` method defaults to [`Visitor::generic_visit`], which walks the declared fields in
//! order. Overriding a method for a kind that does not exist is a compile error.

use crate::ast::*;

pub trait Visitor<'ast>: Sized {
    /// Visits a node, a category, or a sequence / option of them.
    fn visit<T: Visitable<'ast> + ?Sized>(&mut self, item: &'ast T) {
        item.accept(self);
    }

    fn visit_node(&mut self, node: NodeRef<'ast>) {
        match node {
            NodeRef::Program(node) => self.visit_program(node),
            NodeRef::FuncParameter(node) => self.visit_func_parameter(node),
            NodeRef::VarDeclaration(node) => self.visit_var_declaration(node),
            NodeRef::ArrayDeclaration(node) => self.visit_array_declaration(node),
            NodeRef::ConstDeclaration(node) => self.visit_const_declaration(node),
            NodeRef::FuncDeclaration(node) => self.visit_func_declaration(node),
            NodeRef::CompoundStatement(node) => self.visit_compound_statement(node),
            NodeRef::ExprStatement(node) => self.visit_expr_statement(node),
            NodeRef::NullStatement(node) => self.visit_null_statement(node),
            NodeRef::IfStatement(node) => self.visit_if_statement(node),
            NodeRef::WhileStatement(node) => self.visit_while_statement(node),
            NodeRef::ForStatement(node) => self.visit_for_statement(node),
            NodeRef::ReturnStatement(node) => self.visit_return_statement(node),
            NodeRef::BreakStatement(node) => self.visit_break_statement(node),
            NodeRef::BinaryOp(node) => self.visit_binary_op(node),
            NodeRef::UnaryOp(node) => self.visit_unary_op(node),
            NodeRef::FuncCall(node) => self.visit_func_call(node),
            NodeRef::IntegerLiteral(node) => self.visit_integer_literal(node),
            NodeRef::FloatLiteral(node) => self.visit_float_literal(node),
            NodeRef::BoolLiteral(node) => self.visit_bool_literal(node),
            NodeRef::CharLiteral(node) => self.visit_char_literal(node),
            NodeRef::StringLiteral(node) => self.visit_string_literal(node),
            NodeRef::ReadLocation(node) => self.visit_read_location(node),
            NodeRef::WriteLocation(node) => self.visit_write_location(node),
            NodeRef::NewArrayExpr(node) => self.visit_new_array_expr(node),
            NodeRef::ArraySize(node) => self.visit_array_size(node),
            NodeRef::SimpleLocation(node) => self.visit_simple_location(node),
            NodeRef::ArrayLocation(node) => self.visit_array_location(node),
            NodeRef::SimpleType(node) => self.visit_simple_type(node),
            NodeRef::ArrayType(node) => self.visit_array_type(node),
        }
    }

    /// Fallback for every kind without a specialized handler.
    fn generic_visit(&mut self, node: NodeRef<'ast>) {
        walk_node(self, node);
    }

    fn visit_program(&mut self, node: &'ast Program) {
        self.generic_visit(node.into());
    }
    fn visit_func_parameter(&mut self, node: &'ast FuncParameter) {
        self.generic_visit(node.into());
    }

    /* Declarations */
    fn visit_var_declaration(&mut self, node: &'ast VarDeclaration) {
        self.generic_visit(node.into());
    }
    fn visit_array_declaration(&mut self, node: &'ast ArrayDeclaration) {
        self.generic_visit(node.into());
    }
    fn visit_const_declaration(&mut self, node: &'ast ConstDeclaration) {
        self.generic_visit(node.into());
    }
    fn visit_func_declaration(&mut self, node: &'ast FuncDeclaration) {
        self.generic_visit(node.into());
    }

    /* Statements */
    fn visit_compound_statement(&mut self, node: &'ast CompoundStatement) {
        self.generic_visit(node.into());
    }
    fn visit_expr_statement(&mut self, node: &'ast ExprStatement) {
        self.generic_visit(node.into());
    }
    fn visit_null_statement(&mut self, node: &'ast NullStatement) {
        self.generic_visit(node.into());
    }
    fn visit_if_statement(&mut self, node: &'ast IfStatement) {
        self.generic_visit(node.into());
    }
    fn visit_while_statement(&mut self, node: &'ast WhileStatement) {
        self.generic_visit(node.into());
    }
    fn visit_for_statement(&mut self, node: &'ast ForStatement) {
        self.generic_visit(node.into());
    }
    fn visit_return_statement(&mut self, node: &'ast ReturnStatement) {
        self.generic_visit(node.into());
    }
    fn visit_break_statement(&mut self, node: &'ast BreakStatement) {
        self.generic_visit(node.into());
    }

    /* Expressions */
    fn visit_binary_op(&mut self, node: &'ast BinaryOp) {
        self.generic_visit(node.into());
    }
    fn visit_unary_op(&mut self, node: &'ast UnaryOp) {
        self.generic_visit(node.into());
    }
    fn visit_func_call(&mut self, node: &'ast FuncCall) {
        self.generic_visit(node.into());
    }
    fn visit_integer_literal(&mut self, node: &'ast IntegerLiteral) {
        self.generic_visit(node.into());
    }
    fn visit_float_literal(&mut self, node: &'ast FloatLiteral) {
        self.generic_visit(node.into());
    }
    fn visit_bool_literal(&mut self, node: &'ast BoolLiteral) {
        self.generic_visit(node.into());
    }
    fn visit_char_literal(&mut self, node: &'ast CharLiteral) {
        self.generic_visit(node.into());
    }
    fn visit_string_literal(&mut self, node: &'ast StringLiteral) {
        self.generic_visit(node.into());
    }
    fn visit_read_location(&mut self, node: &'ast ReadLocation) {
        self.generic_visit(node.into());
    }
    fn visit_write_location(&mut self, node: &'ast WriteLocation) {
        self.generic_visit(node.into());
    }
    fn visit_new_array_expr(&mut self, node: &'ast NewArrayExpr) {
        self.generic_visit(node.into());
    }
    fn visit_array_size(&mut self, node: &'ast ArraySize) {
        self.generic_visit(node.into());
    }

    /* Locations */
    fn visit_simple_location(&mut self, node: &'ast SimpleLocation) {
        self.generic_visit(node.into());
    }
    fn visit_array_location(&mut self, node: &'ast ArrayLocation) {
        self.generic_visit(node.into());
    }

    /* Types */
    fn visit_simple_type(&mut self, node: &'ast SimpleType) {
        self.generic_visit(node.into());
    }
    fn visit_array_type(&mut self, node: &'ast ArrayType) {
        self.generic_visit(node.into());
    }
}

/// Visits every child node of `node`, in field order. Scalar fields are skipped.
pub fn walk_node<'ast>(visitor: &mut impl Visitor<'ast>, node: NodeRef<'ast>) {
    for (_name, value) in node.fields() {
        walk_field(visitor, value);
    }
}

fn walk_field<'ast>(visitor: &mut impl Visitor<'ast>, value: FieldRef<'ast>) {
    match value {
        FieldRef::Node(node) => visitor.visit_node(node),
        FieldRef::Sequence(items) => {
            for item in items {
                walk_field(visitor, item);
            }
        }
        FieldRef::Str(_)
        | FieldRef::Int(_)
        | FieldRef::Float(_)
        | FieldRef::Bool(_)
        | FieldRef::Char(_)
        | FieldRef::Absent => {}
    }
}

/// Anything a [`Visitor`] can be pointed at.
pub trait Visitable<'ast> {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V);
}

macro_rules! impl_visitable {
    ($($ty:ty),* $(,)?) => {$(
        impl<'ast> Visitable<'ast> for $ty {
            fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
                visitor.visit_node(self.into());
            }
        }
    )*};
}

impl_visitable!(
    Program,
    FuncParameter,
    VarDeclaration,
    ArrayDeclaration,
    ConstDeclaration,
    FuncDeclaration,
    CompoundStatement,
    ExprStatement,
    NullStatement,
    IfStatement,
    WhileStatement,
    ForStatement,
    ReturnStatement,
    BreakStatement,
    BinaryOp,
    UnaryOp,
    FuncCall,
    IntegerLiteral,
    FloatLiteral,
    BoolLiteral,
    CharLiteral,
    StringLiteral,
    ReadLocation,
    WriteLocation,
    NewArrayExpr,
    ArraySize,
    SimpleLocation,
    ArrayLocation,
    SimpleType,
    ArrayType,
    Declaration,
    Statement,
    Expression,
    Location,
    TypeSpec,
);

impl<'ast> Visitable<'ast> for Node {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.visit_node(self.as_node());
    }
}

impl<'ast, T: Visitable<'ast>> Visitable<'ast> for [T] {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        for item in self {
            item.accept(visitor);
        }
    }
}

impl<'ast, T: Visitable<'ast>> Visitable<'ast> for Vec<T> {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        self.as_slice().accept(visitor);
    }
}

impl<'ast, T: Visitable<'ast>> Visitable<'ast> for Option<T> {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        if let Some(item) = self {
            item.accept(visitor);
        }
    }
}

impl<'ast, T: Visitable<'ast> + ?Sized> Visitable<'ast> for Box<T> {
    fn accept<V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        (**self).accept(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects binary operators, without descending into them.
    #[derive(Default)]
    struct Operators {
        ops: Vec<String>,
    }

    impl<'ast> Visitor<'ast> for Operators {
        fn visit_binary_op(&mut self, node: &'ast BinaryOp) {
            self.ops.push(node.op.clone());
        }
    }

    /// Counts every node.
    #[derive(Default)]
    struct Counter {
        count: usize,
    }

    impl<'ast> Visitor<'ast> for Counter {
        fn generic_visit(&mut self, node: NodeRef<'ast>) {
            self.count += 1;
            walk_node(self, node);
        }
    }

    fn read(name: &str) -> Expression {
        ReadLocation::new(SimpleLocation::new(name.to_string()).into()).into()
    }

    fn binary(op: &str, left: Expression, right: Expression) -> Expression {
        BinaryOp::new(op.to_string(), Box::new(left), Box::new(right)).into()
    }

    #[test]
    fn test_specialized_handler_overrides_generic() {
        let exprs = vec![
            binary("+", read("a"), binary("*", read("b"), read("c"))),
            read("d"),
            binary("-", read("e"), read("f")),
        ];
        let mut operators = Operators::default();
        operators.visit(&exprs);
        // the nested `*` is not reached because visit_binary_op does not walk
        assert_eq!(operators.ops, vec!["+", "-"]);
    }

    #[test]
    fn test_generic_walk_reaches_every_node() {
        // x = a[1];
        let stmt: Statement = ExprStatement::new(
            WriteLocation::new(
                SimpleLocation::new("x".to_string()).into(),
                Box::new(
                    ReadLocation::new(
                        ArrayLocation::new("a".to_string(), Box::new(IntegerLiteral::new(1).into()))
                            .into(),
                    )
                    .into(),
                ),
            )
            .into(),
        )
        .into();
        let mut counter = Counter::default();
        counter.visit(&stmt);
        // ExprStatement, WriteLocation, SimpleLocation, ReadLocation, ArrayLocation, IntegerLiteral
        assert_eq!(counter.count, 6);
    }

    #[test]
    fn test_optional_fields() {
        let without_else = IfStatement::new(read("a"), Box::new(NullStatement::new().into()), None);
        let mut counter = Counter::default();
        counter.visit(&without_else);
        assert_eq!(counter.count, 4);

        let nothing: Option<Expression> = None;
        let mut counter = Counter::default();
        counter.visit(&nothing);
        assert_eq!(counter.count, 0);
    }
}
