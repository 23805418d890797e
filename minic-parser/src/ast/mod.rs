//! MiniC abstract syntax tree.
//!
//! Every node kind is declared once below with its ordered, typed fields. Nodes carry an
//! optional `line` next to their fields; it is not part of the field list.

#[macro_use]
pub mod field;
#[macro_use]
pub mod node;

pub use field::{BaseType, FieldDecl, FieldRef, FieldType, Shape, Value};
pub use node::{AstNode, ShapeError};

ast_nodes! {
    standalone {
        /// A whole translation unit.
        Program {
            decls: Vec<Declaration>,
        }
        /// A parameter of a function declaration.
        FuncParameter {
            name: String,
            ty: TypeSpec,
        }
    }

    category Declaration {
        /// `int x;` or `int x = 1;`
        VarDeclaration {
            name: String,
            ty: TypeSpec,
            value: Option<Expression>,
        }
        /// `int x[];`, `ty` is the element type.
        ArrayDeclaration {
            name: String,
            ty: TypeSpec,
            value: Option<Expression>,
        }
        /// `const int x = 1;`
        ConstDeclaration {
            name: String,
            ty: TypeSpec,
            value: Option<Expression>,
        }
        FuncDeclaration {
            name: String,
            params: Vec<FuncParameter>,
            return_type: TypeSpec,
            body: CompoundStatement,
        }
    }

    category Statement {
        /// `{ local declarations, then statements }`
        CompoundStatement {
            decls: Vec<Declaration>,
            stmts: Vec<Statement>,
        }
        ExprStatement {
            expr: Expression,
        }
        /// A lone `;`.
        NullStatement {}
        IfStatement {
            condition: Expression,
            then_branch: Box<Statement>,
            else_branch: Option<Box<Statement>>,
        }
        WhileStatement {
            condition: Expression,
            body: Box<Statement>,
        }
        ForStatement {
            init: Option<Box<Statement>>,
            condition: Option<Expression>,
            update: Option<Expression>,
            body: Box<Statement>,
        }
        ReturnStatement {
            value: Option<Expression>,
        }
        BreakStatement {}
    }

    category Expression {
        BinaryOp {
            op: String,
            left: Box<Expression>,
            right: Box<Expression>,
        }
        UnaryOp {
            op: String,
            operand: Box<Expression>,
        }
        FuncCall {
            name: String,
            args: Vec<Expression>,
        }
        IntegerLiteral {
            value: i64,
        }
        FloatLiteral {
            value: f64,
        }
        BoolLiteral {
            value: bool,
        }
        CharLiteral {
            value: char,
        }
        StringLiteral {
            value: String,
        }
        /// A location used as a value.
        ReadLocation {
            location: Location,
        }
        /// An assignment. Evaluates to the assigned value.
        WriteLocation {
            location: Location,
            value: Box<Expression>,
        }
        /// `new int[size]`
        NewArrayExpr {
            ty: TypeSpec,
            size: Box<Expression>,
        }
        /// `name.size`
        ArraySize {
            name: String,
        }
    }

    /// Something that can be read from or written to.
    category Location {
        SimpleLocation {
            name: String,
        }
        ArrayLocation {
            name: String,
            index: Box<Expression>,
        }
    }

    category TypeSpec {
        /// A primitive type (`int`, `float`, `char`, `bool`, `void`).
        SimpleType {
            name: String,
        }
        /// `int a[]` in a parameter list.
        ArrayType {
            element: Box<TypeSpec>,
        }
    }
}

impl Expression {
    /// Returns `true` for the literal kinds.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::IntegerLiteral(_)
                | Expression::FloatLiteral(_)
                | Expression::BoolLiteral(_)
                | Expression::CharLiteral(_)
                | Expression::StringLiteral(_)
        )
    }
}

impl SimpleType {
    pub fn named(name: impl ToString) -> Self {
        Self::new(name.to_string())
    }
}
