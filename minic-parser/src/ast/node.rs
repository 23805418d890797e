//! The node contract shared by every AST node kind and the macro declaring them.

use thiserror::Error;

use super::field::{FieldDecl, FieldRef, FieldType, Mismatch, Value};
use super::NodeKind;

/// Raised when a node is constructed from values that do not match its declared fields.
/// This is a defect in the code building the tree, never a problem with the user's program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{kind} expects {expected} arguments, got {found}")]
    Arity {
        kind: NodeKind,
        expected: usize,
        found: usize,
    },
    #[error("{kind}.{field} must be {expected}")]
    FieldType {
        kind: NodeKind,
        field: &'static str,
        expected: FieldType,
    },
    #[error("every element of {kind}.{field} must be {expected}, element {index} is not")]
    ElementType {
        kind: NodeKind,
        field: &'static str,
        index: usize,
        expected: FieldType,
    },
}

impl ShapeError {
    pub(crate) fn mismatch(
        kind: NodeKind,
        field: &'static str,
        expected: FieldType,
        mismatch: Mismatch,
    ) -> Self {
        match mismatch {
            Mismatch::Field => ShapeError::FieldType {
                kind,
                field,
                expected,
            },
            Mismatch::Element(index) => ShapeError::ElementType {
                kind,
                field,
                index,
                expected,
            },
        }
    }
}

/// Implemented by every concrete node kind.
pub trait AstNode: Sized {
    const KIND: NodeKind;
    /// Declared fields, in order.
    const FIELDS: &'static [FieldDecl];

    /// Field values in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)>;

    fn line(&self) -> Option<usize>;

    /// Attaches the source line. Declared fields are left untouched.
    fn set_line(&mut self, line: usize);

    /// Checked positional construction: `values` must match [`Self::FIELDS`] in count and type.
    fn from_values(values: Vec<Value>) -> Result<Self, ShapeError>;

    fn with_line(mut self, line: usize) -> Self {
        self.set_line(line);
        self
    }
}

/// Declares one node kind: its struct, positional constructor and [`AstNode`] impl.
macro_rules! node_kind {
    (
        $(#[$meta:meta])*
        $kind:ident { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $kind {
            $($(#[$field_meta])* pub $field: $ty,)*
            /// Line of the token that introduced this node.
            pub line: Option<usize>,
        }

        impl $kind {
            #[allow(clippy::new_without_default)]
            pub fn new($($field: $ty),*) -> Self {
                Self {
                    $($field,)*
                    line: None,
                }
            }
        }

        impl $crate::ast::node::AstNode for $kind {
            const KIND: $crate::ast::NodeKind = $crate::ast::NodeKind::$kind;
            const FIELDS: &'static [$crate::ast::field::FieldDecl] = &[
                $($crate::ast::field::FieldDecl {
                    name: stringify!($field),
                    ty: <$ty as $crate::ast::field::Field>::TYPE,
                },)*
            ];

            fn fields(&self) -> Vec<(&'static str, $crate::ast::field::FieldRef<'_>)> {
                vec![$((stringify!($field), $crate::ast::field::Field::field_ref(&self.$field)),)*]
            }

            fn line(&self) -> Option<usize> {
                self.line
            }

            fn set_line(&mut self, line: usize) {
                self.line = Some(line);
            }

            #[allow(unused_mut, unused_variables)]
            fn from_values(
                values: Vec<$crate::ast::field::Value>,
            ) -> Result<Self, $crate::ast::node::ShapeError> {
                if values.len() != Self::FIELDS.len() {
                    return Err($crate::ast::node::ShapeError::Arity {
                        kind: Self::KIND,
                        expected: Self::FIELDS.len(),
                        found: values.len(),
                    });
                }
                let mut values = values.into_iter();
                Ok(Self {
                    $($field: {
                        let value = values.next().unwrap_or($crate::ast::field::Value::Absent);
                        <$ty as $crate::ast::field::Field>::from_value(value).map_err(|mismatch| {
                            $crate::ast::node::ShapeError::mismatch(
                                Self::KIND,
                                stringify!($field),
                                <$ty as $crate::ast::field::Field>::TYPE,
                                mismatch,
                            )
                        })?
                    },)*
                    line: None,
                })
            }
        }

        impl $crate::ast::field::Element for $kind {
            const BASE: $crate::ast::field::BaseType =
                $crate::ast::field::BaseType::Kind($crate::ast::NodeKind::$kind);

            fn element_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                $crate::ast::field::FieldRef::Node($crate::ast::NodeRef::$kind(self))
            }

            fn from_element(value: $crate::ast::field::Value) -> Option<Self> {
                match value {
                    $crate::ast::field::Value::Node($crate::ast::Node::$kind(node)) => Some(node),
                    _ => None,
                }
            }
        }

        impl_field!($kind);

        impl<'a> From<&'a $kind> for $crate::ast::NodeRef<'a> {
            fn from(node: &'a $kind) -> Self {
                $crate::ast::NodeRef::$kind(node)
            }
        }

        impl From<$kind> for $crate::ast::Node {
            fn from(node: $kind) -> Self {
                $crate::ast::Node::$kind(node)
            }
        }

        impl From<$kind> for $crate::ast::field::Value {
            fn from(node: $kind) -> Self {
                $crate::ast::field::Value::Node($crate::ast::Node::$kind(node))
            }
        }

        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&$crate::ast::NodeRef::$kind(self), f)
            }
        }
    };
}

/// Declares the whole node taxonomy.
///
/// Standalone kinds are listed first, then the kinds of each category. From this single
/// declaration the macro derives the per-kind structs, [`NodeKind`], `Category`, the owned
/// `Node` and borrowed `NodeRef` enums and one enum per category.
macro_rules! ast_nodes {
    (
        standalone {
            $(
                $(#[$root_meta:meta])*
                $root:ident { $($(#[$root_field_meta:meta])* $root_field:ident : $root_ty:ty),* $(,)? }
            )*
        }
        $(
            $(#[$category_meta:meta])*
            category $category:ident {
                $(
                    $(#[$meta:meta])*
                    $kind:ident { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? }
                )*
            }
        )*
    ) => {
        $(
            node_kind! {
                $(#[$root_meta])*
                $root { $($(#[$root_field_meta])* $root_field : $root_ty),* }
            }
        )*
        $($(
            node_kind! {
                $(#[$meta])*
                $kind { $($(#[$field_meta])* $field : $ty),* }
            }
        )*)*

        /// Tag of a concrete node kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($root,)*
            $($($kind,)*)*
        }

        impl NodeKind {
            /// Every node kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[
                $(NodeKind::$root,)*
                $($(NodeKind::$kind,)*)*
            ];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$root => stringify!($root),)*
                    $($(NodeKind::$kind => stringify!($kind),)*)*
                }
            }

            pub fn from_name(name: &str) -> Option<NodeKind> {
                NodeKind::ALL.iter().copied().find(|kind| kind.name() == name)
            }

            /// The abstract category this kind belongs to, if any.
            pub fn category(self) -> Option<Category> {
                match self {
                    $(NodeKind::$root => None,)*
                    $($(NodeKind::$kind => Some(Category::$category),)*)*
                }
            }

            /// Declared fields of this kind, in order.
            pub fn fields(self) -> &'static [$crate::ast::field::FieldDecl] {
                match self {
                    $(NodeKind::$root => <$root as $crate::ast::node::AstNode>::FIELDS,)*
                    $($(NodeKind::$kind => <$kind as $crate::ast::node::AstNode>::FIELDS,)*)*
                }
            }
        }

        impl ::std::fmt::Display for NodeKind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        /// Abstract node categories.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Category {
            $($category,)*
        }

        impl Category {
            pub fn name(self) -> &'static str {
                match self {
                    $(Category::$category => stringify!($category),)*
                }
            }

            /// The node kinds of this category.
            pub fn kinds(self) -> &'static [NodeKind] {
                match self {
                    $(Category::$category => &[$(NodeKind::$kind,)*],)*
                }
            }
        }

        impl ::std::fmt::Display for Category {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        /// Any node, owned.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Node {
            $($root($root),)*
            $($($kind($kind),)*)*
        }

        impl Node {
            /// Builds a node of `kind` from positional field values, checking them against the
            /// declared fields.
            pub fn build(
                kind: NodeKind,
                values: Vec<$crate::ast::field::Value>,
            ) -> Result<Node, $crate::ast::node::ShapeError> {
                match kind {
                    $(NodeKind::$root => {
                        <$root as $crate::ast::node::AstNode>::from_values(values).map(Node::$root)
                    })*
                    $($(NodeKind::$kind => {
                        <$kind as $crate::ast::node::AstNode>::from_values(values).map(Node::$kind)
                    })*)*
                }
            }

            pub fn as_node(&self) -> NodeRef<'_> {
                match self {
                    $(Node::$root(node) => NodeRef::$root(node),)*
                    $($(Node::$kind(node) => NodeRef::$kind(node),)*)*
                }
            }

            pub fn kind(&self) -> NodeKind {
                self.as_node().kind()
            }

            pub fn line(&self) -> Option<usize> {
                self.as_node().line()
            }
        }

        impl ::std::fmt::Display for Node {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.as_node(), f)
            }
        }

        /// Any node, borrowed.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum NodeRef<'a> {
            $($root(&'a $root),)*
            $($($kind(&'a $kind),)*)*
        }

        impl<'a> NodeRef<'a> {
            pub fn kind(self) -> NodeKind {
                match self {
                    $(NodeRef::$root(_) => NodeKind::$root,)*
                    $($(NodeRef::$kind(_) => NodeKind::$kind,)*)*
                }
            }

            /// Field values in declaration order.
            pub fn fields(self) -> Vec<(&'static str, $crate::ast::field::FieldRef<'a>)> {
                match self {
                    $(NodeRef::$root(node) => $crate::ast::node::AstNode::fields(node),)*
                    $($(NodeRef::$kind(node) => $crate::ast::node::AstNode::fields(node),)*)*
                }
            }

            pub fn line(self) -> Option<usize> {
                match self {
                    $(NodeRef::$root(node) => node.line,)*
                    $($(NodeRef::$kind(node) => node.line,)*)*
                }
            }
        }

        impl ::std::fmt::Display for NodeRef<'_> {
            /// `Kind(field=value, ...)` with child nodes shown by kind name only.
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}(", self.kind())?;
                for (i, (name, value)) in self.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                f.write_str(")")
            }
        }

        $(
            $(#[$category_meta])*
            #[derive(Debug, Clone, PartialEq)]
            pub enum $category {
                $($kind($kind),)*
            }

            impl $category {
                pub fn as_node(&self) -> NodeRef<'_> {
                    match self {
                        $($category::$kind(node) => NodeRef::$kind(node),)*
                    }
                }

                pub fn kind(&self) -> NodeKind {
                    self.as_node().kind()
                }

                pub fn line(&self) -> Option<usize> {
                    self.as_node().line()
                }

                pub fn set_line(&mut self, line: usize) {
                    match self {
                        $($category::$kind(node) => node.line = Some(line),)*
                    }
                }
            }

            $(
                impl From<$kind> for $category {
                    fn from(node: $kind) -> Self {
                        $category::$kind(node)
                    }
                }
            )*

            impl<'a> From<&'a $category> for NodeRef<'a> {
                fn from(node: &'a $category) -> Self {
                    node.as_node()
                }
            }

            impl From<$category> for Node {
                fn from(node: $category) -> Self {
                    match node {
                        $($category::$kind(node) => Node::$kind(node),)*
                    }
                }
            }

            impl From<$category> for $crate::ast::field::Value {
                fn from(node: $category) -> Self {
                    $crate::ast::field::Value::Node(node.into())
                }
            }

            impl $crate::ast::field::Element for $category {
                const BASE: $crate::ast::field::BaseType =
                    $crate::ast::field::BaseType::Category(Category::$category);

                fn element_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                    $crate::ast::field::FieldRef::Node(self.as_node())
                }

                fn from_element(value: $crate::ast::field::Value) -> Option<Self> {
                    match value {
                        $($crate::ast::field::Value::Node(Node::$kind(node)) => {
                            Some($category::$kind(node))
                        })*
                        _ => None,
                    }
                }
            }

            impl_field!($category);

            impl ::std::fmt::Display for $category {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt(&self.as_node(), f)
                }
            }
        )*
    };
}
