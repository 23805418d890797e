//! Field typing for AST nodes.
//!
//! Every node field has a [`FieldType`] made of a [`BaseType`] and a [`Shape`].
//! The [`Field`] trait connects a Rust field type to its declared type, to a borrowed
//! view used by generic traversal ([`FieldRef`]) and to the dynamic values accepted by
//! checked construction ([`Value`]).

use std::fmt;

use super::{Category, Node, NodeKind, NodeRef};

/// Primitive or node type of a field (or of the elements of a sequence field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Str,
    Int,
    Float,
    Bool,
    Char,
    /// Any node of the category.
    Category(Category),
    /// Exactly one node kind.
    Kind(NodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    One,
    Sequence,
    Optional,
}

/// Declared type of a node field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub base: BaseType,
    pub shape: Shape,
}

impl FieldType {
    pub const fn one(base: BaseType) -> Self {
        Self {
            base,
            shape: Shape::One,
        }
    }

    pub const fn sequence(base: BaseType) -> Self {
        Self {
            base,
            shape: Shape::Sequence,
        }
    }

    pub const fn optional(base: BaseType) -> Self {
        Self {
            base,
            shape: Shape::Optional,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Str => f.write_str("string"),
            BaseType::Int => f.write_str("int"),
            BaseType::Float => f.write_str("float"),
            BaseType::Bool => f.write_str("bool"),
            BaseType::Char => f.write_str("char"),
            BaseType::Category(category) => write!(f, "{}", category),
            BaseType::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::One => write!(f, "{}", self.base),
            Shape::Sequence => write!(f, "[{}]", self.base),
            Shape::Optional => write!(f, "{}?", self.base),
        }
    }
}

/// A field in a node kind's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub ty: FieldType,
}

/// Borrowed view of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Node(NodeRef<'a>),
    Sequence(Vec<FieldRef<'a>>),
    Absent,
}

impl fmt::Display for FieldRef<'_> {
    /// Child nodes are shown by kind name only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Str(value) => write!(f, "{:?}", value),
            FieldRef::Int(value) => write!(f, "{}", value),
            FieldRef::Float(value) => write!(f, "{:?}", value),
            FieldRef::Bool(value) => write!(f, "{}", value),
            FieldRef::Char(value) => write!(f, "{:?}", value),
            FieldRef::Node(node) => write!(f, "{}", node.kind()),
            FieldRef::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            FieldRef::Absent => f.write_str("None"),
        }
    }
}

/// Owned, dynamically typed field value, used to build nodes whose shape is only known at
/// runtime (see [`Node::build`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Node(Node),
    Sequence(Vec<Value>),
    Absent,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

/// Why a [`Value`] was rejected by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// The value itself has the wrong type.
    Field,
    /// The element at this index of a sequence has the wrong type.
    Element(usize),
}

/// A type usable as a single field value or as the element of a sequence field.
pub trait Element: Sized {
    const BASE: BaseType;

    fn element_ref(&self) -> FieldRef<'_>;

    fn from_element(value: Value) -> Option<Self>;
}

/// A type usable as a node field.
pub trait Field: Sized {
    const TYPE: FieldType;

    fn field_ref(&self) -> FieldRef<'_>;

    fn from_value(value: Value) -> Result<Self, Mismatch>;
}

impl Element for String {
    const BASE: BaseType = BaseType::Str;

    fn element_ref(&self) -> FieldRef<'_> {
        FieldRef::Str(self)
    }

    fn from_element(value: Value) -> Option<Self> {
        match value {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// Implements [`Element`] for a `Copy` primitive stored in a [`Value`] variant of the same name.
macro_rules! impl_primitive_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl Element for $ty {
            const BASE: BaseType = BaseType::$variant;

            fn element_ref(&self) -> FieldRef<'_> {
                FieldRef::$variant(*self)
            }

            fn from_element(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    )*};
}

impl_primitive_element!(i64 => Int, f64 => Float, bool => Bool, char => Char);

/// Implements [`Field`] for an [`Element`] type and its containers: `Box<T>`, `Vec<T>`,
/// `Option<T>` and `Option<Box<T>>`.
macro_rules! impl_field {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::ast::field::Field for $ty {
            const TYPE: $crate::ast::field::FieldType =
                $crate::ast::field::FieldType::one(<$ty as $crate::ast::field::Element>::BASE);

            fn field_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                $crate::ast::field::Element::element_ref(self)
            }

            fn from_value(
                value: $crate::ast::field::Value,
            ) -> Result<Self, $crate::ast::field::Mismatch> {
                <$ty as $crate::ast::field::Element>::from_element(value)
                    .ok_or($crate::ast::field::Mismatch::Field)
            }
        }

        impl $crate::ast::field::Field for Box<$ty> {
            const TYPE: $crate::ast::field::FieldType =
                $crate::ast::field::FieldType::one(<$ty as $crate::ast::field::Element>::BASE);

            fn field_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                $crate::ast::field::Element::element_ref(&**self)
            }

            fn from_value(
                value: $crate::ast::field::Value,
            ) -> Result<Self, $crate::ast::field::Mismatch> {
                <$ty as $crate::ast::field::Element>::from_element(value)
                    .map(Box::new)
                    .ok_or($crate::ast::field::Mismatch::Field)
            }
        }

        impl $crate::ast::field::Field for Vec<$ty> {
            const TYPE: $crate::ast::field::FieldType =
                $crate::ast::field::FieldType::sequence(<$ty as $crate::ast::field::Element>::BASE);

            fn field_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                $crate::ast::field::FieldRef::Sequence(
                    self.iter().map($crate::ast::field::Element::element_ref).collect(),
                )
            }

            fn from_value(
                value: $crate::ast::field::Value,
            ) -> Result<Self, $crate::ast::field::Mismatch> {
                match value {
                    $crate::ast::field::Value::Sequence(items) => items
                        .into_iter()
                        .enumerate()
                        .map(|(index, item)| {
                            <$ty as $crate::ast::field::Element>::from_element(item)
                                .ok_or($crate::ast::field::Mismatch::Element(index))
                        })
                        .collect(),
                    _ => Err($crate::ast::field::Mismatch::Field),
                }
            }
        }

        impl $crate::ast::field::Field for Option<$ty> {
            const TYPE: $crate::ast::field::FieldType =
                $crate::ast::field::FieldType::optional(<$ty as $crate::ast::field::Element>::BASE);

            fn field_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                match self {
                    Some(value) => $crate::ast::field::Element::element_ref(value),
                    None => $crate::ast::field::FieldRef::Absent,
                }
            }

            fn from_value(
                value: $crate::ast::field::Value,
            ) -> Result<Self, $crate::ast::field::Mismatch> {
                match value {
                    $crate::ast::field::Value::Absent => Ok(None),
                    value => <$ty as $crate::ast::field::Element>::from_element(value)
                        .map(Some)
                        .ok_or($crate::ast::field::Mismatch::Field),
                }
            }
        }

        impl $crate::ast::field::Field for Option<Box<$ty>> {
            const TYPE: $crate::ast::field::FieldType =
                $crate::ast::field::FieldType::optional(<$ty as $crate::ast::field::Element>::BASE);

            fn field_ref(&self) -> $crate::ast::field::FieldRef<'_> {
                match self {
                    Some(value) => $crate::ast::field::Element::element_ref(&**value),
                    None => $crate::ast::field::FieldRef::Absent,
                }
            }

            fn from_value(
                value: $crate::ast::field::Value,
            ) -> Result<Self, $crate::ast::field::Mismatch> {
                match value {
                    $crate::ast::field::Value::Absent => Ok(None),
                    value => <$ty as $crate::ast::field::Element>::from_element(value)
                        .map(|value| Some(Box::new(value)))
                        .ok_or($crate::ast::field::Mismatch::Field),
                }
            }
        }
    )*};
}

impl_field!(String, i64, f64, bool, char);
