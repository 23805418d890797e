//! Depth annotated linearization of the tree, for debugging and tests.

use std::fmt::Write;

use crate::ast::NodeRef;
use crate::visitor::{walk_node, Visitor};

struct Flattener<'ast> {
    depth: usize,
    nodes: Vec<(usize, NodeRef<'ast>)>,
}

impl<'ast> Visitor<'ast> for Flattener<'ast> {
    fn generic_visit(&mut self, node: NodeRef<'ast>) {
        self.nodes.push((self.depth, node));
        self.depth += 1;
        walk_node(self, node);
        self.depth -= 1;
    }
}

/// Lists every node below (and including) `root` in pre-order, with its depth.
pub fn flatten<'ast>(root: impl Into<NodeRef<'ast>>) -> Vec<(usize, NodeRef<'ast>)> {
    let mut flattener = Flattener {
        depth: 0,
        nodes: Vec::new(),
    };
    flattener.visit_node(root.into());
    flattener.nodes
}

/// Renders [`flatten`] as one `{line}: {indent}{node}` line per node.
pub fn dump<'ast>(root: impl Into<NodeRef<'ast>>) -> String {
    let mut out = String::new();
    for (depth, node) in flatten(root) {
        if !out.is_empty() {
            out.push('\n');
        }
        let line = match node.line() {
            Some(line) => line.to_string(),
            None => "None".to_string(),
        };
        // writing to a String cannot fail
        let _ = write!(out, "{}: {:indent$}{}", line, "", node, indent = depth * 4);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn sample() -> Statement {
        WhileStatement::new(
            BoolLiteral::new(true).with_line(1).into(),
            Box::new(
                ReturnStatement::new(Some(IntegerLiteral::new(0).with_line(2).into()))
                    .with_line(2)
                    .into(),
            ),
        )
        .with_line(1)
        .into()
    }

    #[test]
    fn test_flatten_depths() {
        let stmt = sample();
        let depths: Vec<_> = flatten(&stmt)
            .into_iter()
            .map(|(depth, node)| (depth, node.kind()))
            .collect();
        assert_eq!(
            depths,
            vec![
                (0, NodeKind::WhileStatement),
                (1, NodeKind::BoolLiteral),
                (1, NodeKind::ReturnStatement),
                (2, NodeKind::IntegerLiteral),
            ]
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let stmt = sample();
        assert_eq!(flatten(&stmt), flatten(&stmt));
    }

    #[test]
    fn test_dump() {
        let stmt = sample();
        assert_eq!(
            dump(&stmt),
            "1: WhileStatement(condition=BoolLiteral, body=ReturnStatement)\n\
             1:     BoolLiteral(value=true)\n\
             2:     ReturnStatement(value=IntegerLiteral)\n\
             2:         IntegerLiteral(value=0)"
        );
        assert_eq!(
            dump(&NullStatement::new()),
            "None: NullStatement()"
        );
    }
}
