//! The aligner: contiguous runs of sibling declarations get a shared
//! column for their `=` operators. Purely additive: it never touches
//! wrap policies, only the alignment column the solver pads to.

use crate::{
    ast::{Node, NodeKind},
    config::FormatOptions,
    token::TokenStore,
};
use log::trace;

pub(crate) fn align(store: &mut TokenStore, options: &FormatOptions, root: &Node) {
    if !options.align_assignments_in_declaration_groups {
        return;
    }
    Aligner { store, options }.node(root, 0);
}

struct Aligner<'a> {
    store: &'a mut TokenStore,
    options: &'a FormatOptions,
}

impl Aligner<'_> {
    fn node(&mut self, node: &Node, depth: usize) {
        match &node.kind {
            NodeKind::Unit { decls } => self.statements(decls, depth),
            NodeKind::TypeDecl { members, .. } => self.statements(members, depth + 1),
            NodeKind::MethodDecl { body, .. } => self.node(body, depth),
            NodeKind::Block { statements, .. } => self.statements(statements, depth + 1),
            NodeKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.node(then_branch, depth);
                if let Some(else_branch) = else_branch {
                    self.node(else_branch, depth);
                }
            }
            NodeKind::While { body, .. } => self.node(body, depth),
            NodeKind::Lambda { body, .. } => self.node(body, depth),
            _ => {}
        }
    }

    fn statements(&mut self, statements: &[Node], depth: usize) {
        let indent = depth * self.options.indent_size;
        let mut run: Vec<(usize, usize)> = vec![];
        for statement in statements {
            match &statement.kind {
                NodeKind::LocalDecl { eq: Some(eq), .. }
                    if self.store.range_enabled(statement.start, *eq) =>
                {
                    let column = indent + self.natural_offset(statement.start, *eq);
                    run.push((*eq, column));
                }
                _ => self.flush(&mut run),
            }
            self.node(statement, depth);
        }
        self.flush(&mut run);
    }

    /// Column of the `=` token when the declaration renders on one
    /// line starting at column zero.
    fn natural_offset(&self, start: usize, eq: usize) -> usize {
        let mut column = 0;
        for i in start..eq {
            if i > start {
                column += self.store[i].spaces_before;
            }
            column += self.store[i].text.chars().count();
        }
        column + self.store[eq].spaces_before
    }

    fn flush(&mut self, run: &mut Vec<(usize, usize)>) {
        if run.len() >= 2 {
            let target = run.iter().map(|(_, c)| *c).max().expect("non-empty run");
            trace!("aligning {} assignment operators at column {}", run.len(), target);
            for (eq, _) in run.iter() {
                self.store[*eq].align = Some(target);
            }
        }
        run.clear();
    }
}
