//! The wrap-policy preparator: walks the AST and, per node kind, turns
//! the construct's wrapping style option into concrete wrap policies on
//! the token store. Candidate positions of one construct share a parent
//! anchor and a group end so the solver can reason about them together.

use crate::{
    ast::{Node, NodeKind},
    config::{BracePosition, FormatOptions, ParenPosition, SplitStyle, WrapSpec},
    oper,
    token::{TokenStore, WrapMode, WrapPolicy},
};
use log::trace;

pub(crate) fn prepare(store: &mut TokenStore, options: &FormatOptions, root: &Node) {
    let mut preparator = Preparator {
        store,
        options,
        depth: 0,
    };
    preparator.node(root);
}

/// Candidate break positions of one construct, resolved against its
/// wrapping style.
#[derive(Debug)]
struct WrapPlan {
    indexes: Vec<usize>,
    parent: usize,
    group_end: usize,
    spec: WrapSpec,
    penalty: f32,
    extra_indent: usize,
}

struct Preparator<'a> {
    store: &'a mut TokenStore,
    options: &'a FormatOptions,
    depth: usize,
}

impl Preparator<'_> {
    fn node(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Unit { decls } => self.unit(decls),
            NodeKind::TypeDecl { .. } => self.type_decl(node),
            NodeKind::MethodDecl {
                lparen,
                rparen,
                params,
                body,
            } => self.method_decl(node, *lparen, *rparen, params, body),
            NodeKind::Block {
                open_brace,
                close_brace,
                statements,
            } => self.block(*open_brace, *close_brace, statements),
            NodeKind::If {
                condition,
                then_branch,
                else_kw,
                else_branch,
            } => self.conditional(node, condition, then_branch, *else_kw, else_branch.as_deref()),
            NodeKind::While { condition, body } => {
                self.nested(|p| p.node(condition));
                self.body(node.start, body);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.nested(|p| p.node(value));
                }
            }
            NodeKind::LocalDecl { eq, value, .. } => self.local_decl(node, *eq, value.as_deref()),
            NodeKind::ExprStmt { expr } => self.node(expr),
            NodeKind::Invocation { .. } | NodeKind::FieldAccess { .. } => self.chain(node),
            NodeKind::Infix { .. } => self.infix_chain(node),
            NodeKind::Prefix { operand, .. } => self.node(operand),
            NodeKind::Paren { inner, .. } => self.nested(|p| p.node(inner)),
            NodeKind::Lambda { arrow, body } => self.lambda(node, *arrow, body),
            NodeKind::Atom => {}
            NodeKind::Malformed => {
                trace!(
                    "disabling formatting for malformed range {}..{}",
                    node.start,
                    node.end
                );
                self.store.disable_range(node.start, node.end);
            }
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn unit(&mut self, decls: &[Node]) {
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 {
                self.structural(decl.start, decls[i - 1].start, 0, decl.end, WrapMode::Force);
            } else if decl.start > 0 {
                // Header comments; the fold below pins the first code
                // line under own-line comments.
                self.structural(decl.start, 0, 0, decl.end, WrapMode::Force);
            }
            self.node(decl);
        }
    }

    fn type_decl(&mut self, node: &Node) {
        let NodeKind::TypeDecl {
            extends_kw,
            implements_kw,
            supers,
            open_brace,
            close_brace,
            members,
        } = &node.kind
        else {
            unreachable!()
        };
        let mut indexes = vec![];
        if let Some(kw) = extends_kw {
            indexes.push(*kw);
        }
        if let Some(kw) = implements_kw {
            indexes.push(*kw);
        }
        // With one-per-line superinterfaces, every listed interface
        // after the first is its own candidate.
        let first_impl = usize::from(extends_kw.is_some());
        if implements_kw.is_some() {
            for superref in supers.iter().skip(first_impl + 1) {
                indexes.push(superref.start);
            }
        }
        indexes.sort_unstable();
        self.plan(WrapPlan {
            indexes,
            parent: node.start,
            group_end: open_brace.saturating_sub(1),
            spec: WrapSpec::new(self.options.wrap_superinterfaces),
            penalty: self.penalty(2.0),
            extra_indent: 0,
        });

        match self.options.brace_position_for_type_declaration {
            BracePosition::SameLine => {}
            BracePosition::NextLine => {
                self.structural(*open_brace, node.start, 0, *close_brace, WrapMode::Force)
            }
            BracePosition::NextLineShifted => {
                self.structural(*open_brace, node.start, 1, *close_brace, WrapMode::Force)
            }
        }
        for member in members {
            self.structural(member.start, *open_brace, 1, *close_brace, WrapMode::Force);
        }
        self.structural(*close_brace, *open_brace, 0, *close_brace, WrapMode::Force);
        self.nested(|p| {
            for member in members {
                p.node(member);
            }
        });
    }

    fn method_decl(
        &mut self,
        node: &Node,
        lparen: usize,
        rparen: usize,
        params: &[Node],
        body: &Node,
    ) {
        self.plan(WrapPlan {
            indexes: params.iter().map(|p| p.start).collect(),
            parent: lparen,
            group_end: rparen,
            spec: WrapSpec::new(self.options.wrap_parameters_in_declarations),
            penalty: self.penalty(1.0),
            extra_indent: 0,
        });
        self.nested(|p| {
            for param in params {
                p.node(param);
            }
        });
        self.body_block(node.start, body);
    }

    /// A block attached to a construct: brace position first, then the
    /// block contents.
    fn body_block(&mut self, construct_start: usize, block: &Node) {
        let NodeKind::Block {
            open_brace,
            close_brace,
            ..
        } = &block.kind
        else {
            unreachable!()
        };
        match self.options.brace_position_for_block {
            BracePosition::SameLine => {}
            BracePosition::NextLine => {
                self.structural(*open_brace, construct_start, 0, *close_brace, WrapMode::Force)
            }
            BracePosition::NextLineShifted => {
                self.structural(*open_brace, construct_start, 1, *close_brace, WrapMode::Force)
            }
        }
        self.node(block);
    }

    fn block(&mut self, open_brace: usize, close_brace: usize, statements: &[Node]) {
        let mode = if self.keeps_on_one_line(open_brace, close_brace, statements) {
            WrapMode::BlockIndent
        } else {
            WrapMode::Force
        };
        for statement in statements {
            self.structural(statement.start, open_brace, 1, close_brace, mode);
        }
        self.structural(close_brace, open_brace, 0, close_brace, mode);
        self.nested(|p| {
            for statement in statements {
                p.node(statement);
            }
        });
    }

    /// A simple block may stay on one line: at most one statement, no
    /// comments inside.
    fn keeps_on_one_line(
        &self,
        open_brace: usize,
        close_brace: usize,
        statements: &[Node],
    ) -> bool {
        if !self.options.keep_simple_blocks_on_one_line || statements.len() > 1 {
            return false;
        }
        !(open_brace + 1..close_brace).any(|i| self.store[i].kind.is_comment())
    }

    fn conditional(
        &mut self,
        node: &Node,
        condition: &Node,
        then_branch: &Node,
        else_kw: Option<usize>,
        else_branch: Option<&Node>,
    ) {
        self.nested(|p| p.node(condition));
        self.body(node.start, then_branch);
        if let Some(kw) = else_kw {
            // `else` stays on the closing brace line of a block branch.
            if !matches!(then_branch.kind, NodeKind::Block { .. }) {
                self.structural(kw, node.start, 0, node.end, WrapMode::Force);
            }
            if let Some(else_branch) = else_branch {
                self.body(kw, else_branch);
            }
        }
    }

    /// A statement body: a braced block follows the brace position
    /// option; a bare statement is forced onto its own indented line,
    /// reindenting any breaks already present inside it.
    fn body(&mut self, construct_start: usize, body: &Node) {
        if matches!(body.kind, NodeKind::Block { .. }) {
            self.body_block(construct_start, body);
        } else {
            self.structural(body.start, construct_start, 1, body.end, WrapMode::Force);
            self.shift_range(body.start, body.end, self.options.indent_size as isize);
            self.nested(|p| p.node(body));
        }
    }

    fn local_decl(&mut self, node: &Node, eq: Option<usize>, value: Option<&Node>) {
        if let (Some(_), Some(value)) = (eq, value) {
            self.plan(WrapPlan {
                indexes: vec![value.start],
                parent: node.start,
                group_end: node.end,
                spec: WrapSpec::new(SplitStyle::WhenNeeded),
                penalty: self.penalty(3.0),
                extra_indent: 0,
            });
            self.nested(|p| p.node(value));
        }
    }

    /// A field/method access chain is prepared as one construct: break
    /// candidates before each dot, one argument group per invocation.
    fn chain(&mut self, node: &Node) {
        let mut dots = vec![];
        let mut arg_lists = vec![];
        let mut base = node;
        loop {
            match &base.kind {
                NodeKind::Invocation {
                    callee,
                    lparen,
                    rparen,
                    args,
                } => {
                    arg_lists.push((*lparen, *rparen, args));
                    base = callee;
                }
                NodeKind::FieldAccess { receiver, dot, .. } => {
                    dots.push(*dot);
                    base = receiver;
                }
                _ => break,
            }
        }
        dots.reverse();
        arg_lists.reverse();
        self.node(base);

        if dots.len() >= 2 {
            self.plan(WrapPlan {
                indexes: dots,
                parent: node.start,
                group_end: node.end,
                spec: WrapSpec::new(self.options.wrap_chained_invocations),
                penalty: self.penalty(1.0),
                extra_indent: 0,
            });
        } else if dots.len() == 1 {
            // Secondary candidate: the solver may still break at the
            // dot, without top-priority treatment or alignment.
            self.plan(WrapPlan {
                indexes: dots,
                parent: node.start,
                group_end: node.end,
                spec: WrapSpec::new(SplitStyle::WhenNeeded),
                penalty: self.penalty(4.0),
                extra_indent: 0,
            });
        }
        for (lparen, rparen, args) in arg_lists {
            self.arguments(lparen, rparen, args);
        }
    }

    fn arguments(&mut self, lparen: usize, rparen: usize, args: &[Node]) {
        self.plan(WrapPlan {
            indexes: args.iter().map(|a| a.start).collect(),
            parent: lparen,
            group_end: rparen,
            spec: WrapSpec::new(self.options.wrap_arguments_in_invocations),
            penalty: self.penalty(1.0),
            extra_indent: 0,
        });
        if self.options.parenthesis_position_in_invocations == ParenPosition::SeparateLine
            && !args.is_empty()
            && self.store.range_enabled(lparen, rparen)
        {
            self.store.set_policy(
                rparen,
                WrapPolicy {
                    mode: WrapMode::BlockIndent,
                    parent: lparen,
                    group_end: rparen,
                    extra_indent: 0,
                    depth: self.depth,
                    penalty: 0.0,
                    is_first: false,
                    indent_on_column: false,
                },
            );
        }
        self.nested(|p| {
            for arg in args {
                p.node(arg);
            }
        });
    }

    /// Operands joined by operators of one precedence level form a
    /// single flattened wrap group; a tighter-binding subexpression is
    /// recursed as its own construct.
    fn infix_chain(&mut self, node: &Node) {
        let NodeKind::Infix { op, .. } = &node.kind else {
            unreachable!()
        };
        let prec = oper::precedence(&self.store[*op].text);
        let mut ops = vec![];
        let mut operands = vec![];
        self.flatten_infix(node, prec, &mut ops, &mut operands);

        let (style, wrap_before) = match oper::wrap_class(&self.store[ops[0]].text) {
            oper::OperatorClass::Arithmetic => (
                self.options.wrap_arithmetic_operators,
                self.options.wrap_before_arithmetic_operator,
            ),
            oper::OperatorClass::Logical => (
                self.options.wrap_logical_operators,
                self.options.wrap_before_logical_operator,
            ),
        };
        let indexes = (1..operands.len())
            .map(|i| {
                if wrap_before {
                    ops[i - 1]
                } else {
                    operands[i].start
                }
            })
            .collect();
        self.plan(WrapPlan {
            indexes,
            parent: node.start,
            group_end: node.end,
            spec: WrapSpec::new(style),
            penalty: self.penalty(2.0),
            extra_indent: 0,
        });
        self.nested(|p| {
            for operand in operands {
                p.node(operand);
            }
        });
    }

    fn flatten_infix<'n>(
        &self,
        node: &'n Node,
        prec: u8,
        ops: &mut Vec<usize>,
        operands: &mut Vec<&'n Node>,
    ) {
        match &node.kind {
            NodeKind::Infix { op, left, right }
                if oper::precedence(&self.store[*op].text) == prec =>
            {
                self.flatten_infix(left, prec, ops, operands);
                ops.push(*op);
                self.flatten_infix(right, prec, ops, operands);
            }
            _ => operands.push(node),
        }
    }

    fn lambda(&mut self, node: &Node, arrow: usize, body: &Node) {
        if let NodeKind::Block {
            open_brace,
            close_brace,
            ..
        } = &body.kind
        {
            match self.options.brace_position_for_lambda_body {
                BracePosition::SameLine => {}
                BracePosition::NextLine => {
                    self.structural(*open_brace, node.start, 0, *close_brace, WrapMode::Force)
                }
                BracePosition::NextLineShifted => {
                    self.structural(*open_brace, node.start, 1, *close_brace, WrapMode::Force)
                }
            }
            self.node(body);
        } else {
            self.plan(WrapPlan {
                indexes: vec![body.start],
                parent: arrow,
                group_end: node.end,
                spec: WrapSpec::new(SplitStyle::WhenNeeded),
                penalty: self.penalty(2.0),
                extra_indent: 0,
            });
            self.nested(|p| p.node(body));
        }
    }

    /// Resolves a plan into per-candidate policies: the first and
    /// subsequent candidates may differ in mode depending on the split
    /// style. Zero candidates is a no-op.
    fn plan(&mut self, plan: WrapPlan) {
        if plan.indexes.is_empty() || plan.spec.split_style == SplitStyle::NoWrap {
            return;
        }
        if !self.store.range_enabled(plan.parent, plan.group_end) {
            return;
        }
        trace!(
            "wrap group parent={} end={} candidates={:?} style={:?}",
            plan.parent,
            plan.group_end,
            plan.indexes,
            plan.spec.split_style
        );
        for (i, &index) in plan.indexes.iter().enumerate() {
            let mode = if plan.spec.force {
                WrapMode::Force
            } else {
                match plan.spec.split_style {
                    SplitStyle::NoWrap => unreachable!(),
                    SplitStyle::WhenNeeded => WrapMode::WhereNecessary,
                    SplitStyle::CompactFirstBreak => {
                        if i == 0 {
                            WrapMode::TopPriority
                        } else {
                            WrapMode::WhereNecessary
                        }
                    }
                    SplitStyle::OnePerLine => WrapMode::TopPriority,
                }
            };
            let policy = WrapPolicy {
                mode,
                parent: plan.parent,
                group_end: plan.group_end,
                extra_indent: plan.extra_indent + usize::from(plan.spec.indent_by_one),
                depth: self.depth,
                penalty: plan.penalty,
                is_first: i == 0,
                indent_on_column: plan.spec.indent_on_column,
            };
            self.set_folded(index, policy);
        }
    }

    /// A structural (non-width-driven) break before a token.
    fn structural(
        &mut self,
        index: usize,
        parent: usize,
        extra_indent: usize,
        group_end: usize,
        mode: WrapMode,
    ) {
        if !self.store.range_enabled(parent, group_end.min(self.store.len() - 1)) {
            return;
        }
        let policy = WrapPolicy {
            mode,
            parent,
            group_end,
            extra_indent,
            depth: self.depth,
            penalty: 0.0,
            is_first: false,
            indent_on_column: false,
        };
        self.set_folded(index, policy);
    }

    /// Folds leading comments into the break decision: the break moves
    /// before the comments, and a comment that sat on its own source
    /// line keeps the following token on a fresh line too.
    fn set_folded(&mut self, index: usize, policy: WrapPolicy) {
        let first = self.fold_start(index);
        if first > policy.parent {
            self.store.set_policy(first, policy);
        }
        for i in first..index {
            if self.store[i].kind.is_comment() && self.store[i + 1].original_breaks > 0 {
                let mut continued = policy;
                continued.is_first = false;
                self.store.set_policy(i + 1, continued);
            }
        }
    }

    fn fold_start(&self, index: usize) -> usize {
        let mut first = index;
        while first > 0 && self.store[first - 1].kind.is_comment() {
            // A comment with its own fixed policy keeps it.
            if matches!(&self.store[first - 1].wrap, Some(p) if p.mode >= WrapMode::TopPriority) {
                break;
            }
            // A comment trailing code on its source line stays attached
            // to that code.
            if self.store[first - 1].original_breaks == 0 && first > 1 {
                break;
            }
            first -= 1;
        }
        first
    }

    /// Uniform reindentation of breaks already present inside a
    /// subtree (bare statement bodies).
    fn shift_range(&mut self, start: usize, end: usize, delta: isize) {
        for i in start..=end {
            self.store[i].indent_delta += delta;
        }
    }

    fn penalty(&self, base: f32) -> f32 {
        base * (1.0 + self.depth as f32)
    }
}
