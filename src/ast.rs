//! The node taxonomy the engine understands. Nodes are produced by an
//! external parser and reference tokens by index only; `start` and `end`
//! bracket the node's code tokens (inclusive).

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
}

impl Node {
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Unit { .. } => "unit",
            NodeKind::TypeDecl { .. } => "type declaration",
            NodeKind::MethodDecl { .. } => "method declaration",
            NodeKind::Block { .. } => "block",
            NodeKind::If { .. } => "if statement",
            NodeKind::While { .. } => "while statement",
            NodeKind::Return { .. } => "return statement",
            NodeKind::LocalDecl { .. } => "local declaration",
            NodeKind::ExprStmt { .. } => "expression statement",
            NodeKind::Invocation { .. } => "invocation",
            NodeKind::FieldAccess { .. } => "field access",
            NodeKind::Infix { .. } => "infix expression",
            NodeKind::Prefix { .. } => "prefix expression",
            NodeKind::Paren { .. } => "parenthesized expression",
            NodeKind::Lambda { .. } => "lambda",
            NodeKind::Atom => "atom",
            NodeKind::Malformed => "malformed",
        }
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Unit {
        decls: Vec<Node>,
    },
    TypeDecl {
        extends_kw: Option<usize>,
        implements_kw: Option<usize>,
        supers: Vec<Node>,
        open_brace: usize,
        close_brace: usize,
        members: Vec<Node>,
    },
    MethodDecl {
        lparen: usize,
        rparen: usize,
        params: Vec<Node>,
        body: Box<Node>,
    },
    Block {
        open_brace: usize,
        close_brace: usize,
        statements: Vec<Node>,
    },
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_kw: Option<usize>,
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    LocalDecl {
        name: usize,
        eq: Option<usize>,
        value: Option<Box<Node>>,
    },
    ExprStmt {
        expr: Box<Node>,
    },
    Invocation {
        callee: Box<Node>,
        lparen: usize,
        rparen: usize,
        args: Vec<Node>,
    },
    FieldAccess {
        receiver: Box<Node>,
        dot: usize,
        name: usize,
    },
    /// Strictly binary; the preparator flattens equal-precedence chains
    /// into one wrap group.
    Infix {
        op: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
    Prefix {
        op: usize,
        operand: Box<Node>,
    },
    Paren {
        lparen: usize,
        rparen: usize,
        inner: Box<Node>,
    },
    Lambda {
        arrow: usize,
        body: Box<Node>,
    },
    /// Identifier, literal or other single-token leaf.
    Atom,
    /// Subtree flagged malformed by the parser; its token range is
    /// excluded from formatting.
    Malformed,
}
