use super::token::Token;
use super::typedesc::TypeDescriptor;
use crate::error::Error;
use la_arena::{Arena, Idx};
use std::fmt::Write;

pub type NodeId<'a> = Idx<Node<'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,      // "+"
    Sub,      // "-"
    Mul,      // "*"
    Assign,   // "="
    LogicAnd, // "&&"
    LogicOr,  // "||"
    CmpEq,    // "=="
    CmpNeq,   // "!="
    CmpLt,    // "<"
    CmpGt,    // ">"
    CmpLe,    // "<="
    CmpGe,    // ">="
}

impl BinaryOp {
    pub fn precedence(self) -> u16 {
        match self {
            BinaryOp::Assign => 1,
            BinaryOp::LogicOr => 3,
            BinaryOp::LogicAnd => 4,
            BinaryOp::CmpEq | BinaryOp::CmpNeq => 8,
            BinaryOp::CmpLt | BinaryOp::CmpGt | BinaryOp::CmpLe | BinaryOp::CmpGe => 9,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Mul => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mul => "Mul",
            BinaryOp::Assign => "Assign",
            BinaryOp::LogicAnd => "LogicAnd",
            BinaryOp::LogicOr => "LogicOr",
            BinaryOp::CmpEq => "CmpEq",
            BinaryOp::CmpNeq => "CmpNeq",
            BinaryOp::CmpLt => "CmpLt",
            BinaryOp::CmpGt => "CmpGt",
            BinaryOp::CmpLe => "CmpLe",
            BinaryOp::CmpGe => "CmpGe",
        }
    }
}

const LEAF: u16 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    VarDecl(TypeDescriptor<'a>, &'a Token),
    Binary(BinaryOp),
    Ref,
    Deref,
    Cast(TypeDescriptor<'a>),
    Var(&'a Token),
    Number(&'a Token),
    String(&'a Token),
    FuncCall(&'a Token),
    Comma,
    Function(&'a Token, TypeDescriptor<'a>),
    ExpSeq,
    Branch,
    If,
    While,
    Return,
    Break,
    Continue,
    True,
    False,
    Null,
}

impl NodeKind<'_> {
    /// Higher binds tighter
    pub fn precedence(&self) -> u16 {
        match self {
            NodeKind::Comma => 0,
            NodeKind::Binary(op) => op.precedence(),
            NodeKind::Ref | NodeKind::Deref | NodeKind::Cast(_) => 13,
            NodeKind::FuncCall(_) => 14,
            NodeKind::Var(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::VarDecl(..)
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::Break
            | NodeKind::Continue => LEAF,
            NodeKind::Function(..)
            | NodeKind::ExpSeq
            | NodeKind::Branch
            | NodeKind::If
            | NodeKind::While
            | NodeKind::Return => 0,
        }
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, NodeKind::Ref | NodeKind::Deref | NodeKind::Cast(_))
    }

    pub fn right_assoc(&self) -> bool {
        self.is_prefix() || matches!(self, NodeKind::Binary(BinaryOp::Assign))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::VarDecl(..) => "VarDecl",
            NodeKind::Binary(op) => op.name(),
            NodeKind::Ref => "Ref",
            NodeKind::Deref => "Deref",
            NodeKind::Cast(_) => "Cast",
            NodeKind::Var(_) => "Var",
            NodeKind::Number(_) => "Number",
            NodeKind::String(_) => "String",
            NodeKind::FuncCall(_) => "FuncCall",
            NodeKind::Comma => "Comma",
            NodeKind::Function(..) => "Function",
            NodeKind::ExpSeq => "ExpSeq",
            NodeKind::Branch => "Branch",
            NodeKind::If => "If",
            NodeKind::While => "While",
            NodeKind::Return => "Return",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::True => "True",
            NodeKind::False => "False",
            NodeKind::Null => "Null",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    /// Token the node was built from
    pub token: Option<&'a Token>,
    pub left: Option<NodeId<'a>>,
    pub right: Option<NodeId<'a>>,
    pub parent: Option<NodeId<'a>>,
    pub sealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Node arena of one expression, statement list or function
#[derive(Debug, Default)]
pub struct Ast<'a> {
    nodes: Arena<Node<'a>>,
    pub root: Option<NodeId<'a>>,
}

impl<'a> std::ops::Index<NodeId<'a>> for Ast<'a> {
    type Output = Node<'a>;
    fn index(&self, id: NodeId<'a>) -> &Node<'a> {
        &self.nodes[id]
    }
}

impl<'a> Ast<'a> {
    pub fn new() -> Self {
        Ast {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn alloc(&mut self, kind: NodeKind<'a>, token: Option<&'a Token>) -> NodeId<'a> {
        self.nodes.alloc(Node {
            kind,
            token,
            left: None,
            right: None,
            parent: None,
            sealed: false,
        })
    }

    /// Freeze the shape of a parenthesized subtree
    pub fn seal(&mut self, id: NodeId<'a>) {
        self.nodes[id].sealed = true;
    }

    /// Hang `child` under `parent` without looking at precedence
    pub fn link(&mut self, parent: NodeId<'a>, side: Side, child: Option<NodeId<'a>>) {
        match side {
            Side::Left => self.nodes[parent].left = child,
            Side::Right => self.nodes[parent].right = child,
        }
        if let Some(child) = child {
            self.nodes[child].parent = Some(parent);
        }
    }

    /// Build `kind` with the given children in one step
    pub fn branch(
        &mut self,
        kind: NodeKind<'a>,
        token: Option<&'a Token>,
        left: Option<NodeId<'a>>,
        right: Option<NodeId<'a>>,
    ) -> NodeId<'a> {
        let id = self.alloc(kind, token);
        self.link(id, Side::Left, left);
        self.link(id, Side::Right, right);
        id
    }

    /// A sealed subtree is finished and ranks as a leaf
    fn rank(&self, id: NodeId<'a>) -> u16 {
        let node = &self.nodes[id];
        if node.sealed {
            LEAF
        } else {
            node.kind.precedence()
        }
    }

    fn descends(&self, node: NodeId<'a>, leaf: NodeId<'a>) -> bool {
        let (upper, lower) = (self.rank(node), self.rank(leaf));
        let leaf = &self.nodes[leaf];
        upper < lower || (upper == lower && !leaf.sealed && leaf.kind.right_assoc())
    }

    fn attach(&mut self, parent: NodeId<'a>, child: NodeId<'a>) -> Result<(), Error> {
        let node = &self.nodes[parent];
        if node.sealed {
            return Err(Error::SealedCollision);
        }
        let side = if node.kind.is_prefix() || node.left.is_some() {
            Side::Right
        } else {
            Side::Left
        };
        let occupied = match side {
            Side::Left => node.left.is_some(),
            Side::Right => node.right.is_some(),
        };
        if occupied {
            return Err(Error::SlotOccupied);
        }
        self.link(parent, side, Some(child));
        Ok(())
    }

    /// Insert one leaf into the tree rooted at `root` and return the new root
    pub fn insert(
        &mut self,
        root: Option<NodeId<'a>>,
        leaf: NodeId<'a>,
    ) -> Result<NodeId<'a>, Error> {
        tracing::debug!(
            leaf = self.nodes[leaf].kind.name(),
            sealed = self.nodes[leaf].sealed,
            "insert"
        );
        let Some(root) = root else {
            self.nodes[leaf].parent = None;
            return Ok(leaf);
        };

        // Walk down the right spine
        let mut cur = root;
        loop {
            let node = &self.nodes[cur];
            match node.right {
                Some(right) if !node.sealed && self.descends(cur, leaf) => cur = right,
                _ => break,
            }
        }

        if self.nodes[leaf].sealed || (!self.nodes[cur].sealed && self.descends(cur, leaf)) {
            self.attach(cur, leaf)?;
            return Ok(root);
        }

        // The leaf takes over the position of `cur`
        if self.nodes[leaf].left.is_some() {
            return Err(Error::SlotOccupied);
        }
        let parent = self.nodes[cur].parent;
        self.nodes[leaf].left = Some(cur);
        self.nodes[leaf].parent = parent;
        self.nodes[cur].parent = Some(leaf);
        match parent {
            Some(parent) => {
                self.nodes[parent].right = Some(leaf);
                Ok(root)
            }
            None => Ok(leaf),
        }
    }

    /// Short label of a node
    pub fn label(&self, id: NodeId<'a>) -> String {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::VarDecl(ty, name) => format!("VarDecl {} {}", ty, name.text),
            NodeKind::Cast(ty) => format!("Cast {}", ty),
            NodeKind::Var(tok) | NodeKind::Number(tok) | NodeKind::String(tok) => {
                format!("{} {}", node.kind.name(), tok.text)
            }
            NodeKind::FuncCall(name) => format!("FuncCall {}", name.text),
            NodeKind::Function(name, ty) => format!("Function {} {}", name.text, ty),
            kind => kind.name().to_string(),
        }
    }

    /// Indented outline of the tree, one node per line
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.pretty_node(root, 0, &mut out);
        }
        out
    }

    fn pretty_node(&self, id: NodeId<'a>, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        let sealed = if node.sealed { " ()" } else { "" };
        let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), self.label(id), sealed);
        for child in [node.left, node.right].into_iter().flatten() {
            self.pretty_node(child, depth + 1, out);
        }
    }

    /// Compact s-expression form: `(Add a (Mul b c))`
    pub fn sexpr(&self, id: NodeId<'a>) -> String {
        let node = &self.nodes[id];
        let head = match &node.kind {
            NodeKind::Var(tok) | NodeKind::Number(tok) | NodeKind::String(tok) => {
                tok.text.clone()
            }
            NodeKind::VarDecl(ty, name) => format!("{}:{}", name.text, ty),
            NodeKind::True => "true".to_string(),
            NodeKind::False => "false".to_string(),
            NodeKind::Null => "null".to_string(),
            _ => self.label(id),
        };
        let children: Vec<String> = [node.left, node.right]
            .into_iter()
            .flatten()
            .map(|child| self.sexpr(child))
            .collect();
        if children.is_empty() && node.kind.precedence() == LEAF {
            head
        } else if children.is_empty() {
            format!("({})", head)
        } else {
            format!("({} {})", head, children.join(" "))
        }
    }
}
