//! Top-level program entries (spec §3.3): functions, contracts, traits,
//! constants, structs, messages, primitives, native declarations.

use super::stmt::StmtId;
use crate::common::{NodeId, Span};

pub type EntryId = NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveKind {
    /// Receives a specific message struct type.
    Message,
    /// Receives a literal string selector.
    StringLiteral,
    /// The generic text-message / comment receiver.
    Comment,
    Empty,
    Bounced,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub body: Vec<StmtId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReceiveDef {
    pub kind: ReceiveKind,
    /// For `Message`, the struct/message type name; for `StringLiteral`,
    /// the literal text.
    pub selector: Option<String>,
    pub body: Vec<StmtId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ProgramEntry {
    Function {
        id: EntryId,
        name: String,
        body: Vec<StmtId>,
        span: Span,
    },
    Contract {
        id: EntryId,
        name: String,
        methods: Vec<MethodDef>,
        receivers: Vec<ReceiveDef>,
        span: Span,
    },
    Trait {
        id: EntryId,
        name: String,
        span: Span,
    },
    Constant {
        id: EntryId,
        name: String,
        span: Span,
    },
    Struct {
        id: EntryId,
        name: String,
        span: Span,
    },
    Message {
        id: EntryId,
        name: String,
        span: Span,
    },
    Primitive {
        id: EntryId,
        name: String,
        span: Span,
    },
    Native {
        id: EntryId,
        name: String,
        span: Span,
    },
}

impl ProgramEntry {
    pub fn id(&self) -> EntryId {
        match self {
            ProgramEntry::Function { id, .. }
            | ProgramEntry::Contract { id, .. }
            | ProgramEntry::Trait { id, .. }
            | ProgramEntry::Constant { id, .. }
            | ProgramEntry::Struct { id, .. }
            | ProgramEntry::Message { id, .. }
            | ProgramEntry::Primitive { id, .. }
            | ProgramEntry::Native { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProgramEntry::Function { name, .. }
            | ProgramEntry::Contract { name, .. }
            | ProgramEntry::Trait { name, .. }
            | ProgramEntry::Constant { name, .. }
            | ProgramEntry::Struct { name, .. }
            | ProgramEntry::Message { name, .. }
            | ProgramEntry::Primitive { name, .. }
            | ProgramEntry::Native { name, .. } => name,
        }
    }
}
