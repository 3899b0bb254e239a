//! Cross-cutting value types shared by every component.

pub mod ids;
pub mod span;

pub use ids::{BlockId, CfgId, EdgeId, IdAllocator, NodeId};
pub use span::{Location, Span};
