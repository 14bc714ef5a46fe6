//! Entity graph store: flat, id-addressed view of a study document.
//!
//! # Responsibility
//! - Flatten a hierarchical [`Study`](crate::model::study::Study) into a
//!   map of [`Node`]s and materialize it back.
//! - Apply editor mutations (create/delete/reorder/update) on the map.
//!
//! # Invariants
//! - Node ids are unique and match `[a-z0-9_]+`.
//! - Every `children` entry resolves to an existing node whose `parent`
//!   points back at the owner.
//! - Structural errors are surfaced, never repaired.

pub mod flatten;
pub mod materialize;
pub mod node;
pub mod store;

use crate::model::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use flatten::{flatten, flatten_with};
pub use materialize::materialize;
pub use node::{
    normalize_id, Node, NodeAction, NodeContent, NodeId, NodeMap, PROPERTIES_ID, STUDY_ID,
};
pub use store::GraphStore;

/// Result type used by graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Structural and edit errors of the entity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Raw id normalizes to an empty string.
    InvalidId(String),
    /// Two entities share one normalized id.
    IdConflict(NodeId),
    /// Required root node is absent.
    MissingNode(NodeId),
    /// A `children` entry has no matching node.
    DanglingReference { parent: NodeId, child: NodeId },
    /// A single-valued slot has no child.
    MissingSlot { parent: NodeId, slot: EntityKind },
    /// A child is not accepted by the parent's declared slots.
    UnexpectedChild {
        parent: NodeId,
        child: NodeId,
        kind: EntityKind,
    },
    /// A child's `parent` does not point back at its owner.
    ParentMismatch {
        child: NodeId,
        expected: NodeId,
        actual: Option<NodeId>,
    },
    /// A node is reachable twice during materialization.
    Cycle(NodeId),
    /// Edit target does not exist.
    NodeNotFound(NodeId),
    /// Edit is not in the node's permitted actions.
    ActionNotPermitted { id: NodeId, action: NodeAction },
    /// Replacement content has a different entity kind.
    KindMismatch {
        id: NodeId,
        expected: EntityKind,
        actual: EntityKind,
    },
    /// Content update tried to switch survey/pvt; use `replace_params`.
    ParamsVariantChange(NodeId),
}

impl GraphError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "invalid_id",
            Self::IdConflict(_) => "id_conflict",
            Self::MissingNode(_) => "missing_node",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::MissingSlot { .. } => "missing_slot",
            Self::UnexpectedChild { .. } => "unexpected_child",
            Self::ParentMismatch { .. } => "parent_mismatch",
            Self::Cycle(_) => "cycle",
            Self::NodeNotFound(_) => "node_not_found",
            Self::ActionNotPermitted { .. } => "action_not_permitted",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::ParamsVariantChange(_) => "params_variant_change",
        }
    }
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(raw) => write!(f, "id `{raw}` is empty after normalization"),
            Self::IdConflict(id) => write!(f, "duplicate node id `{id}`"),
            Self::MissingNode(id) => write!(f, "required node `{id}` is missing"),
            Self::DanglingReference { parent, child } => {
                write!(f, "node `{parent}` references missing child `{child}`")
            }
            Self::MissingSlot { parent, slot } => {
                write!(f, "node `{parent}` has no {slot} child")
            }
            Self::UnexpectedChild {
                parent,
                child,
                kind,
            } => write!(
                f,
                "node `{parent}` cannot hold {kind} child `{child}`"
            ),
            Self::ParentMismatch {
                child,
                expected,
                actual,
            } => write!(
                f,
                "node `{child}` is listed under `{expected}` but points at `{}`",
                actual.as_deref().unwrap_or("<none>")
            ),
            Self::Cycle(id) => write!(f, "node `{id}` is reachable more than once"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ActionNotPermitted { id, action } => {
                write!(f, "action `{}` is not permitted on node `{id}`", action.as_str())
            }
            Self::KindMismatch {
                id,
                expected,
                actual,
            } => write!(f, "node `{id}` holds {expected} content, got {actual}"),
            Self::ParamsVariantChange(id) => write!(
                f,
                "params node `{id}` cannot change type through a content update"
            ),
        }
    }
}

impl Error for GraphError {}
