//! Graph node record and per-kind metadata.
//!
//! # Invariants
//! - `content` never holds nested collections.
//! - `title`, `actions` and `hidden` are display fields; they are derived
//!   from content and never read back into the document.

use crate::config::TitleLimits;
use crate::graph::{GraphError, GraphResult};
use crate::model::question::Question;
use crate::model::study::{ModuleHeader, ParamsContent, Properties, SectionHeader, StudyHeader};
use crate::model::EntityKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Normalized node identifier.
pub type NodeId = String;

/// Flat node map keyed by normalized id.
pub type NodeMap = BTreeMap<NodeId, Node>;

/// Fixed id of the root node.
pub const STUDY_ID: &str = "study";
/// Fixed id of the study properties node.
pub const PROPERTIES_ID: &str = "properties";

static INVALID_ID_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("valid id regex"));

/// Lowercases `raw` and strips every character outside `[a-z0-9_]`.
///
/// # Errors
/// - Returns `GraphError::InvalidId` when nothing remains.
pub fn normalize_id(raw: &str) -> GraphResult<NodeId> {
    let lowered = raw.to_lowercase();
    let normalized = INVALID_ID_CHARS_RE.replace_all(&lowered, "").into_owned();
    if normalized.is_empty() {
        return Err(GraphError::InvalidId(raw.to_string()));
    }
    Ok(normalized)
}

/// Editor actions a node may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Create,
    Delete,
    Earlier,
    Later,
}

impl NodeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Earlier => "earlier",
            Self::Later => "later",
        }
    }
}

/// Node payload: the entity's own fields with children stripped.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Study(StudyHeader),
    Properties(Properties),
    Module(ModuleHeader),
    Params(ParamsContent),
    Section(SectionHeader),
    Question(Question),
}

impl NodeContent {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Study(_) => EntityKind::Study,
            Self::Properties(_) => EntityKind::Properties,
            Self::Module(_) => EntityKind::Module,
            Self::Params(_) => EntityKind::Params,
            Self::Section(_) => EntityKind::Section,
            Self::Question(_) => EntityKind::Question,
        }
    }

    /// Kind accepted by this node's list/single child slot.
    pub fn child_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Study(_) => Some(EntityKind::Module),
            Self::Module(_) => Some(EntityKind::Params),
            Self::Params(ParamsContent::Survey(_)) => Some(EntityKind::Section),
            Self::Section(_) => Some(EntityKind::Question),
            Self::Params(ParamsContent::Pvt(_)) | Self::Properties(_) | Self::Question(_) => {
                None
            }
        }
    }

    /// Editor actions offered for this node.
    pub fn permitted_actions(&self) -> Vec<NodeAction> {
        match self {
            Self::Study(_) => vec![NodeAction::Create],
            Self::Properties(_) => Vec::new(),
            Self::Module(_) => vec![NodeAction::Delete],
            Self::Params(ParamsContent::Survey(_)) => vec![NodeAction::Create],
            Self::Params(ParamsContent::Pvt(_)) => Vec::new(),
            Self::Section(_) => vec![
                NodeAction::Create,
                NodeAction::Delete,
                NodeAction::Earlier,
                NodeAction::Later,
            ],
            Self::Question(_) => vec![NodeAction::Delete, NodeAction::Earlier, NodeAction::Later],
        }
    }

    /// Writes the map key back into the payload's own id field.
    pub(crate) fn set_id(&mut self, id: &str) {
        match self {
            Self::Study(_) | Self::Properties(_) => {}
            Self::Module(header) => header.id = id.to_string(),
            Self::Params(params) => params.set_id(id),
            Self::Section(header) => header.id = id.to_string(),
            Self::Question(question) => question.id = id.to_string(),
        }
    }

    /// Display title. The study node is titled by `study_name`, which lives
    /// on the properties node, so callers pass it in.
    pub(crate) fn title(&self, study_name: &str, limits: &TitleLimits) -> String {
        match self {
            Self::Study(_) => study_name.to_string(),
            Self::Properties(_) => "Properties".to_string(),
            Self::Module(header) => truncate(&header.name, limits.name_chars),
            Self::Params(ParamsContent::Survey(_)) => "Survey".to_string(),
            Self::Params(ParamsContent::Pvt(_)) => "PVT".to_string(),
            Self::Section(header) => truncate(&header.name, limits.name_chars),
            Self::Question(question) => truncate(&question.text, limits.question_chars),
        }
    }
}

/// One addressable entity in the flat map.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Ordered child ids; `None` for kinds without a child slot.
    pub children: Option<Vec<NodeId>>,
    pub kind: EntityKind,
    pub child_kind: Option<EntityKind>,
    pub content: NodeContent,
    pub title: String,
    pub actions: Vec<NodeAction>,
    pub hidden: bool,
}

impl Node {
    /// Builds a node and derives its display fields from `content`.
    pub(crate) fn new(
        id: NodeId,
        parent: Option<NodeId>,
        mut content: NodeContent,
        children: Option<Vec<NodeId>>,
        title: String,
    ) -> Self {
        content.set_id(&id);
        Self {
            kind: content.kind(),
            child_kind: content.child_kind(),
            actions: content.permitted_actions(),
            id,
            parent,
            children,
            content,
            title,
            hidden: false,
        }
    }

    pub fn permits(&self, action: NodeAction) -> bool {
        self.actions.contains(&action)
    }

    /// Child ids, empty for leaf kinds.
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
