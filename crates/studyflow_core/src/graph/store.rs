//! Editable graph store.
//!
//! # Responsibility
//! - Own the flat node map between edits.
//! - Offer create/delete/reorder/update operations that keep the map
//!   materializable.
//!
//! # Invariants
//! - Every edit checks the target's permitted actions first.
//! - A mutated child list is always spliced in the same edit that
//!   inserts/removes the node.
//! - Created ids are fresh: `<kind>_<8 hex>`, re-drawn on collision.

use crate::config::TitleLimits;
use crate::graph::node::{
    Node, NodeAction, NodeContent, NodeId, NodeMap, PROPERTIES_ID, STUDY_ID,
};
use crate::graph::{flatten_with, materialize, GraphError, GraphResult};
use crate::model::question::Question;
use crate::model::study::{ModuleHeader, ParamsContent, ParamsKind, SectionHeader, Study};
use crate::model::EntityKind;
use log::info;
use uuid::Uuid;

/// Flat node map plus the edit operations of the designer.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    nodes: NodeMap,
    limits: TitleLimits,
}

impl GraphStore {
    /// Flattens `study` into a new store with default title limits.
    pub fn from_study(study: &Study) -> GraphResult<Self> {
        Self::from_study_with(study, TitleLimits::default())
    }

    pub fn from_study_with(study: &Study, limits: TitleLimits) -> GraphResult<Self> {
        Ok(Self {
            nodes: flatten_with(study, &limits)?,
            limits,
        })
    }

    /// Read-only view of the node map.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Owned copy of the node map, safe to hand across edits.
    pub fn snapshot(&self) -> NodeMap {
        self.nodes.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolved children of `id` in list order.
    pub fn children_of(&self, id: &str) -> GraphResult<Vec<&Node>> {
        let node = self.require(id)?;
        node.child_ids()
            .iter()
            .map(|child_id| {
                self.nodes
                    .get(child_id)
                    .ok_or_else(|| GraphError::DanglingReference {
                        parent: node.id.clone(),
                        child: child_id.clone(),
                    })
            })
            .collect()
    }

    /// Rebuilds the hierarchical document.
    pub fn materialize(&self) -> GraphResult<Study> {
        materialize(&self.nodes)
    }

    /// Module payloads in study order. Unresolvable entries are skipped;
    /// `materialize` is the place that reports them.
    pub fn module_contents(&self) -> Vec<&ModuleHeader> {
        let Some(root) = self.nodes.get(STUDY_ID) else {
            return Vec::new();
        };
        root.child_ids()
            .iter()
            .filter_map(|id| match self.nodes.get(id).map(|node| &node.content) {
                Some(NodeContent::Module(header)) => Some(header),
                _ => None,
            })
            .collect()
    }

    /// `(id, name)` of every module, for selection lists.
    pub fn module_ids(&self) -> Vec<(NodeId, String)> {
        self.module_contents()
            .into_iter()
            .map(|header| (header.id.clone(), header.name.clone()))
            .collect()
    }

    /// `(id, text)` of every question in id order, for hide-condition lists.
    pub fn question_ids(&self) -> Vec<(NodeId, String)> {
        self.nodes
            .values()
            .filter_map(|node| match &node.content {
                NodeContent::Question(question) => Some((node.id.clone(), question.text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Creates the parent's declared child kind with designer defaults and
    /// appends it to the parent's list. Returns the new id.
    ///
    /// A new module also receives a fresh survey params child.
    pub fn create_child(&mut self, parent_id: &str) -> GraphResult<NodeId> {
        let parent = self.require_action(parent_id, NodeAction::Create)?;
        let child_kind = parent.child_kind;

        let id = match child_kind {
            Some(EntityKind::Module) => {
                let id = self.fresh_id(EntityKind::Module);
                let params_id = self.fresh_id(EntityKind::Params);
                self.attach(
                    parent_id,
                    id.clone(),
                    NodeContent::Module(ModuleHeader::new(id.clone())),
                    Some(vec![params_id.clone()]),
                )?;
                self.attach_params(&id, params_id, ParamsKind::Survey);
                id
            }
            Some(EntityKind::Section) => {
                let id = self.fresh_id(EntityKind::Section);
                self.attach(
                    parent_id,
                    id.clone(),
                    NodeContent::Section(SectionHeader::new(id.clone())),
                    Some(Vec::new()),
                )?;
                id
            }
            Some(EntityKind::Question) => {
                let id = self.fresh_id(EntityKind::Question);
                self.attach(
                    parent_id,
                    id.clone(),
                    NodeContent::Question(Question::new(id.clone())),
                    None,
                )?;
                id
            }
            _ => {
                return Err(GraphError::ActionNotPermitted {
                    id: parent_id.to_string(),
                    action: NodeAction::Create,
                })
            }
        };

        info!(
            "event=graph_create module=graph status=ok kind={} parent={} id={}",
            child_kind.map_or("none", EntityKind::as_str),
            parent_id,
            id
        );
        Ok(id)
    }

    /// Removes `id` and its whole subtree.
    pub fn delete(&mut self, id: &str) -> GraphResult<()> {
        let node = self.require_action(id, NodeAction::Delete)?;
        let parent_id = node.parent.clone();

        let removed = self.remove_subtree(id);
        if let Some(parent) = parent_id.and_then(|pid| self.nodes.get_mut(&pid)) {
            if let Some(children) = parent.children.as_mut() {
                children.retain(|child| child != id);
            }
        }

        info!(
            "event=graph_delete module=graph status=ok id={} removed={}",
            id, removed
        );
        Ok(())
    }

    /// Swaps `id` with its previous sibling. Returns `false` at the start.
    pub fn move_earlier(&mut self, id: &str) -> GraphResult<bool> {
        self.shift(id, NodeAction::Earlier)
    }

    /// Swaps `id` with its next sibling. Returns `false` at the end.
    pub fn move_later(&mut self, id: &str) -> GraphResult<bool> {
        self.shift(id, NodeAction::Later)
    }

    /// Replaces a node's payload. The map key stays the node id and the
    /// display title is regenerated.
    pub fn update_content(&mut self, id: &str, mut content: NodeContent) -> GraphResult<()> {
        let node = self.require(id)?;
        if node.kind != content.kind() {
            return Err(GraphError::KindMismatch {
                id: id.to_string(),
                expected: node.kind,
                actual: content.kind(),
            });
        }
        if let (NodeContent::Params(current), NodeContent::Params(next)) = (&node.content, &content)
        {
            if current.kind() != next.kind() {
                return Err(GraphError::ParamsVariantChange(id.to_string()));
            }
        }
        if let NodeContent::Properties(properties) = &mut content {
            if !properties.study_id.trim().is_empty() {
                properties.study_id = crate::graph::normalize_id(&properties.study_id)?;
            }
        }

        content.set_id(id);
        let title = content.title(&self.study_name(), &self.limits);
        if let Some(node) = self.nodes.get_mut(id) {
            node.content = content;
            node.title = title;
        }
        if id == PROPERTIES_ID {
            self.refresh_study_title();
        }
        Ok(())
    }

    /// Swaps the params of `module_id` for a fresh one of `kind`, discarding
    /// the previous params subtree. The params id is kept.
    pub fn replace_params(&mut self, module_id: &str, kind: ParamsKind) -> GraphResult<NodeId> {
        let module = self.require(module_id)?;
        if module.kind != EntityKind::Module {
            return Err(GraphError::KindMismatch {
                id: module_id.to_string(),
                expected: EntityKind::Module,
                actual: module.kind,
            });
        }

        let params_id = match module.child_ids().first() {
            Some(existing) => existing.clone(),
            None => self.fresh_id(EntityKind::Params),
        };
        self.remove_subtree(&params_id);
        if let Some(module) = self.nodes.get_mut(module_id) {
            module.children = Some(vec![params_id.clone()]);
        }
        self.attach_params(module_id, params_id.clone(), kind);

        info!(
            "event=graph_replace_params module=graph status=ok module_id={} params_id={}",
            module_id, params_id
        );
        Ok(params_id)
    }

    /// Sets the UI collapse flag.
    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        node.hidden = hidden;
        Ok(())
    }

    fn shift(&mut self, id: &str, action: NodeAction) -> GraphResult<bool> {
        let node = self.require_action(id, action)?;
        let parent_id = node
            .parent
            .clone()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let siblings = self
            .nodes
            .get_mut(&parent_id)
            .and_then(|parent| parent.children.as_mut())
            .ok_or_else(|| GraphError::NodeNotFound(parent_id.clone()))?;
        let index = siblings
            .iter()
            .position(|child| child == id)
            .ok_or_else(|| GraphError::DanglingReference {
                parent: parent_id.clone(),
                child: id.to_string(),
            })?;

        let target = match action {
            NodeAction::Earlier if index > 0 => index - 1,
            NodeAction::Later if index + 1 < siblings.len() => index + 1,
            _ => return Ok(false),
        };
        siblings.swap(index, target);
        Ok(true)
    }

    fn attach(
        &mut self,
        parent_id: &str,
        id: NodeId,
        content: NodeContent,
        children: Option<Vec<NodeId>>,
    ) -> GraphResult<()> {
        let title = content.title(&self.study_name(), &self.limits);
        let node = Node::new(id.clone(), Some(parent_id.to_string()), content, children, title);
        let parent = self
            .nodes
            .get_mut(parent_id)
            .ok_or_else(|| GraphError::NodeNotFound(parent_id.to_string()))?;
        parent.children.get_or_insert_with(Vec::new).push(id.clone());
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Inserts a params node; the caller has already listed it on the module.
    fn attach_params(&mut self, module_id: &str, id: NodeId, kind: ParamsKind) {
        let content = NodeContent::Params(ParamsContent::new(kind, id.clone()));
        let children = match kind {
            ParamsKind::Survey => Some(Vec::new()),
            ParamsKind::Pvt => None,
        };
        let title = content.title(&self.study_name(), &self.limits);
        let node = Node::new(id.clone(), Some(module_id.to_string()), content, children, title);
        self.nodes.insert(id, node);
    }

    fn remove_subtree(&mut self, id: &str) -> usize {
        let mut stack = vec![id.to_string()];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.child_ids().iter().cloned());
                removed += 1;
            }
        }
        removed
    }

    fn fresh_id(&self, kind: EntityKind) -> NodeId {
        loop {
            let token = Uuid::new_v4().simple().to_string();
            let candidate = format!("{}_{}", kind.as_str(), &token[..8]);
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn require(&self, id: &str) -> GraphResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    fn require_action(&self, id: &str, action: NodeAction) -> GraphResult<&Node> {
        let node = self.require(id)?;
        if !node.permits(action) {
            return Err(GraphError::ActionNotPermitted {
                id: id.to_string(),
                action,
            });
        }
        Ok(node)
    }

    fn study_name(&self) -> String {
        match self.nodes.get(PROPERTIES_ID).map(|node| &node.content) {
            Some(NodeContent::Properties(properties)) => properties.study_name.clone(),
            _ => String::new(),
        }
    }

    fn refresh_study_title(&mut self) {
        let name = self.study_name();
        if let Some(root) = self.nodes.get_mut(STUDY_ID) {
            root.title = name;
        }
    }
}
