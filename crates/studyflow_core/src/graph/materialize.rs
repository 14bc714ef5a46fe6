//! Node map → document.
//!
//! Guarded tree walk from [`STUDY_ID`]: every child id must resolve, point
//! back at its parent, fit a slot the parent declares, and be visited once.

use crate::graph::node::{Node, NodeContent, NodeId, NodeMap, STUDY_ID};
use crate::graph::{GraphError, GraphResult};
use crate::model::question::Question;
use crate::model::study::{Module, Params, Properties, Section, Study};
use crate::model::EntityKind;
use log::warn;
use std::collections::HashSet;

/// Rebuilds the hierarchical document from `nodes`.
///
/// # Errors
/// - `GraphError::MissingNode` when the study root is absent.
/// - `GraphError::DanglingReference` for unresolved child ids.
/// - `GraphError::MissingSlot` / `UnexpectedChild` / `ParentMismatch` /
///   `Cycle` for structurally invalid maps.
pub fn materialize(nodes: &NodeMap) -> GraphResult<Study> {
    let mut walker = Walker {
        nodes,
        visited: HashSet::new(),
    };
    walker.study().map_err(|err| {
        warn!(
            "event=graph_materialize module=graph status=error error_code={}",
            err.code()
        );
        err
    })
}

struct Walker<'a> {
    nodes: &'a NodeMap,
    visited: HashSet<&'a str>,
}

impl<'a> Walker<'a> {
    fn study(&mut self) -> GraphResult<Study> {
        let root = self
            .nodes
            .get(STUDY_ID)
            .ok_or_else(|| GraphError::MissingNode(STUDY_ID.to_string()))?;
        self.visited.insert(STUDY_ID);
        let NodeContent::Study(header) = &root.content else {
            return Err(GraphError::KindMismatch {
                id: STUDY_ID.to_string(),
                expected: EntityKind::Study,
                actual: root.content.kind(),
            });
        };

        let mut properties: Option<Properties> = None;
        let mut modules = Vec::new();
        for child_id in root.child_ids() {
            let child = self.enter(root, child_id)?;
            match &child.content {
                NodeContent::Properties(value) if properties.is_none() => {
                    properties = Some(value.clone());
                }
                NodeContent::Module(_) => modules.push(self.module(child)?),
                other => return Err(unexpected(root, child_id, other.kind())),
            }
        }

        let properties = properties.ok_or_else(|| GraphError::MissingSlot {
            parent: STUDY_ID.to_string(),
            slot: EntityKind::Properties,
        })?;
        Ok(Study::from_parts(header.clone(), properties, modules))
    }

    fn module(&mut self, node: &'a Node) -> GraphResult<Module> {
        let NodeContent::Module(header) = &node.content else {
            return Err(mismatch(node, EntityKind::Module));
        };

        let mut params: Option<Params> = None;
        for child_id in node.child_ids() {
            let child = self.enter(node, child_id)?;
            match &child.content {
                NodeContent::Params(_) if params.is_none() => params = Some(self.params(child)?),
                other => return Err(unexpected(node, child_id, other.kind())),
            }
        }

        let params = params.ok_or_else(|| GraphError::MissingSlot {
            parent: node.id.clone(),
            slot: EntityKind::Params,
        })?;
        Ok(Module::from_parts(header.clone(), params))
    }

    fn params(&mut self, node: &'a Node) -> GraphResult<Params> {
        let NodeContent::Params(content) = &node.content else {
            return Err(mismatch(node, EntityKind::Params));
        };

        let mut sections = Vec::new();
        for child_id in node.child_ids() {
            let child = self.enter(node, child_id)?;
            match (&node.child_kind, &child.content) {
                (Some(EntityKind::Section), NodeContent::Section(_)) => {
                    sections.push(self.section(child)?)
                }
                (_, other) => return Err(unexpected(node, child_id, other.kind())),
            }
        }
        Ok(content.clone().into_params(sections))
    }

    fn section(&mut self, node: &'a Node) -> GraphResult<Section> {
        let NodeContent::Section(header) = &node.content else {
            return Err(mismatch(node, EntityKind::Section));
        };

        let mut questions = Vec::new();
        for child_id in node.child_ids() {
            let child = self.enter(node, child_id)?;
            match &child.content {
                NodeContent::Question(_) => questions.push(self.question(child)?),
                other => return Err(unexpected(node, child_id, other.kind())),
            }
        }
        Ok(Section::from_parts(header.clone(), questions))
    }

    fn question(&mut self, node: &'a Node) -> GraphResult<Question> {
        if let Some(child_id) = node.child_ids().first() {
            return Err(GraphError::UnexpectedChild {
                parent: node.id.clone(),
                child: child_id.clone(),
                kind: self
                    .nodes
                    .get(child_id)
                    .map_or(EntityKind::Question, |child| child.kind),
            });
        }
        match &node.content {
            NodeContent::Question(question) => Ok(question.clone()),
            _ => Err(mismatch(node, EntityKind::Question)),
        }
    }

    /// Resolves one child reference and marks it visited.
    fn enter(&mut self, parent: &Node, child_id: &NodeId) -> GraphResult<&'a Node> {
        let child = self
            .nodes
            .get(child_id)
            .ok_or_else(|| GraphError::DanglingReference {
                parent: parent.id.clone(),
                child: child_id.clone(),
            })?;
        if child.parent.as_deref() != Some(parent.id.as_str()) {
            return Err(GraphError::ParentMismatch {
                child: child_id.clone(),
                expected: parent.id.clone(),
                actual: child.parent.clone(),
            });
        }
        if !self.visited.insert(child.id.as_str()) {
            return Err(GraphError::Cycle(child_id.clone()));
        }
        Ok(child)
    }
}

fn unexpected(parent: &Node, child: &NodeId, kind: EntityKind) -> GraphError {
    GraphError::UnexpectedChild {
        parent: parent.id.clone(),
        child: child.clone(),
        kind,
    }
}

fn mismatch(node: &Node, expected: EntityKind) -> GraphError {
    GraphError::KindMismatch {
        id: node.id.clone(),
        expected,
        actual: node.content.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::materialize;
    use crate::graph::{flatten, GraphError, STUDY_ID};
    use crate::model::study::{Module, ModuleHeader, Params, Pvt, Study};

    fn study_with_pvt() -> Study {
        let mut study = Study::new();
        study.modules.push(Module::from_parts(
            ModuleHeader::new("reaction"),
            Params::Pvt(Pvt {
                id: "pvt1".to_string(),
                trials: 5,
                ..Pvt::default()
            }),
        ));
        study
    }

    #[test]
    fn missing_root_is_reported() {
        let mut nodes = flatten(&study_with_pvt()).unwrap();
        nodes.remove(STUDY_ID);
        assert_eq!(
            materialize(&nodes).unwrap_err(),
            GraphError::MissingNode(STUDY_ID.to_string())
        );
    }

    #[test]
    fn module_without_params_is_a_missing_slot() {
        let mut nodes = flatten(&study_with_pvt()).unwrap();
        nodes.remove("pvt1");
        nodes.get_mut("reaction").unwrap().children = Some(Vec::new());

        assert!(matches!(
            materialize(&nodes).unwrap_err(),
            GraphError::MissingSlot { parent, .. } if parent == "reaction"
        ));
    }

    #[test]
    fn node_listed_twice_is_a_cycle() {
        let mut nodes = flatten(&study_with_pvt()).unwrap();
        nodes
            .get_mut(STUDY_ID)
            .unwrap()
            .children
            .as_mut()
            .unwrap()
            .push("reaction".to_string());

        assert_eq!(
            materialize(&nodes).unwrap_err(),
            GraphError::Cycle("reaction".to_string())
        );
    }
}
