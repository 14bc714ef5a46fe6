//! Document → node map.
//!
//! Depth-first walk that assigns every entity its normalized id, records
//! ordered child-id lists, and strips nested collections from content.

use crate::config::TitleLimits;
use crate::graph::node::{normalize_id, Node, NodeContent, NodeId, NodeMap, PROPERTIES_ID, STUDY_ID};
use crate::graph::{GraphError, GraphResult};
use crate::model::question::Question;
use crate::model::study::{Module, Params, ParamsContent, Section, Study};
use log::{debug, warn};

/// Flattens `study` with default title limits.
///
/// # Errors
/// - `GraphError::InvalidId` when an id normalizes to nothing.
/// - `GraphError::IdConflict` when two entities normalize to one id.
pub fn flatten(study: &Study) -> GraphResult<NodeMap> {
    flatten_with(study, &TitleLimits::default())
}

/// Flattens `study` using explicit title limits.
pub fn flatten_with(study: &Study, limits: &TitleLimits) -> GraphResult<NodeMap> {
    let mut flattener = Flattener {
        nodes: NodeMap::new(),
        limits,
        study_name: study.properties.study_name.clone(),
    };

    match flattener.study(study.clone()) {
        Ok(()) => {
            debug!(
                "event=graph_flatten module=graph status=ok nodes={}",
                flattener.nodes.len()
            );
            Ok(flattener.nodes)
        }
        Err(err) => {
            warn!(
                "event=graph_flatten module=graph status=error error_code={}",
                err.code()
            );
            Err(err)
        }
    }
}

struct Flattener<'a> {
    nodes: NodeMap,
    limits: &'a TitleLimits,
    study_name: String,
}

impl Flattener<'_> {
    fn study(&mut self, study: Study) -> GraphResult<()> {
        let (header, mut properties, modules) = study.into_parts();
        properties.study_id = normalize_optional_id(&properties.study_id)?;

        let module_ids = modules
            .iter()
            .map(|module| normalize_id(&module.header.id))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut children = Vec::with_capacity(module_ids.len() + 1);
        children.push(PROPERTIES_ID.to_string());
        children.extend(module_ids.iter().cloned());

        self.insert(STUDY_ID.to_string(), None, NodeContent::Study(header), Some(children))?;
        self.insert(
            PROPERTIES_ID.to_string(),
            Some(STUDY_ID.to_string()),
            NodeContent::Properties(properties),
            None,
        )?;

        for (module, id) in modules.into_iter().zip(module_ids) {
            self.module(module, id)?;
        }
        Ok(())
    }

    fn module(&mut self, module: Module, id: NodeId) -> GraphResult<()> {
        let (header, params) = module.into_parts();
        let params_id = normalize_id(params.id())?;
        self.insert(
            id.clone(),
            Some(STUDY_ID.to_string()),
            NodeContent::Module(header),
            Some(vec![params_id.clone()]),
        )?;
        self.params(params, params_id, id)
    }

    fn params(&mut self, params: Params, id: NodeId, parent: NodeId) -> GraphResult<()> {
        let (content, sections) = params.into_parts();
        match content {
            ParamsContent::Survey(_) => {
                let section_ids = sections
                    .iter()
                    .map(|section| normalize_id(&section.header.id))
                    .collect::<GraphResult<Vec<_>>>()?;
                self.insert(
                    id.clone(),
                    Some(parent),
                    NodeContent::Params(content),
                    Some(section_ids.clone()),
                )?;
                for (section, section_id) in sections.into_iter().zip(section_ids) {
                    self.section(section, section_id, id.clone())?;
                }
                Ok(())
            }
            ParamsContent::Pvt(_) => {
                self.insert(id, Some(parent), NodeContent::Params(content), None)
            }
        }
    }

    fn section(&mut self, section: Section, id: NodeId, parent: NodeId) -> GraphResult<()> {
        let (header, questions) = section.into_parts();
        let question_ids = questions
            .iter()
            .map(|question| normalize_id(&question.id))
            .collect::<GraphResult<Vec<_>>>()?;
        self.insert(
            id.clone(),
            Some(parent),
            NodeContent::Section(header),
            Some(question_ids.clone()),
        )?;
        for (question, question_id) in questions.into_iter().zip(question_ids) {
            self.question(question, question_id, id.clone())?;
        }
        Ok(())
    }

    fn question(&mut self, question: Question, id: NodeId, parent: NodeId) -> GraphResult<()> {
        self.insert(id, Some(parent), NodeContent::Question(question), None)
    }

    fn insert(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        content: NodeContent,
        children: Option<Vec<NodeId>>,
    ) -> GraphResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::IdConflict(id));
        }
        let title = content.title(&self.study_name, self.limits);
        let node = Node::new(id.clone(), parent, content, children, title);
        self.nodes.insert(id, node);
        Ok(())
    }
}

/// `study_id` may legitimately be blank on a fresh study.
fn normalize_optional_id(raw: &str) -> GraphResult<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }
    normalize_id(raw)
}

#[cfg(test)]
mod tests {
    use super::flatten;
    use crate::graph::{GraphError, PROPERTIES_ID, STUDY_ID};
    use crate::model::study::{Module, ModuleHeader, Params, Survey, Study};

    fn survey_module(id: &str, params_id: &str) -> Module {
        Module::from_parts(
            ModuleHeader::new(id),
            Params::Survey(Survey {
                id: params_id.to_string(),
                submit_text: "Submit".to_string(),
                shuffle: false,
                sections: Vec::new(),
            }),
        )
    }

    #[test]
    fn study_children_start_with_properties() {
        let mut study = Study::new();
        study.modules.push(survey_module("Mod-A", "p_a"));

        let nodes = flatten(&study).unwrap();
        let root = &nodes[STUDY_ID];
        assert_eq!(root.child_ids(), ["properties".to_string(), "moda".to_string()]);
        assert_eq!(nodes[PROPERTIES_ID].parent.as_deref(), Some(STUDY_ID));
        assert_eq!(nodes["moda"].child_ids(), ["p_a".to_string()]);
    }

    #[test]
    fn ids_colliding_after_normalization_are_rejected() {
        let mut study = Study::new();
        study.modules.push(survey_module("Alpha", "p1"));
        study.modules.push(survey_module("ALPHA!", "p2"));

        assert_eq!(
            flatten(&study).unwrap_err(),
            GraphError::IdConflict("alpha".to_string())
        );
    }

    #[test]
    fn module_cannot_take_a_reserved_id() {
        let mut study = Study::new();
        study.modules.push(survey_module("Properties", "p1"));

        assert_eq!(
            flatten(&study).unwrap_err(),
            GraphError::IdConflict("properties".to_string())
        );
    }
}
