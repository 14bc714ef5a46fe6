//! Study, module, params and section model.
//!
//! # Responsibility
//! - Define the hierarchical document exchanged with validators, exporters
//!   and the study store.
//! - Split each container into its own payload ("header") and its nested
//!   collection, and join them back.
//!
//! # Invariants
//! - Headers never carry nested collections; children live in the graph.
//! - `into_parts`/`from_parts` are exact inverses.

use crate::model::alert::Alert;
use crate::model::question::Question;
use serde::{Deserialize, Serialize};

/// Root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    /// Epoch ms stamped by the study store on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub properties: Properties,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Study {
    /// Designer default: initial properties and no modules.
    pub fn new() -> Self {
        Self {
            timestamp: None,
            properties: Properties::initial(),
            modules: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (StudyHeader, Properties, Vec<Module>) {
        (
            StudyHeader {
                timestamp: self.timestamp,
            },
            self.properties,
            self.modules,
        )
    }

    pub fn from_parts(header: StudyHeader, properties: Properties, modules: Vec<Module>) -> Self {
        Self {
            timestamp: header.timestamp,
            properties,
            modules,
        }
    }
}

impl Default for Study {
    fn default() -> Self {
        Self::new()
    }
}

/// Study node payload once properties and modules are stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyHeader {
    pub timestamp: Option<i64>,
}

/// Study-wide metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub study_id: String,
    pub study_name: String,
    pub instructions: String,
    pub banner_url: String,
    pub support_email: String,
    pub support_url: String,
    pub ethics: String,
    pub pls: String,
    pub created_by: String,
    pub empty_msg: String,
    pub post_url: String,
    pub conditions: Vec<String>,
    pub cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redcap_server_api_url: Option<String>,
}

impl Properties {
    /// Values a freshly created study starts with in the designer.
    pub fn initial() -> Self {
        Self {
            study_name: "Study".to_string(),
            conditions: vec!["Control".to_string(), "Treatment".to_string()],
            ..Self::default()
        }
    }
}

/// Chart type for the participant-facing results graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
}

/// Results graph configuration; chart fields are meaningful when `display`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDisplay {
    pub display: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<u32>,
}

/// Module payload without its params child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub alerts: Alert,
    #[serde(default)]
    pub graph: GraphDisplay,
    #[serde(default)]
    pub unlock_after: Vec<String>,
}

impl ModuleHeader {
    /// Designer default for a new module.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            condition: String::new(),
            alerts: Alert::default(),
            graph: GraphDisplay::default(),
            unlock_after: Vec::new(),
        }
    }
}

/// One study module: header fields plus exactly one params slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(flatten)]
    pub header: ModuleHeader,
    pub params: Params,
}

impl Module {
    pub fn into_parts(self) -> (ModuleHeader, Params) {
        (self.header, self.params)
    }

    pub fn from_parts(header: ModuleHeader, params: Params) -> Self {
        Self { header, params }
    }
}

/// Params variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsKind {
    Survey,
    Pvt,
}

/// Module task parameters, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Params {
    Survey(Survey),
    Pvt(Pvt),
}

impl Params {
    pub fn id(&self) -> &str {
        match self {
            Self::Survey(survey) => survey.id.as_str(),
            Self::Pvt(pvt) => pvt.id.as_str(),
        }
    }

    pub fn kind(&self) -> ParamsKind {
        match self {
            Self::Survey(_) => ParamsKind::Survey,
            Self::Pvt(_) => ParamsKind::Pvt,
        }
    }

    /// Splits off the section list. PVT params never carry sections.
    pub fn into_parts(self) -> (ParamsContent, Vec<Section>) {
        match self {
            Self::Survey(survey) => (
                ParamsContent::Survey(SurveyHeader {
                    id: survey.id,
                    submit_text: survey.submit_text,
                    shuffle: survey.shuffle,
                }),
                survey.sections,
            ),
            Self::Pvt(pvt) => (ParamsContent::Pvt(pvt), Vec::new()),
        }
    }
}

/// Questionnaire params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    #[serde(default = "default_submit_text")]
    pub submit_text: String,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub sections: Vec<Section>,
}

fn default_submit_text() -> String {
    "Submit".to_string()
}

/// Psychomotor vigilance task params.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pvt {
    pub id: String,
    pub trials: u32,
    pub min_waiting: u32,
    pub max_waiting: u32,
    pub max_reaction: u32,
    pub show: bool,
    pub exit: bool,
}

/// Survey params payload without sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyHeader {
    pub id: String,
    pub submit_text: String,
    pub shuffle: bool,
}

/// Params node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsContent {
    Survey(SurveyHeader),
    Pvt(Pvt),
}

impl ParamsContent {
    /// Designer default for the requested params kind.
    pub fn new(kind: ParamsKind, id: impl Into<String>) -> Self {
        match kind {
            ParamsKind::Survey => Self::Survey(SurveyHeader {
                id: id.into(),
                submit_text: default_submit_text(),
                shuffle: false,
            }),
            ParamsKind::Pvt => Self::Pvt(Pvt {
                id: id.into(),
                ..Pvt::default()
            }),
        }
    }

    pub fn kind(&self) -> ParamsKind {
        match self {
            Self::Survey(_) => ParamsKind::Survey,
            Self::Pvt(_) => ParamsKind::Pvt,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Survey(header) => header.id.as_str(),
            Self::Pvt(pvt) => pvt.id.as_str(),
        }
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        match self {
            Self::Survey(header) => header.id = id.to_string(),
            Self::Pvt(pvt) => pvt.id = id.to_string(),
        }
    }

    /// Rejoins the payload with its sections.
    pub fn into_params(self, sections: Vec<Section>) -> Params {
        match self {
            Self::Survey(header) => Params::Survey(Survey {
                id: header.id,
                submit_text: header.submit_text,
                shuffle: header.shuffle,
                sections,
            }),
            Self::Pvt(pvt) => Params::Pvt(pvt),
        }
    }
}

/// Section payload without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shuffle: bool,
}

impl SectionHeader {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            shuffle: false,
        }
    }
}

/// Ordered group of questions inside a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(flatten)]
    pub header: SectionHeader,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn into_parts(self) -> (SectionHeader, Vec<Question>) {
        (self.header, self.questions)
    }

    pub fn from_parts(header: SectionHeader, questions: Vec<Question>) -> Self {
        Self { header, questions }
    }
}

#[cfg(test)]
mod tests {
    use super::{Params, ParamsKind, Study};

    #[test]
    fn params_tag_selects_variant_and_ignores_legacy_marker() {
        let params: Params = serde_json::from_value(serde_json::json!({
            "_type": "params",
            "type": "pvt",
            "id": "pvt_1",
            "trials": 10,
            "min_waiting": 1000,
            "max_waiting": 4000,
            "max_reaction": 2000,
            "show": true,
            "exit": false
        }))
        .unwrap();

        assert_eq!(params.kind(), ParamsKind::Pvt);
        assert_eq!(params.id(), "pvt_1");
    }

    #[test]
    fn module_header_fields_flatten_next_to_params() {
        let study: Study = serde_json::from_value(serde_json::json!({
            "_type": "study",
            "properties": {"study_id": "demo", "study_name": "Demo", "conditions": ["A"]},
            "modules": [{
                "_type": "module",
                "id": "m1",
                "name": "Morning",
                "condition": "A",
                "alerts": {"startDateTime": "2025-01-01T09:00", "title": "t", "message": "m"},
                "graph": {"display": false},
                "unlock_after": [],
                "params": {"type": "survey", "id": "s1", "sections": []}
            }]
        }))
        .unwrap();

        let module = &study.modules[0];
        assert_eq!(module.header.name, "Morning");
        assert_eq!(module.params.kind(), ParamsKind::Survey);

        let json = serde_json::to_value(&study).unwrap();
        assert_eq!(json["modules"][0]["id"], "m1");
        assert_eq!(json["modules"][0]["params"]["type"], "survey");
        assert_eq!(json["modules"][0]["params"]["submit_text"], "Submit");
    }
}
