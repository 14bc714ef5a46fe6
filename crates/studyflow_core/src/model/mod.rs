//! Study document model.
//!
//! # Responsibility
//! - Define the hierarchical interchange document (study, modules, params,
//!   sections, questions, alerts).
//! - Provide the stripped per-entity payloads used as graph node content.
//!
//! # Invariants
//! - `Params` and `QuestionKind` are tagged by their JSON `type` field.
//! - Legacy `_type` markers in incoming JSON are ignored.

pub mod alert;
pub mod question;
pub mod study;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Entity category of one document object / graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Study,
    Properties,
    Module,
    Params,
    Section,
    Question,
}

impl EntityKind {
    /// Returns the wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Properties => "properties",
            Self::Module => "module",
            Self::Params => "params",
            Self::Section => "section",
            Self::Question => "question",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
