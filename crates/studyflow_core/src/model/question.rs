//! Survey question model.
//!
//! Every question shares the common header fields; the JSON `type` tag
//! selects the variant-specific fields in [`QuestionKind`]. Variant fields
//! are required unless marked optional.

use serde::{Deserialize, Serialize};

/// Condition value compared against a referenced question's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HideValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSubtype {
    Short,
    Long,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeSubtype {
    Date,
    Time,
    Datetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSubtype {
    Image,
    Video,
    Audio,
}

/// Variant-specific question payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Instruction,
    Text {
        subtype: TextSubtype,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    Datetime {
        subtype: DateTimeSubtype,
    },
    Yesno {
        yes_text: String,
        no_text: String,
    },
    Slider {
        min: i64,
        max: i64,
        hint_left: String,
        hint_right: String,
    },
    Multi {
        radio: bool,
        modal: bool,
        options: Vec<String>,
        shuffle: bool,
    },
    Media {
        subtype: MediaSubtype,
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumb: Option<String>,
    },
    External {
        src: String,
    },
}

impl QuestionKind {
    /// Returns the wire tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Instruction => "instruction",
            Self::Text { .. } => "text",
            Self::Datetime { .. } => "datetime",
            Self::Yesno { .. } => "yesno",
            Self::Slider { .. } => "slider",
            Self::Multi { .. } => "multi",
            Self::Media { .. } => "media",
            Self::External { .. } => "external",
        }
    }

    /// Whether this variant collects an answer from the participant.
    pub fn collects_response(&self) -> bool {
        match self {
            Self::Instruction | Self::Media { .. } => false,
            Self::Text { .. }
            | Self::Datetime { .. }
            | Self::Yesno { .. }
            | Self::Slider { .. }
            | Self::Multi { .. }
            | Self::External { .. } => true,
        }
    }
}

/// One survey question. Leaf of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub rand_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_value: Option<HideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_if: Option<bool>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Designer default: a required short text question.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            required: true,
            rand_group: String::new(),
            hide_id: None,
            hide_value: None,
            hide_if: None,
            kind: QuestionKind::Text {
                subtype: TextSubtype::Short,
                min_value: None,
                max_value: None,
            },
        }
    }

    /// Replaces the variant payload, keeping the shared header.
    pub fn with_kind(mut self, kind: QuestionKind) -> Self {
        self.kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{HideValue, MediaSubtype, Question, QuestionKind};

    #[test]
    fn flattened_tag_selects_variant() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "_type": "question",
            "id": "q1",
            "text": "Rate your mood",
            "required": true,
            "rand_group": "",
            "type": "slider",
            "min": 0,
            "max": 100,
            "hint_left": "low",
            "hint_right": "high"
        }))
        .unwrap();

        assert_eq!(question.kind.tag(), "slider");
        assert!(matches!(question.kind, QuestionKind::Slider { max: 100, .. }));
    }

    #[test]
    fn missing_variant_field_is_rejected() {
        let result = serde_json::from_value::<Question>(serde_json::json!({
            "id": "q2",
            "text": "Agree?",
            "required": false,
            "type": "yesno",
            "yes_text": "Yes"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn hide_value_accepts_bool_and_text() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": "q3",
            "text": "Photo",
            "required": false,
            "hide_id": "q1",
            "hide_value": true,
            "type": "media",
            "subtype": "image",
            "src": "https://example.org/a.png"
        }))
        .unwrap();

        assert_eq!(question.hide_value, Some(HideValue::Flag(true)));
        assert!(matches!(
            question.kind,
            QuestionKind::Media {
                subtype: MediaSubtype::Image,
                thumb: None,
                ..
            }
        ));
        assert!(!question.kind.collects_response());
    }

    #[test]
    fn instruction_serializes_tag_only() {
        let question = Question::new("intro").with_kind(QuestionKind::Instruction);
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "instruction");
        assert_eq!(json["id"], "intro");

        let decoded: Question = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, question);
    }
}
