use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::embedded::{ValidationRules, decode_lenient, encode_embedded};
use super::ids::{AlgorithmId, NodeId};

/// Kind of step a node represents. Unrecognized kinds are kept verbatim and
/// behave like a generic pass-through step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Start,
    Decision,
    Action,
    Input,
    End,
    Unknown(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Start => "start",
            NodeType::Decision => "decision",
            NodeType::Action => "action",
            NodeType::Input => "input",
            NodeType::End => "end",
            NodeType::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, NodeType::End)
    }
}

impl From<String> for NodeType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "start" => NodeType::Start,
            "decision" => NodeType::Decision,
            "action" => NodeType::Action,
            "input" => NodeType::Input,
            "end" => NodeType::End,
            _ => NodeType::Unknown(raw),
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}

/// Value kind an input node asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputType {
    Text,
    Number,
    Boolean,
    Select,
    Other(String),
}

impl InputType {
    pub fn as_str(&self) -> &str {
        match self {
            InputType::Text => "text",
            InputType::Number => "number",
            InputType::Boolean => "boolean",
            InputType::Select => "select",
            InputType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for InputType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => InputType::Text,
            "number" => InputType::Number,
            "boolean" | "bool" => InputType::Boolean,
            "select" => InputType::Select,
            _ => InputType::Other(raw),
        }
    }
}

impl From<InputType> for String {
    fn from(t: InputType) -> Self {
        t.as_str().to_string()
    }
}

/// A single step of a clinical algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct AlgorithmNode {
    pub id: NodeId,
    pub uuid: Uuid,
    pub algorithm_id: Option<AlgorithmId>,
    pub node_type: NodeType,
    pub title: String,
    pub content: Option<String>,
    /// Question shown on decision nodes.
    pub question: Option<String>,
    pub action_description: Option<String>,
    pub input_type: Option<InputType>,
    /// Ordered options for `select` inputs.
    pub input_options: Vec<String>,
    pub validation_rules: ValidationRules,
    /// Editor canvas position; not used by the player.
    pub position_x: f64,
    pub position_y: f64,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub order_index: i64,
    pub is_active: bool,
    decode_issues: Vec<String>,
}

impl AlgorithmNode {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uuid: Uuid::new_v4(),
            algorithm_id: None,
            node_type,
            title: title.into(),
            content: None,
            question: None,
            action_description: None,
            input_type: None,
            input_options: Vec::new(),
            validation_rules: ValidationRules::new(),
            position_x: 0.0,
            position_y: 0.0,
            color: None,
            icon: None,
            order_index: 0,
            is_active: true,
            decode_issues: Vec::new(),
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_action(mut self, description: impl Into<String>) -> Self {
        self.action_description = Some(description.into());
        self
    }

    pub fn with_input(mut self, input_type: InputType, options: Vec<String>) -> Self {
        self.input_type = Some(input_type);
        self.input_options = options;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Problems found while decoding embedded JSON fields.
    pub fn decode_issues(&self) -> &[String] {
        &self.decode_issues
    }

    /// The text a player shows as the prompt for this node.
    pub fn prompt(&self) -> &str {
        match self.node_type {
            NodeType::Decision => self.question.as_deref().unwrap_or(&self.title),
            NodeType::Action => self.action_description.as_deref().unwrap_or(&self.title),
            _ => self.content.as_deref().unwrap_or(&self.title),
        }
    }
}

/// Wire shape of a node as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    algorithm_id: Option<AlgorithmId>,
    node_type: NodeType,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    action_description: Option<String>,
    #[serde(default)]
    input_type: Option<InputType>,
    #[serde(default)]
    input_options: Option<Value>,
    #[serde(default)]
    validation_rules: Option<Value>,
    #[serde(default)]
    position_x: Option<f64>,
    #[serde(default)]
    position_y: Option<f64>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    order_index: Option<i64>,
    #[serde(default)]
    is_active: Option<bool>,
}

impl From<NodeRecord> for AlgorithmNode {
    fn from(r: NodeRecord) -> Self {
        let (input_options, options_issue) =
            decode_lenient::<Vec<String>>("input_options", r.input_options.as_ref());
        let (validation_rules, rules_issue) =
            decode_lenient::<ValidationRules>("validation_rules", r.validation_rules.as_ref());
        let decode_issues: Vec<String> = [options_issue, rules_issue].into_iter().flatten().collect();
        for issue in &decode_issues {
            tracing::warn!(node_id = %r.id, %issue, "node field decoded with default");
        }
        Self {
            id: r.id,
            uuid: r.uuid,
            algorithm_id: r.algorithm_id,
            node_type: r.node_type,
            title: r.title,
            content: r.content,
            question: r.question,
            action_description: r.action_description,
            input_type: r.input_type,
            input_options,
            validation_rules,
            position_x: r.position_x.unwrap_or(0.0),
            position_y: r.position_y.unwrap_or(0.0),
            color: r.color,
            icon: r.icon,
            order_index: r.order_index.unwrap_or(0),
            is_active: r.is_active.unwrap_or(true),
            decode_issues,
        }
    }
}

impl From<AlgorithmNode> for NodeRecord {
    fn from(n: AlgorithmNode) -> Self {
        let input_options = encode_embedded(&n.input_options, n.input_options.is_empty());
        let validation_rules =
            encode_embedded(&n.validation_rules, n.validation_rules.is_empty());
        Self {
            id: n.id,
            uuid: n.uuid,
            algorithm_id: n.algorithm_id,
            node_type: n.node_type,
            title: n.title,
            content: n.content,
            question: n.question,
            action_description: n.action_description,
            input_type: n.input_type,
            input_options: Some(input_options),
            validation_rules: Some(validation_rules),
            position_x: Some(n.position_x),
            position_y: Some(n.position_y),
            color: n.color,
            icon: n.icon,
            order_index: Some(n.order_index),
            is_active: Some(n.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_node_decodes_with_embedded_options() {
        let value = json!({
            "id": 7,
            "uuid": "0b7f9c5e-1f7e-4c57-9d1f-3c8f2f5a1a01",
            "algorithm_id": 1,
            "node_type": "input",
            "title": "Severity",
            "input_type": "select",
            "input_options": "[\"mild\",\"moderate\",\"severe\"]",
            "validation_rules": null,
            "position_x": 120.5,
            "position_y": 40.0,
            "order_index": 3,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z"
        });
        let node: AlgorithmNode = serde_json::from_value(value).unwrap();
        assert_eq!(node.id, NodeId(7));
        assert_eq!(node.node_type, NodeType::Input);
        assert_eq!(node.input_type, Some(InputType::Select));
        assert_eq!(node.input_options, vec!["mild", "moderate", "severe"]);
        assert!(node.validation_rules.is_empty());
        assert!(node.decode_issues().is_empty());
        assert_eq!(node.position_x, 120.5);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let value = json!({
            "id": 1,
            "uuid": "0b7f9c5e-1f7e-4c57-9d1f-3c8f2f5a1a02",
            "node_type": "start",
            "title": "Begin"
        });
        let node: AlgorithmNode = serde_json::from_value(value).unwrap();
        assert_eq!(node.order_index, 0);
        assert!(node.is_active);
        assert!(node.input_options.is_empty());
        assert_eq!(node.position_y, 0.0);
    }

    #[test]
    fn unknown_node_type_is_kept_verbatim() {
        let value = json!({
            "id": 1,
            "uuid": "0b7f9c5e-1f7e-4c57-9d1f-3c8f2f5a1a03",
            "node_type": "checklist",
            "title": "Checklist"
        });
        let node: AlgorithmNode = serde_json::from_value(value).unwrap();
        assert_eq!(node.node_type, NodeType::Unknown("checklist".into()));
        assert_eq!(node.node_type.as_str(), "checklist");
    }

    #[test]
    fn malformed_validation_rules_are_reported_not_fatal() {
        let value = json!({
            "id": 2,
            "uuid": "0b7f9c5e-1f7e-4c57-9d1f-3c8f2f5a1a04",
            "node_type": "input",
            "title": "Temperature",
            "input_type": "number",
            "validation_rules": "{not json"
        });
        let node: AlgorithmNode = serde_json::from_value(value).unwrap();
        assert!(node.validation_rules.is_empty());
        assert_eq!(node.decode_issues().len(), 1);
    }

    #[test]
    fn layout_and_options_survive_reserialization() {
        let node = AlgorithmNode::new(3, NodeType::Input, "Pick")
            .with_input(InputType::Select, vec!["a".into(), "b".into()]);
        let mut node = node;
        node.position_x = 10.25;
        node.position_y = -4.5;
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["input_options"], json!("[\"a\",\"b\"]"));
        let restored: AlgorithmNode = serde_json::from_value(json).unwrap();
        assert_eq!(restored, node);
    }

    #[test]
    fn prompt_prefers_type_specific_text() {
        let decision = AlgorithmNode::new(1, NodeType::Decision, "Fever").with_question("Fever?");
        assert_eq!(decision.prompt(), "Fever?");
        let action = AlgorithmNode::new(2, NodeType::Action, "Treat");
        assert_eq!(action.prompt(), "Treat");
    }
}
