use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{AlgorithmId, EdgeId, NodeId};

/// Comparison an edge applies to the response given at its source node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionType {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
    True,
    False,
    Unknown(String),
}

impl ConditionType {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionType::Equals => "equals",
            ConditionType::GreaterThan => "greater_than",
            ConditionType::LessThan => "less_than",
            ConditionType::Contains => "contains",
            ConditionType::True => "true",
            ConditionType::False => "false",
            ConditionType::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ConditionType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "equals" => ConditionType::Equals,
            "greater_than" => ConditionType::GreaterThan,
            "less_than" => ConditionType::LessThan,
            "contains" => ConditionType::Contains,
            "true" => ConditionType::True,
            "false" => ConditionType::False,
            _ => ConditionType::Unknown(raw),
        }
    }
}

impl From<ConditionType> for String {
    fn from(t: ConditionType) -> Self {
        t.as_str().to_string()
    }
}

/// Directed, optionally conditional transition between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeRecord", into = "EdgeRecord")]
pub struct AlgorithmEdge {
    pub id: EdgeId,
    pub uuid: Uuid,
    pub algorithm_id: Option<AlgorithmId>,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    /// Choice caption, e.g. "Yes" / "No".
    pub label: Option<String>,
    /// Free-text description of the condition; informational only.
    pub condition: Option<String>,
    pub condition_type: Option<ConditionType>,
    pub condition_value: Option<String>,
    pub color: Option<String>,
    pub line_style: String,
    pub thickness: i64,
    pub order_index: i64,
    pub is_active: bool,
}

impl AlgorithmEdge {
    pub fn new(id: impl Into<EdgeId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            uuid: Uuid::new_v4(),
            algorithm_id: None,
            from_node_id: from.into(),
            to_node_id: to.into(),
            label: None,
            condition: None,
            condition_type: None,
            condition_value: None,
            color: None,
            line_style: default_line_style(),
            thickness: default_thickness(),
            order_index: 0,
            is_active: true,
        }
    }

    pub fn with_condition(mut self, condition_type: ConditionType, value: Option<&str>) -> Self {
        self.condition_type = Some(condition_type);
        self.condition_value = value.map(str::to_string);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_order(mut self, order_index: i64) -> Self {
        self.order_index = order_index;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// True when the edge carries no condition type and is taken for any response.
    pub fn is_unconditional(&self) -> bool {
        self.condition_type.is_none()
    }
}

fn default_line_style() -> String {
    "solid".to_string()
}

const fn default_thickness() -> i64 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeRecord {
    id: EdgeId,
    uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    algorithm_id: Option<AlgorithmId>,
    from_node_id: NodeId,
    to_node_id: NodeId,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    condition_type: Option<String>,
    #[serde(default)]
    condition_value: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    line_style: Option<String>,
    #[serde(default)]
    thickness: Option<i64>,
    #[serde(default)]
    order_index: Option<i64>,
    #[serde(default)]
    is_active: Option<bool>,
}

impl From<EdgeRecord> for AlgorithmEdge {
    fn from(r: EdgeRecord) -> Self {
        let condition_type = r
            .condition_type
            .filter(|t| !t.trim().is_empty())
            .map(ConditionType::from);
        Self {
            id: r.id,
            uuid: r.uuid,
            algorithm_id: r.algorithm_id,
            from_node_id: r.from_node_id,
            to_node_id: r.to_node_id,
            label: r.label,
            condition: r.condition,
            condition_type,
            condition_value: r.condition_value,
            color: r.color,
            line_style: r.line_style.unwrap_or_else(default_line_style),
            thickness: r.thickness.unwrap_or(default_thickness()),
            order_index: r.order_index.unwrap_or(0),
            is_active: r.is_active.unwrap_or(true),
        }
    }
}

impl From<AlgorithmEdge> for EdgeRecord {
    fn from(e: AlgorithmEdge) -> Self {
        Self {
            id: e.id,
            uuid: e.uuid,
            algorithm_id: e.algorithm_id,
            from_node_id: e.from_node_id,
            to_node_id: e.to_node_id,
            label: e.label,
            condition: e.condition,
            condition_type: e.condition_type.map(String::from),
            condition_value: e.condition_value,
            color: e.color,
            line_style: Some(e.line_style),
            thickness: Some(e.thickness),
            order_index: Some(e.order_index),
            is_active: Some(e.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_edge_decodes() {
        let value = json!({
            "id": 11,
            "uuid": "5a0c4b7e-0c55-4b8a-9a4e-2b0d8f0e9c11",
            "algorithm_id": 1,
            "from_node_id": 2,
            "to_node_id": 3,
            "label": "Sí",
            "condition": null,
            "condition_type": "equals",
            "condition_value": "true",
            "color": "#F44336",
            "line_style": "dashed",
            "thickness": 3,
            "order_index": 2,
            "is_active": true
        });
        let edge: AlgorithmEdge = serde_json::from_value(value).unwrap();
        assert_eq!(edge.from_node_id, NodeId(2));
        assert_eq!(edge.condition_type, Some(ConditionType::Equals));
        assert_eq!(edge.condition_value.as_deref(), Some("true"));
        assert_eq!(edge.line_style, "dashed");
        assert_eq!(edge.order_index, 2);
    }

    #[test]
    fn absent_fields_take_documented_defaults() {
        let value = json!({
            "id": 1,
            "uuid": "5a0c4b7e-0c55-4b8a-9a4e-2b0d8f0e9c12",
            "from_node_id": 1,
            "to_node_id": 2
        });
        let edge: AlgorithmEdge = serde_json::from_value(value).unwrap();
        assert!(edge.is_unconditional());
        assert_eq!(edge.order_index, 0);
        assert_eq!(edge.line_style, "solid");
        assert_eq!(edge.thickness, 2);
        assert!(edge.is_active);
    }

    #[test]
    fn blank_condition_type_is_unconditional() {
        let value = json!({
            "id": 1,
            "uuid": "5a0c4b7e-0c55-4b8a-9a4e-2b0d8f0e9c13",
            "from_node_id": 1,
            "to_node_id": 2,
            "condition_type": "  "
        });
        let edge: AlgorithmEdge = serde_json::from_value(value).unwrap();
        assert!(edge.is_unconditional());
    }

    #[test]
    fn condition_type_parsing_is_case_insensitive_and_open() {
        assert_eq!(ConditionType::from("Greater_Than".to_string()), ConditionType::GreaterThan);
        assert_eq!(
            ConditionType::from("between".to_string()),
            ConditionType::Unknown("between".into())
        );
    }
}
