//! What a user can answer at a node, derived from the node type.

use serde::Serialize;

use super::graph::outgoing_edges;
use crate::condition::Response;
use crate::core::{AlgorithmEdge, AlgorithmGraph, AlgorithmNode, ConditionType, EdgeId, InputType, NodeType};

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub label: String,
    pub response: Response,
    /// The edge this choice stands for, on decision nodes.
    pub edge_id: Option<EdgeId>,
}

impl Choice {
    fn new(label: impl Into<String>, response: Response) -> Self {
        Self {
            label: label.into(),
            response,
            edge_id: None,
        }
    }
}

/// Response that selects `edge` on a decision node: boolean edges answer with
/// a boolean, others with their condition value, then their label.
pub fn decision_response(edge: &AlgorithmEdge) -> Response {
    match &edge.condition_type {
        Some(ConditionType::True) => Response::Bool(true),
        Some(ConditionType::False) => Response::Bool(false),
        _ => edge
            .condition_value
            .clone()
            .or_else(|| edge.label.clone())
            .map(Response::Text)
            .unwrap_or_else(Response::proceed),
    }
}

fn decision_label(graph: &AlgorithmGraph, edge: &AlgorithmEdge) -> String {
    edge.label
        .clone()
        .or_else(|| edge.condition_value.clone())
        .or_else(|| graph.node(edge.to_node_id).map(|n| n.title.clone()))
        .unwrap_or_else(|| format!("Option {}", edge.id))
}

/// Choices offered at `node`. Empty for end nodes and for inputs that take free text.
/// Decision edges ordered after an unconditional edge are not offered.
pub fn choices_for(graph: &AlgorithmGraph, node: &AlgorithmNode) -> Vec<Choice> {
    match &node.node_type {
        NodeType::End => Vec::new(),
        NodeType::Action => vec![Choice::new("Done", Response::acknowledged())],
        NodeType::Decision => {
            let mut choices = Vec::new();
            for edge in outgoing_edges(graph, node.id) {
                choices.push(Choice {
                    label: decision_label(graph, edge),
                    response: decision_response(edge),
                    edge_id: Some(edge.id),
                });
                // an unconditional edge captures every answer
                if edge.is_unconditional() {
                    break;
                }
            }
            choices
        }
        NodeType::Input => match &node.input_type {
            Some(InputType::Select) => node
                .input_options
                .iter()
                .map(|opt| Choice::new(opt.clone(), Response::Text(opt.clone())))
                .collect(),
            Some(InputType::Boolean) => vec![
                Choice::new("Yes", Response::Bool(true)),
                Choice::new("No", Response::Bool(false)),
            ],
            _ => Vec::new(),
        },
        NodeType::Start | NodeType::Unknown(_) => {
            vec![Choice::new("Continue", Response::proceed())]
        }
    }
}

/// True when `node` expects typed input rather than a pick from [`choices_for`].
pub fn accepts_free_text(node: &AlgorithmNode) -> bool {
    node.node_type == NodeType::Input
        && !matches!(
            node.input_type,
            Some(InputType::Select) | Some(InputType::Boolean)
        )
}

/// Turn raw typed text into the response shape the node's input type implies.
pub fn response_from_input(node: &AlgorithmNode, raw: &str) -> Response {
    let trimmed = raw.trim();
    match node.input_type {
        Some(InputType::Number) => trimmed
            .parse::<f64>()
            .map(Response::Number)
            .unwrap_or_else(|_| Response::Text(trimmed.to_string())),
        Some(InputType::Boolean) => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "si" | "sí" | "1" => Response::Bool(true),
            "false" | "no" | "n" | "0" => Response::Bool(false),
            _ => Response::Text(trimmed.to_string()),
        },
        _ => Response::Text(raw.to_string()),
    }
}
