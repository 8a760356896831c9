mod definition;
mod edge;
mod embedded;
mod ids;
mod node;

pub use definition::AlgorithmGraph;
pub use edge::{AlgorithmEdge, ConditionType};
pub use embedded::{ValidationRules, decode_lenient};
pub use ids::{AlgorithmId, EdgeId, NodeId};
pub use node::{AlgorithmNode, InputType, NodeType};
