pub mod condition;
pub mod config;
pub mod core;
pub mod errors;
pub mod observability;
pub mod runtime;
pub mod source;

// Minimal user-facing API: load a graph through a source, play it with the player.
pub use condition::Response;
pub use config::{PlayerConfig, UnknownConditionPolicy, ValidationMode};
pub use core::{AlgorithmEdge, AlgorithmGraph, AlgorithmId, AlgorithmNode, EdgeId, NodeId, NodeType};
pub use errors::{LoadError, PlayerError, SourceError};
pub use observability::init_observability;
pub use runtime::{AlgorithmPlayer, Choice, PlayerPhase, Transition, validate_graph};
pub use source::{AlgorithmSource, FileSource, InMemorySource};
