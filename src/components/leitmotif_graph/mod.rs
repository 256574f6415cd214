//! Force-directed leitmotif graph: document model, layout engine, input
//! handling and the canvas component that ties them to the page.

pub mod camera;
mod component;
pub mod config;
pub mod graph;
pub mod interaction;
pub mod loader;
pub mod render;
pub mod simulation;
pub mod source;
pub mod state;

pub use camera::Point;
pub use component::LeitmotifGraph;
pub use config::GraphConfig;
pub use graph::{Graph, Node, NodeId, NodeKind};
pub use state::{GraphState, LoadStatus};
