//! Reusable view components.

pub mod leitmotif_graph;
