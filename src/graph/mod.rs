pub mod export;
pub mod graph_model;
pub mod navigation;
