pub mod decider;
pub mod decision_model;
pub mod ollama;
