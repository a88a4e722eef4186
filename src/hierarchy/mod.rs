pub mod compressor;
pub mod element_model;
pub mod fingerprint;
pub mod hierarchy_model;
pub mod semantics;
