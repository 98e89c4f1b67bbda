pub mod callgraph;
pub mod labelling;
pub mod mapping;
pub mod resolver;
pub mod similarity;
