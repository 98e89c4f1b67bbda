pub mod callees;
pub mod extract;
pub mod filesystem;
pub mod languages;
pub mod parser;
pub mod signature;
