//! Parsing collaborators. The engine itself only sees [`crate::core::ast`]
//! types; everything parser-specific stays in here.

pub mod python;

pub use python::parse_module;
