//! Core functionality: project model, validation, references and configuration

pub mod assets;
pub mod autosave;
pub mod citations;
pub mod config;
pub mod project;
pub mod references;
pub mod sections;
pub mod validate;
