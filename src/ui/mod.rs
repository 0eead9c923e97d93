//! UI panels for the project generator

pub mod content;
pub mod images;
pub mod info;
pub mod references;
pub mod status_bar;
pub mod validation;
