//! DOCX generation pipeline

pub mod render;
pub mod styles;
pub mod watermark;
pub mod worker;
