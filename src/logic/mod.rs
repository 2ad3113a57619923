//! Domain logic: feature extraction, scoring, datasets, reports and PDFs

pub mod dataset;
pub mod features;
pub mod model;
pub mod render;
pub mod reports;
