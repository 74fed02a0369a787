//! Schema document validators.

pub mod references;
pub mod shape;
