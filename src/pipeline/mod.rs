// Pipelines: end-to-end workflows composed from the loader and scorer.

pub mod features;
