// Matching engine: feature extraction, similarity scoring, evidence, and
// the ranking pipeline. Handlers are the only module here that touches IO;
// everything else is pure and deterministic over its inputs.

pub mod config;
pub mod evidence;
pub mod features;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
