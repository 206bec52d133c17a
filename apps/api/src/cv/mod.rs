// CV extraction: prompt → completion → normalize → validate → persist → render.
// Handlers sit at the edge; everything below them is reachable through `CvPipeline`.

pub mod document;
pub mod error;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod validator;

#[cfg(test)]
pub mod testing;

pub use error::CvError;
pub use pipeline::{CvPipeline, GeneratedCv};
