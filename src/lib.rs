// earnings-tone: paragraph-level sentiment features for earnings calls.
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: load transcripts, classify paragraphs, reduce, and output.

pub mod config;
pub mod output;
pub mod pipeline;
pub mod sentiment;
pub mod status;
pub mod transcripts;
