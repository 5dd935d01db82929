// Transcript loading: directory walk and filename metadata.
//
// Transcripts live under `<root>/<TICKER>/<YYYY-Mon-DD>-<TICKER>.txt`.
// The loader emits one record per file; metadata parsing never drops a file.

pub mod loader;
pub mod metadata;

pub use loader::{list_transcript_files, load_all_transcripts, load_transcripts, TranscriptFile};
pub use metadata::{extract_metadata, CallDate, Quarter, TranscriptRecord};
