pub mod archive;
pub mod database;
pub mod dedup;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod text_generator;

pub use archive::{create_zip, create_zip_blocking, ArchiveError, ArchiveFile, ArchiveRequest, ArchiveSummary};
pub use database::Database;
pub use text_generator::{GenerationRequest, LlmTrace, TextGenerator};
