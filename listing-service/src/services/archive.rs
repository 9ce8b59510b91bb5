//! Zip packaging of listing folders and loose files.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Input folder not found: {0}")]
    InputNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Archive task failed: {0}")]
    Task(String),
}

/// A loose file placed at `{root}/{name}` inside the archive.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub input_folders: Vec<PathBuf>,
    pub output: PathBuf,
    pub root_folder_name: Option<String>,
    pub flatten: bool,
    pub files: Vec<ArchiveFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub bytes: u64,
    pub output: PathBuf,
}

/// Join archive path segments with `/`, skipping empty ones.
fn entry_name<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `/`-separated form of a path relative to a walked folder.
fn relative_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn folder_prefix(folder: &Path, root: &str, flatten: bool) -> String {
    if flatten {
        return root.to_string();
    }
    let base = folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    entry_name([root, base.as_str()])
}

/// Build the archive described by `request`. Blocking.
pub fn create_zip(request: &ArchiveRequest) -> Result<ArchiveSummary, ArchiveError> {
    for folder in &request.input_folders {
        if !folder.is_dir() {
            return Err(ArchiveError::InputNotFound(folder.display().to_string()));
        }
    }

    if let Some(parent) = request.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let root = request.root_folder_name.as_deref().unwrap_or_default();
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut zip = ZipWriter::new(BufWriter::new(File::create(&request.output)?));

    for folder in &request.input_folders {
        let prefix = folder_prefix(folder, root, request.flatten);

        for entry in WalkDir::new(folder).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(folder)
                .map(relative_name)
                .unwrap_or_default();
            let name = entry_name([prefix.as_str(), relative.as_str()]);

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                zip.start_file(name, options)?;
                io::copy(&mut File::open(entry.path())?, &mut zip)?;
            }
        }
    }

    for file in &request.files {
        if file.name.is_empty() || file.path.as_os_str().is_empty() {
            continue;
        }
        let mut source = match File::open(&file.path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(
                    path = %file.path.display(),
                    error = %e,
                    "Skipping missing archive file"
                );
                continue;
            }
        };
        zip.start_file(entry_name([root, file.name.as_str()]), options)?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?.flush()?;

    let bytes = fs::metadata(&request.output)?.len();
    tracing::info!(
        output = %request.output.display(),
        bytes,
        folders = request.input_folders.len(),
        files = request.files.len(),
        "Archive created"
    );

    Ok(ArchiveSummary {
        bytes,
        output: request.output.clone(),
    })
}

/// Run [`create_zip`] on the blocking pool.
pub async fn create_zip_blocking(request: ArchiveRequest) -> Result<ArchiveSummary, ArchiveError> {
    tokio::task::spawn_blocking(move || create_zip(&request))
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?
}
