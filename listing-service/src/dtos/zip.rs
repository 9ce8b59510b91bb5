use crate::services::{ArchiveFile, ArchiveRequest, ArchiveSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateZipRequest {
    pub input_folders: Vec<String>,
    #[validate(length(min = 1))]
    pub output_zip_path: String,
    pub root_folder_name: Option<String>,
    #[serde(default)]
    pub flatten: bool,
    #[serde(default)]
    pub files: Vec<ZipFileEntry>,
}

/// Loose file entry; entries missing either field are ignored.
#[derive(Debug, Deserialize)]
pub struct ZipFileEntry {
    pub path: Option<String>,
    pub name: Option<String>,
}

impl From<CreateZipRequest> for ArchiveRequest {
    fn from(req: CreateZipRequest) -> Self {
        Self {
            input_folders: req.input_folders.into_iter().map(PathBuf::from).collect(),
            output: PathBuf::from(req.output_zip_path),
            root_folder_name: req.root_folder_name.filter(|r| !r.is_empty()),
            flatten: req.flatten,
            files: req
                .files
                .into_iter()
                .filter_map(|entry| match (entry.path, entry.name) {
                    (Some(path), Some(name)) if !path.is_empty() && !name.is_empty() => {
                        Some(ArchiveFile {
                            path: PathBuf::from(path),
                            name,
                        })
                    }
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateZipResponse {
    pub ok: bool,
    pub bytes: u64,
    pub output: String,
}

impl From<ArchiveSummary> for CreateZipResponse {
    fn from(summary: ArchiveSummary) -> Self {
        Self {
            ok: true,
            bytes: summary.bytes,
            output: summary.output.display().to_string(),
        }
    }
}
