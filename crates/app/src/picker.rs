use std::path::{Path, PathBuf};

use primeai_chat::{AcceptFilter, FileBlob};
use snafu::ResultExt;

use crate::error::{AppResult, ReadAttachmentSnafu};

/// Why a selected file did not make it into the pending attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Rejected { mime_type: String },
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub blobs: Vec<FileBlob>,
    pub skipped: Vec<SkippedFile>,
}

/// Guesses the MIME type from the extension, defaulting to `application/octet-stream`.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads the selected files, keeping input order and skipping what the filter rejects.
pub async fn select_files(paths: &[PathBuf], filter: &AcceptFilter) -> Selection {
    let mut selection = Selection::default();

    for path in paths {
        let mime_type = guess_mime_type(path);
        if !filter.accepts(&mime_type) {
            tracing::warn!(
                path = ?path,
                mime_type = %mime_type,
                accept = %filter,
                "file rejected by accept filter"
            );
            selection.skipped.push(SkippedFile {
                path: path.clone(),
                reason: SkipReason::Rejected { mime_type },
            });
            continue;
        }

        match read_blob(path, mime_type).await {
            Ok(blob) => selection.blobs.push(blob),
            Err(error) => {
                tracing::warn!(path = ?path, error = %error, "failed to read selected file");
                selection.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: SkipReason::Unreadable(error.to_string()),
                });
            }
        }
    }

    selection
}

async fn read_blob(path: &Path, mime_type: String) -> AppResult<FileBlob> {
    let bytes = tokio::fs::read(path).await.context(ReadAttachmentSnafu {
        stage: "read-selected-file",
        path: path.to_path_buf(),
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileBlob::new(name, mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_is_guessed_from_extension() {
        assert_eq!(guess_mime_type(Path::new("cat.png")), "image/png");
        assert_eq!(guess_mime_type(Path::new("song.mp3")), "audio/mpeg");
        assert_eq!(
            guess_mime_type(Path::new("no-extension")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn selection_reads_accepted_files_and_reports_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cat.png");
        let document = dir.path().join("report.pdf");
        let missing = dir.path().join("gone.mp4");
        std::fs::write(&image, [1_u8, 2, 3]).unwrap();
        std::fs::write(&document, [0_u8; 4]).unwrap();

        let filter = AcceptFilter::parse("image/*,video/*,audio/*");
        let paths = [image, document.clone(), missing.clone()];
        let selection = select_files(&paths, &filter).await;

        assert_eq!(selection.blobs.len(), 1);
        assert_eq!(selection.blobs[0].name, "cat.png");
        assert_eq!(selection.blobs[0].mime_type, "image/png");
        assert_eq!(selection.blobs[0].size(), 3);

        assert_eq!(selection.skipped.len(), 2);
        assert_eq!(
            selection.skipped[0],
            SkippedFile {
                path: document,
                reason: SkipReason::Rejected {
                    mime_type: "application/pdf".to_string(),
                },
            }
        );
        assert_eq!(selection.skipped[1].path, missing);
        assert!(matches!(
            selection.skipped[1].reason,
            SkipReason::Unreadable(_)
        ));
    }
}
