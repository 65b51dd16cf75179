use std::path::{Path, PathBuf};

use crate::config::ImageSource;
use crate::error::HarnessError;

/// One benchmark input, read fully into memory before any timing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    pub path: PathBuf,
    /// File name component, used as the upload filename and in the report.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Candidate paths in their stable order.
pub async fn candidates(source: &ImageSource) -> Result<Vec<PathBuf>, HarnessError> {
    let paths = match source {
        ImageSource::Explicit(paths) => paths.clone(),
        ImageSource::SamplesDir(dir) => list_samples(dir).await?,
    };
    if paths.is_empty() {
        let hint = match source {
            ImageSource::SamplesDir(dir) => dir.clone(),
            ImageSource::Explicit(_) => PathBuf::from("./samples"),
        };
        return Err(HarnessError::NoImages(hint));
    }
    Ok(paths)
}

/// The first `count` inputs, or fewer when fewer exist.
pub async fn load(source: &ImageSource, count: usize) -> Result<Vec<InputImage>, HarnessError> {
    let mut images = Vec::with_capacity(count);
    for path in candidates(source).await?.into_iter().take(count) {
        let bytes = tokio::fs::read(&path).await.map_err(|source| HarnessError::Read {
            path: path.clone(),
            source,
        })?;
        images.push(InputImage {
            name: file_name(&path),
            path,
            bytes,
        });
    }
    Ok(images)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// A missing directory is the same as an empty one.
async fn list_samples(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(HarnessError::Read {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let read_err = |source| HarnessError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().await.map_err(read_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_samples_are_sorted_and_hidden_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", ".DS_Store", "c.png"] {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let source = ImageSource::SamplesDir(dir.path().to_path_buf());
        let images = load(&source, 5).await.unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        assert_eq!(images[0].bytes, b"a.png");

        let first = load(&source, 1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "a.png");
    }

    #[tokio::test]
    async fn test_missing_directory_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let source = ImageSource::SamplesDir(dir.path().join("absent"));
        let err = load(&source, 1).await.unwrap_err();
        assert!(matches!(err, HarnessError::NoImages(_)));
        assert!(err.to_string().contains("IMAGES="));
    }

    #[tokio::test]
    async fn test_unreadable_explicit_path_is_reported() {
        let source = ImageSource::Explicit(vec![PathBuf::from("/definitely/not/here.png")]);
        let err = load(&source, 1).await.unwrap_err();
        assert!(matches!(err, HarnessError::Read { .. }));
    }
}
