use super::writer::{
    COMPOSE_FILE_NAME, DEFAULT_DOCKERIGNORE, DOCKERFILE_FILE_NAME, DOCKERIGNORE_FILE_NAME,
    file_exists,
};
use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk state of an output file compared to what would be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    New,
    Same,
    Different,
    /// Present, contents not compared
    Exists,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Same => "same",
            Self::Different => "different",
            Self::Exists => "exists",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub path: PathBuf,
    pub status: FileStatus,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub compose: FilePreview,
    pub dockerfile: FilePreview,
    pub dockerignore: FilePreview,
}

impl Preview {
    pub fn files(&self) -> [&FilePreview; 3] {
        [&self.compose, &self.dockerfile, &self.dockerignore]
    }
}

/// Classifies each output file without writing anything.
pub fn preview_files(root: &Path, compose: &str, dockerfile: &str) -> Result<Preview> {
    if root.as_os_str().is_empty() {
        return Err(Error::MissingRoot);
    }

    let dockerignore_path = root.join(DOCKERIGNORE_FILE_NAME);
    let dockerignore = if file_exists(&dockerignore_path) {
        FilePreview {
            path: dockerignore_path,
            status: FileStatus::Exists,
            content: String::new(),
        }
    } else {
        FilePreview {
            path: dockerignore_path,
            status: FileStatus::New,
            content: DEFAULT_DOCKERIGNORE.to_string(),
        }
    };

    Ok(Preview {
        compose: file_preview(root.join(COMPOSE_FILE_NAME), compose)?,
        dockerfile: file_preview(root.join(DOCKERFILE_FILE_NAME), dockerfile)?,
        dockerignore,
    })
}

fn file_preview(path: PathBuf, content: &str) -> Result<FilePreview> {
    let status = if !file_exists(&path) {
        FileStatus::New
    } else {
        let existing = fs::read(&path).map_err(|e| Error::io("reading", &path, e))?;
        if existing == content.as_bytes() {
            FileStatus::Same
        } else {
            FileStatus::Different
        }
    };

    Ok(FilePreview {
        path,
        status,
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fresh_root_is_all_new() {
        let temp = TempDir::new().unwrap();
        let preview = preview_files(temp.path(), "compose", "dockerfile").unwrap();
        for file in preview.files() {
            assert_eq!(file.status, FileStatus::New);
        }
        assert_eq!(preview.dockerignore.content, DEFAULT_DOCKERIGNORE);
    }

    #[test]
    fn compares_existing_contents() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(COMPOSE_FILE_NAME), "compose").unwrap();
        fs::write(temp.path().join(DOCKERFILE_FILE_NAME), "FROM old").unwrap();
        fs::write(temp.path().join(DOCKERIGNORE_FILE_NAME), "x").unwrap();

        let preview = preview_files(temp.path(), "compose", "FROM new").unwrap();
        assert_eq!(preview.compose.status, FileStatus::Same);
        assert_eq!(preview.dockerfile.status, FileStatus::Different);
        assert_eq!(preview.dockerignore.status, FileStatus::Exists);
    }

    #[test]
    fn preview_does_not_write() {
        let temp = TempDir::new().unwrap();
        preview_files(temp.path(), "a", "b").unwrap();
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
