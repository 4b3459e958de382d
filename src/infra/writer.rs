use crate::error::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";
pub const DOCKERFILE_FILE_NAME: &str = "Dockerfile";
pub const DOCKERIGNORE_FILE_NAME: &str = ".dockerignore";

pub const DEFAULT_DOCKERIGNORE: &str = "\
.git
.gitignore
node_modules
vendor
bin
dist
build
tmp
";

/// Files written by one successful generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub compose_path: PathBuf,
    pub dockerfile_path: PathBuf,
    /// Present only when the ignore file was newly created
    pub dockerignore_path: Option<PathBuf>,
}

/// Writes the compose file and Dockerfile into `root`, plus a default
/// `.dockerignore` when none exists.
///
/// Nothing is written if either the compose file or the Dockerfile already
/// exists.
pub fn write_files(root: &Path, compose: &str, dockerfile: &str) -> Result<Output> {
    if root.as_os_str().is_empty() {
        return Err(Error::MissingRoot);
    }

    let compose_path = root.join(COMPOSE_FILE_NAME);
    let dockerfile_path = root.join(DOCKERFILE_FILE_NAME);
    let dockerignore_path = root.join(DOCKERIGNORE_FILE_NAME);

    for (path, name) in [
        (&compose_path, COMPOSE_FILE_NAME),
        (&dockerfile_path, DOCKERFILE_FILE_NAME),
    ] {
        if file_exists(path) {
            return Err(Error::AlreadyExists(name.to_string()));
        }
    }

    write_new(root, &compose_path, compose)?;
    if let Err(e) = write_new(root, &dockerfile_path, dockerfile) {
        if let Err(cleanup) = fs::remove_file(&compose_path) {
            warn!("could not roll back {:?}: {}", compose_path, cleanup);
        }
        return Err(e);
    }

    let dockerignore_created = if file_exists(&dockerignore_path) {
        false
    } else {
        match write_new(root, &dockerignore_path, DEFAULT_DOCKERIGNORE) {
            Ok(()) => true,
            Err(Error::AlreadyExists(_)) => false,
            Err(e) => return Err(e),
        }
    };

    info!("wrote {:?} and {:?}", compose_path, dockerfile_path);

    Ok(Output {
        compose_path,
        dockerfile_path,
        dockerignore_path: dockerignore_created.then_some(dockerignore_path),
    })
}

/// Writes `content` to a temp file in `dir` and moves it to `target`,
/// refusing to replace an existing file.
fn write_new(dir: &Path, target: &Path, content: &str) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io("creating temp file in", dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| Error::io("writing", tmp.path().to_path_buf(), e))?;

    tmp.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            Error::AlreadyExists(display_name(target))
        } else {
            Error::io("writing", target, e.error)
        }
    })?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
