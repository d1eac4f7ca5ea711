//! Component discovery in a directory.
//!
//! Every top-level file with a scannable extension is a component named after
//! its stem. Every subdirectory holding an `__init__.py` is a package component
//! named after the directory, with that file as its source. Anything else,
//! including hidden entries, is ignored.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use stratum_resolver::{ComponentSource, SupportedLanguage};
use tracing::{debug, warn};

use crate::{AppError, LOG_TARGET};

const PACKAGE_MARKER: &str = "__init__.py";

/// Lists the components of `root`, ordered by id and then path.
pub(crate) fn discover(root: &Utf8Path) -> Result<Vec<ComponentSource>, AppError> {
    let wrap = |source: io::Error| AppError::Discover {
        path: root.to_path_buf(),
        source,
    };
    let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(wrap)?;

    let mut sources = Vec::new();
    for listed in dir.entries().map_err(wrap)? {
        let entry = listed.map_err(wrap)?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!(target: LOG_TARGET, entry = ?file_name, "skipping non UTF-8 entry");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type().map_err(wrap)?;
        let found = if file_type.is_dir() {
            package(&dir, root, name).map_err(wrap)?
        } else if file_type.is_file() {
            module(&dir, root, name).map_err(wrap)?
        } else {
            None
        };
        sources.extend(found);
    }

    sources.sort_by(|left, right| (left.id(), left.path()).cmp(&(right.id(), right.path())));
    debug!(target: LOG_TARGET, root = %root, components = sources.len(), "components discovered");
    Ok(sources)
}

fn module(dir: &Dir, root: &Utf8Path, name: &str) -> io::Result<Option<ComponentSource>> {
    let file = root.join(name);
    if SupportedLanguage::from_path(file.as_std_path()).is_none() {
        return Ok(None);
    }
    let Some(stem) = file.file_stem() else {
        return Ok(None);
    };
    let text = dir.read_to_string(name)?;
    Ok(Some(ComponentSource::new(stem, text).with_path(file)))
}

fn package(dir: &Dir, root: &Utf8Path, name: &str) -> io::Result<Option<ComponentSource>> {
    let package_dir = dir.open_dir(name)?;
    if !package_dir.exists(PACKAGE_MARKER) {
        return Ok(None);
    }
    let text = package_dir.read_to_string(PACKAGE_MARKER)?;
    let file = root.join(name).join(PACKAGE_MARKER);
    Ok(Some(ComponentSource::new(name, text).with_path(file)))
}
