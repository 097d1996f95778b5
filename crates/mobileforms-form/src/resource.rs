use std::path::{Component, Path, PathBuf};

use crate::error::FormError;

/// Source of named schemas and injected style/script assets.
pub trait ResourceLoader: Send + Sync {
  fn read(&self, path: &Path) -> Result<String, FormError>;
}

/// Reads resources from a directory on disk.
///
/// ```text
/// {root}/
/// ├── checkout.json      set_schema_by_name("checkout")
/// ├── theme.css          inject_style("theme.css", ..)
/// └── widgets/date.js    inject_script("widgets/date.js")
/// ```
///
/// Absolute paths are read as-is.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
  root: PathBuf,
}

impl FsResourceLoader {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl ResourceLoader for FsResourceLoader {
  fn read(&self, path: &Path) -> Result<String, FormError> {
    let full = self.root.join(path);
    std::fs::read_to_string(&full).map_err(|source| FormError::Resource { path: full, source })
  }
}

/// File a named schema lives in: `<name>.json`, relative to the loader root.
pub(crate) fn schema_file(name: &str) -> Result<PathBuf, FormError> {
  let file = PathBuf::from(format!("{name}.json"));
  let plain = !name.trim().is_empty()
    && file.components().count() == 1
    && matches!(file.components().next(), Some(Component::Normal(_)));
  if !plain {
    return Err(FormError::ResourceName {
      name: name.to_string(),
    });
  }
  Ok(file)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_schema_file() {
    assert_eq!(schema_file("checkout").unwrap(), PathBuf::from("checkout.json"));
    assert!(schema_file("").is_err());
    assert!(schema_file("../secrets").is_err());
    assert!(schema_file("a/b").is_err());
    assert!(schema_file("/etc/passwd").is_err());
  }

  #[test]
  fn test_fs_loader_reads_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("theme.css"), "body {}").unwrap();

    let loader = FsResourceLoader::new(dir.path());
    assert_eq!(loader.read(Path::new("theme.css")).unwrap(), "body {}");
    assert!(matches!(
      loader.read(Path::new("missing.css")),
      Err(FormError::Resource { .. })
    ));
  }
}
