use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Collects the Rust sources a project declares its DTOs and controllers in.
///
/// `target` and hidden directories are skipped. Files are returned in a stable,
/// name-sorted order so that type registration (and therefore definition order in the
/// generated documents) does not depend on the file system.
///
/// # Example
///
/// ```no_run
/// use openapi_from_dto::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
#[derive(Debug)]
pub struct FileScanner {
    root_path: PathBuf,
}

/// Files found by a scan, plus the problems met along the way.
#[derive(Debug)]
pub struct ScanResult {
    /// Paths of all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the project tree and collects all `.rs` files.
    ///
    /// Unreadable entries are recorded as warnings and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            bail!("Project path is not a directory: {}", self.root_path.display());
        }
        debug!("Scanning {}", self.root_path.display());

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Found {} Rust files", rust_files.len());
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_project_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/dto")).unwrap();
        fs::write(root.join("src/dto/user.rs"), "pub struct User;").unwrap();
        fs::write(root.join("src/controller.rs"), "pub struct UserController;").unwrap();
        fs::write(root.join("routes.yaml"), "servers: []").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(
            result.rust_files,
            vec![root.join("src/controller.rs"), root.join("src/dto/user.rs")]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("target/debug/build.rs"), "").unwrap();
        fs::write(root.join(".git/hook.rs"), "").unwrap();
        fs::write(root.join("lib.rs"), "").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(result.rust_files, vec![root.join("lib.rs")]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert!(result.rust_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = FileScanner::new(missing).scan().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
