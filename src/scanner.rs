use crate::error::Result as CrateResult;
use anyhow::Result;
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all Rust source files.
/// It automatically skips `target` and hidden directories, then applies the
/// configured [`SourceFilter`] to what is left.
///
/// # Example
///
/// ```no_run
/// use webdoc_routes::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    filter: SourceFilter,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// List of paths to all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// Include/exclude patterns applied to source paths.
///
/// Patterns are regular expressions that must match the whole path relative
/// to the project root, with `/` separators. Excludes win over includes; an
/// empty include list keeps everything not excluded.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl SourceFilter {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidArgument`] for an invalid pattern.
    pub fn new(include: &[String], exclude: &[String]) -> CrateResult<Self> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    /// Whether a relative path passes the filter.
    pub fn accepts(&self, relative_path: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(relative_path)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(relative_path))
    }
}

fn compile_patterns(patterns: &[String]) -> CrateResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| Regex::new(&format!("^(?:{})$", pattern)).map_err(Into::into))
        .collect()
}

impl FileScanner {
    /// Creates a scanner that keeps every Rust file under `root_path`.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            filter: SourceFilter::default(),
        }
    }

    /// Replaces the include/exclude filter.
    pub fn with_filter(mut self, filter: SourceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Scans the directory tree and collects all `.rs` files that pass the filter.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning
    /// continues past them.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                        continue;
                    }

                    let relative = self.relative_path(path);
                    if self.filter.accepts(&relative) {
                        rust_files.push(path.to_path_buf());
                    } else {
                        debug!("Filtered out {}", relative);
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
