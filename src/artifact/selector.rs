use crate::errors::{ConfigError, ReleaseError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Which artifacts to act on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Every regular file in the artifact directory
    #[default]
    All,
    /// Only the most recently modified file
    Latest,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Latest => write!(f, "latest"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "latest" => Ok(Self::Latest),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// File names left out of an artifact directory snapshot.
///
/// A file is excluded when its name contains one of `names`, or when one of
/// `patterns` matches at the start of its name. Names that are not valid
/// UTF-8 are matched lossily.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    names: Vec<String>,
    patterns: Vec<Regex>,
}

impl ArtifactFilter {
    /// Builds a filter. Empty names and patterns are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for a pattern that does not compile.
    pub fn new<N, P>(names: N, patterns: P) -> Result<Self, ConfigError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.is_empty())
            .collect();

        let patterns = patterns
            .into_iter()
            .filter(|p| !p.as_ref().is_empty())
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(&format!("^(?:{pattern})")).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { names, patterns })
    }

    /// Returns true if nothing is excluded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty()
    }

    /// Returns true if a file called `name` is left out
    #[must_use]
    pub fn excludes(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.names.iter().any(|n| name.contains(n.as_str()))
            || self.patterns.iter().any(|p| p.is_match(&name))
    }
}

impl PartialEq for ArtifactFilter {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
            && self
                .patterns
                .iter()
                .map(Regex::as_str)
                .eq(other.patterns.iter().map(Regex::as_str))
    }
}

impl Eq for ArtifactFilter {}

/// A regular file found in an artifact directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// File name, used for ordering and tie-breaks
    pub name: OsString,
    /// Last modification time
    pub modified: SystemTime,
}

/// Snapshot of the regular files directly under a directory, sorted by name
#[derive(Debug, Clone)]
pub struct ArtifactDirectory {
    root: PathBuf,
    entries: Vec<ArtifactEntry>,
}

impl ArtifactDirectory {
    /// Reads the file entries of `root`.
    ///
    /// Subdirectories and dangling symlinks are skipped. Symlinks to regular
    /// files are followed.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::DirectoryNotFound` if `root` is missing or not a
    /// directory, and `ReleaseError::Io` if it cannot be read.
    pub fn read(root: impl Into<PathBuf>) -> Result<Self, ReleaseError> {
        Self::read_filtered(root, &ArtifactFilter::default())
    }

    /// Like [`read`](Self::read), leaving out files `filter` excludes.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_filtered(
        root: impl Into<PathBuf>,
        filter: &ArtifactFilter,
    ) -> Result<Self, ReleaseError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ReleaseError::DirectoryNotFound { path: root });
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&root)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();

            let Ok(metadata) = fs::metadata(&path) else {
                tracing::debug!(path = %path.display(), "Skipping unreadable entry");
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let name = dir_entry.file_name();
            if filter.excludes(&name) {
                tracing::debug!(path = %path.display(), "Excluded artifact");
                continue;
            }

            entries.push(ArtifactEntry {
                name,
                modified: metadata.modified()?,
                path,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            dir = %root.display(),
            count = entries.len(),
            "Scanned artifact directory"
        );

        Ok(Self { root, entries })
    }

    /// Directory this snapshot was taken from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries sorted by file name
    #[must_use]
    pub fn entries(&self) -> &[ArtifactEntry] {
        &self.entries
    }

    /// Returns true if no regular files were found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently modified entry; equal times go to the greatest name
    #[must_use]
    pub fn latest(&self) -> Option<&ArtifactEntry> {
        self.entries.iter().max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.name.cmp(&b.name))
        })
    }

    /// Applies `mode` to this snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::EmptyDirectory` when `mode` is `Latest` and there
    /// are no files.
    pub fn select(&self, mode: SelectionMode) -> Result<Vec<PathBuf>, ReleaseError> {
        match mode {
            SelectionMode::All => Ok(self.entries.iter().map(|e| e.path.clone()).collect()),
            SelectionMode::Latest => self
                .latest()
                .map(|e| vec![e.path.clone()])
                .ok_or_else(|| ReleaseError::EmptyDirectory {
                    path: self.root.clone(),
                }),
        }
    }
}

/// Selects artifacts from `directory` according to `mode`.
///
/// `All` returns every regular file in lexicographic order and never fails on
/// an empty directory. `Latest` returns exactly one file.
///
/// # Errors
///
/// See [`ArtifactDirectory::read`] and [`ArtifactDirectory::select`].
pub fn select(directory: &Path, mode: SelectionMode) -> Result<Vec<PathBuf>, ReleaseError> {
    ArtifactDirectory::read(directory)?.select(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mtime: i64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        path
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_latest_picks_newest_package() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg-1.0.tar.gz", 1_000);
        touch(temp.path(), "pkg-2.0.tar.gz", 2_000);

        let latest = select(temp.path(), SelectionMode::Latest).unwrap();
        assert_eq!(names(&latest), vec!["pkg-2.0.tar.gz"]);

        let all = select(temp.path(), SelectionMode::All).unwrap();
        assert_eq!(names(&all), vec!["pkg-1.0.tar.gz", "pkg-2.0.tar.gz"]);
    }

    #[test]
    fn test_latest_ignores_name_when_times_differ() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "zzz.whl", 10);
        touch(temp.path(), "aaa.whl", 20);

        let latest = select(temp.path(), SelectionMode::Latest).unwrap();
        assert_eq!(names(&latest), vec!["aaa.whl"]);
    }

    #[test]
    fn test_latest_tie_break_is_greatest_name() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a", 500);
        touch(temp.path(), "b", 500);

        for _ in 0..5 {
            let latest = select(temp.path(), SelectionMode::Latest).unwrap();
            assert_eq!(names(&latest), vec!["b"]);
        }
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();

        assert_eq!(select(temp.path(), SelectionMode::All).unwrap(), Vec::<PathBuf>::new());

        let err = select(temp.path(), SelectionMode::Latest).unwrap_err();
        assert_eq!(
            err,
            ReleaseError::EmptyDirectory {
                path: temp.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("dist");

        let err = select(&missing, SelectionMode::All).unwrap_err();
        assert!(matches!(err, ReleaseError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let temp = TempDir::new().unwrap();
        let file = touch(temp.path(), "not-a-dir", 1);

        let err = select(&file, SelectionMode::Latest).unwrap_err();
        assert!(matches!(err, ReleaseError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_subdirectories_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("build")).unwrap();
        touch(temp.path(), "pkg.whl", 1);

        let all = select(temp.path(), SelectionMode::All).unwrap();
        assert_eq!(names(&all), vec!["pkg.whl"]);

        let only_dirs = TempDir::new().unwrap();
        fs::create_dir(only_dirs.path().join("nested")).unwrap();
        assert!(matches!(
            select(only_dirs.path(), SelectionMode::Latest),
            Err(ReleaseError::EmptyDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg.whl", 1);
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("link")).unwrap();

        let all = select(temp.path(), SelectionMode::All).unwrap();
        assert_eq!(names(&all), vec!["pkg.whl"]);
    }

    #[test]
    fn test_exclude_names_and_patterns() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg-1.0.tar.gz", 10);
        touch(temp.path(), "pkg-1.0.tar.gz.asc", 30);
        touch(temp.path(), "pkg-1.0-py3-none-any.whl", 20);
        touch(temp.path(), "README.txt", 40);

        let filter = ArtifactFilter::new([".asc"], [r"[A-Z]+\."]).unwrap();
        let directory = ArtifactDirectory::read_filtered(temp.path(), &filter).unwrap();

        assert_eq!(
            names(&directory.select(SelectionMode::All).unwrap()),
            vec!["pkg-1.0-py3-none-any.whl", "pkg-1.0.tar.gz"]
        );
        assert_eq!(
            names(&directory.select(SelectionMode::Latest).unwrap()),
            vec!["pkg-1.0-py3-none-any.whl"]
        );
    }

    #[test]
    fn test_exclude_pattern_is_anchored_at_start() {
        let filter = ArtifactFilter::new(Vec::<String>::new(), ["whl"]).unwrap();

        assert!(filter.excludes(OsStr::new("whl-tools.tar.gz")));
        assert!(!filter.excludes(OsStr::new("pkg.whl")));
    }

    #[test]
    fn test_exclude_everything_is_empty_for_latest() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg.whl.asc", 1);

        let filter = ArtifactFilter::new(["asc"], Vec::<String>::new()).unwrap();
        let directory = ArtifactDirectory::read_filtered(temp.path(), &filter).unwrap();

        assert!(directory.is_empty());
        assert!(matches!(
            directory.select(SelectionMode::Latest),
            Err(ReleaseError::EmptyDirectory { .. })
        ));
    }

    #[test]
    fn test_empty_filter_entries_are_ignored() {
        let filter = ArtifactFilter::new([""], [""]).unwrap();

        assert!(filter.is_empty());
        assert!(!filter.excludes(OsStr::new("pkg.whl")));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = ArtifactFilter::new(Vec::<String>::new(), ["pkg-("]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "pkg-("));
    }

    #[test]
    fn test_selection_mode_parse() {
        assert_eq!("all".parse::<SelectionMode>().unwrap(), SelectionMode::All);
        assert_eq!(" Latest ".parse::<SelectionMode>().unwrap(), SelectionMode::Latest);
        assert!("newest".parse::<SelectionMode>().is_err());
        assert_eq!(SelectionMode::default(), SelectionMode::All);
        assert_eq!(SelectionMode::Latest.to_string(), "latest");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_all_returns_every_file(
            files in proptest::collection::btree_map("[a-z]{1,8}\\.whl", 0i64..1_000, 1..8)
        ) {
            let temp = TempDir::new().unwrap();
            for (name, mtime) in &files {
                touch(temp.path(), name, *mtime);
            }

            let all = select(temp.path(), SelectionMode::All).unwrap();
            let expected: Vec<String> = files.keys().cloned().collect();
            prop_assert_eq!(names(&all), expected);
        }

        #[test]
        fn prop_latest_has_maximum_mtime(
            files in proptest::collection::btree_map("[a-z]{1,8}\\.whl", 0i64..50, 1..8)
        ) {
            let temp = TempDir::new().unwrap();
            for (name, mtime) in &files {
                touch(temp.path(), name, *mtime);
            }

            let latest = select(temp.path(), SelectionMode::Latest).unwrap();
            prop_assert_eq!(latest.len(), 1);

            let chosen = names(&latest).remove(0);
            let max = files.values().copied().max().unwrap();
            prop_assert_eq!(files[&chosen], max);

            let greatest_at_max = files
                .iter()
                .filter(|(_, m)| **m == max)
                .map(|(n, _)| n)
                .max()
                .unwrap();
            prop_assert_eq!(&chosen, greatest_at_max);
        }
    }
}
