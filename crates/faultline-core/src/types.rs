use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A parsed class or method with its source line range and qualified name.
///
/// Ranges are inclusive and 1-indexed. One `Component` is produced per
/// method or constructor; the owning class is carried in `class_path`,
/// dot-joined for nested classes (`"Outer.Inner"`). Components are produced
/// fresh on every parse call and never persisted.
///
/// # Examples
///
/// ```
/// use faultline_core::Component;
///
/// let c = Component {
///     start_line: 9,
///     end_line: 11,
///     class_path: "Api".into(),
///     method: "getUrl".into(),
/// };
/// assert!(c.start_line <= c.end_line);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// First line of the component (1-indexed, inclusive).
    pub start_line: u32,
    /// Last line of the component (1-indexed, inclusive).
    pub end_line: u32,
    /// Dot-joined qualified class path owning this method.
    pub class_path: String,
    /// Method or constructor name.
    pub method: String,
}

impl Component {
    /// Returns `true` if the inclusive line interval `[start, end]`
    /// intersects this component's range.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::Component;
    ///
    /// let c = Component { start_line: 10, end_line: 20, class_path: "A".into(), method: "m".into() };
    /// assert!(c.overlaps(15, 25));
    /// assert!(c.overlaps(1, 100));
    /// assert!(!c.overlaps(21, 30));
    /// ```
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start <= self.end_line && end >= self.start_line
    }
}

/// Direction of an edit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Lines present only in the new version.
    Added,
    /// Lines present only in the old version.
    Removed,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditKind::Added => write!(f, "added"),
            EditKind::Removed => write!(f, "removed"),
        }
    }
}

/// A maximal contiguous span of purely-added or purely-removed lines.
///
/// `start` and `end` are inclusive, in the line numbering of the version
/// the run belongs to: the new version for added runs, the old version for
/// removed runs.
///
/// # Examples
///
/// ```
/// use faultline_core::{EditKind, EditRun};
///
/// let run = EditRun { kind: EditKind::Removed, start: 1, end: 10 };
/// assert_eq!(run.kind, EditKind::Removed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRun {
    /// Whether the run's lines were added or removed.
    pub kind: EditKind,
    /// First line of the run (1-indexed, inclusive).
    pub start: u32,
    /// Last line of the run (1-indexed, inclusive).
    pub end: u32,
}

/// Classification of a structural change. Exactly one per change record.
///
/// # Examples
///
/// ```
/// use faultline_core::ChangeOp;
///
/// let op: ChangeOp = "renamed".parse().unwrap();
/// assert_eq!(op, ChangeOp::Renamed);
/// assert_eq!(op.to_string(), "renamed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    /// Entity exists only in the new version.
    Added,
    /// Entity exists only in the old version.
    Removed,
    /// Entity exists in both versions with differing content.
    Modified,
    /// File moved to a new path (files only).
    Renamed,
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOp::Added => write!(f, "added"),
            ChangeOp::Removed => write!(f, "removed"),
            ChangeOp::Modified => write!(f, "modified"),
            ChangeOp::Renamed => write!(f, "renamed"),
        }
    }
}

impl FromStr for ChangeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" => Ok(ChangeOp::Added),
            "removed" => Ok(ChangeOp::Removed),
            "modified" => Ok(ChangeOp::Modified),
            "renamed" => Ok(ChangeOp::Renamed),
            other => Err(format!("unknown change operation: {other}")),
        }
    }
}

/// A file-level change record.
///
/// Both paths are set only for renames; additions carry `new_path` only and
/// removals carry `old_path` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Path in the old version, if the file existed there.
    pub old_path: Option<String>,
    /// Path in the new version, if the file still exists.
    pub new_path: Option<String>,
    /// The single operation describing this change.
    pub op: ChangeOp,
}

impl FileChange {
    /// The path this record is best known by: the new path where present,
    /// otherwise the old one.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::{ChangeOp, FileChange};
    ///
    /// let gone = FileChange { old_path: Some("Old.java".into()), new_path: None, op: ChangeOp::Removed };
    /// assert_eq!(gone.path(), "Old.java");
    /// ```
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }
}

/// A class-level change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassChange {
    /// File the class lives in (the new-version path).
    pub file: String,
    /// Dot-joined qualified class path.
    pub class_path: String,
    /// The single operation describing this change.
    pub op: ChangeOp,
}

/// A method-level change record.
///
/// Identity is the `(class_path, method)` pair: name-based, blind to
/// parameter signatures, so overloads sharing a name collapse into one
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodChange {
    /// File the method lives in (the new-version path).
    pub file: String,
    /// Dot-joined qualified class path owning the method.
    pub class_path: String,
    /// Method or constructor name.
    pub method: String,
    /// The single operation describing this change.
    pub op: ChangeOp,
}

/// A structural change at file, class, or method granularity.
///
/// # Examples
///
/// ```
/// use faultline_core::{Change, ChangeOp, FileChange};
///
/// let change = Change::File(FileChange {
///     old_path: None,
///     new_path: Some("src/Api.java".into()),
///     op: ChangeOp::Added,
/// });
/// assert_eq!(change.path(), "src/Api.java");
///
/// let json = serde_json::to_value(&change).unwrap();
/// assert_eq!(json["kind"], "file");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Change {
    /// A file-level record.
    File(FileChange),
    /// A class-level record.
    Class(ClassChange),
    /// A method-level record.
    Method(MethodChange),
}

impl Change {
    /// The file path this change touches.
    pub fn path(&self) -> &str {
        match self {
            Change::File(f) => f.path(),
            Change::Class(c) => &c.file,
            Change::Method(m) => &m.file,
        }
    }

    /// The operation carried by this record.
    pub fn op(&self) -> ChangeOp {
        match self {
            Change::File(f) => f.op,
            Change::Class(c) => c.op,
            Change::Method(m) => m.op,
        }
    }
}

/// One extracted commit with its ordered change records.
///
/// Created once by the extraction pipeline and immutable afterward. A
/// commit that contributes zero changes is omitted from the extracted
/// sequence rather than represented as empty.
///
/// # Examples
///
/// ```
/// use faultline_core::Commit;
///
/// let commit = Commit {
///     id: "abc123".into(),
///     message: "fix: handle null".into(),
///     author: "alice@example.com".into(),
///     timestamp: 1700000000,
///     changes: vec![],
/// };
/// assert_eq!(commit.author, "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit id.
    pub id: String,
    /// Full commit message.
    pub message: String,
    /// Author email.
    pub author: String,
    /// Commit time as a unix timestamp.
    pub timestamp: i64,
    /// Ordered change records.
    pub changes: Vec<Change>,
}

impl Commit {
    /// The set of distinct file paths this commit's records touch.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::{Change, ChangeOp, Commit, FileChange};
    ///
    /// let commit = Commit {
    ///     id: "c1".into(),
    ///     message: "m".into(),
    ///     author: "a".into(),
    ///     timestamp: 0,
    ///     changes: vec![Change::File(FileChange {
    ///         old_path: None,
    ///         new_path: Some("X.java".into()),
    ///         op: ChangeOp::Added,
    ///     })],
    /// };
    /// assert!(commit.touched_files().contains("X.java"));
    /// ```
    pub fn touched_files(&self) -> BTreeSet<&str> {
        self.changes.iter().map(Change::path).collect()
    }
}

/// A fully extracted repository history.
///
/// `commits` is chronologically ascending. `created_at` and `evaluated_at`
/// are the earliest and latest commit timestamps of the *full* history,
/// even when extraction was capped. `current_files` is the set of in-scope
/// source paths in the newest snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Extracted commits, oldest first.
    pub commits: Vec<Commit>,
    /// Timestamp of the earliest commit in the history.
    pub created_at: i64,
    /// Timestamp of the latest commit in the history.
    pub evaluated_at: i64,
    /// In-scope source file paths present in the newest snapshot.
    pub current_files: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_op_from_str() {
        assert_eq!("added".parse::<ChangeOp>().unwrap(), ChangeOp::Added);
        assert_eq!("Removed".parse::<ChangeOp>().unwrap(), ChangeOp::Removed);
        assert_eq!(
            "MODIFIED".parse::<ChangeOp>().unwrap(),
            ChangeOp::Modified
        );
        assert!("replaced".parse::<ChangeOp>().is_err());
    }

    #[test]
    fn change_op_roundtrips_through_json() {
        let json = serde_json::to_string(&ChangeOp::Modified).unwrap();
        assert_eq!(json, "\"modified\"");
        let parsed: ChangeOp = serde_json::from_str("\"renamed\"").unwrap();
        assert_eq!(parsed, ChangeOp::Renamed);
    }

    #[test]
    fn component_overlap_is_inclusive() {
        let c = Component {
            start_line: 10,
            end_line: 20,
            class_path: "A".into(),
            method: "m".into(),
        };
        assert!(c.overlaps(20, 30), "boundary touch counts");
        assert!(c.overlaps(5, 10), "boundary touch counts");
        assert!(c.overlaps(12, 15), "containment counts");
        assert!(c.overlaps(1, 100), "run spanning the component counts");
        assert!(!c.overlaps(21, 25));
        assert!(!c.overlaps(1, 9));
    }

    #[test]
    fn file_change_path_prefers_new_side() {
        let renamed = FileChange {
            old_path: Some("Old.java".into()),
            new_path: Some("New.java".into()),
            op: ChangeOp::Renamed,
        };
        assert_eq!(renamed.path(), "New.java");
    }

    #[test]
    fn change_serializes_with_kind_tag() {
        let change = Change::Method(MethodChange {
            file: "Api.java".into(),
            class_path: "Api".into(),
            method: "getUrl".into(),
            op: ChangeOp::Modified,
        });
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "method");
        assert_eq!(json["classPath"], "Api");
        assert_eq!(json["op"], "modified");
    }

    #[test]
    fn touched_files_dedups_across_granularities() {
        let commit = Commit {
            id: "c1".into(),
            message: "m".into(),
            author: "a".into(),
            timestamp: 0,
            changes: vec![
                Change::File(FileChange {
                    old_path: Some("Api.java".into()),
                    new_path: Some("Api.java".into()),
                    op: ChangeOp::Modified,
                }),
                Change::Method(MethodChange {
                    file: "Api.java".into(),
                    class_path: "Api".into(),
                    method: "getUrl".into(),
                    op: ChangeOp::Modified,
                }),
            ],
        };
        assert_eq!(commit.touched_files().len(), 1);
    }
}
