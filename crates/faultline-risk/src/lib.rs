//! Time-decayed, bug-fix-weighted risk aggregation.
//!
//! A pure pass over an extracted [`Repository`]: every bug-fixing commit
//! adds a recency weight to the score of each current file it touched.
//! Early-history fixes weigh near zero; fixes at the evaluation instant
//! weigh 0.5, and the weight saturates toward 1 past it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use faultline_core::Repository;
use regex::Regex;

/// Whether a commit message marks a defect repair.
///
/// Case-insensitive presence of `bug` or `fix` as a substring; by design
/// this also matches words that merely contain them.
///
/// # Examples
///
/// ```
/// use faultline_risk::is_bug_fixing;
///
/// assert!(is_bug_fixing("fix null pointer"));
/// assert!(is_bug_fixing("BUGFIX: off by one"));
/// assert!(is_bug_fixing("Prefix every log line"));
/// assert!(!is_bug_fixing("add feature flag"));
/// ```
pub fn is_bug_fixing(message: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new("(?i)bug|fix").expect("bug pattern"))
        .is_match(message)
}

/// Logistic recency weight with its inflection at the evaluation instant.
///
/// `w(x) = 1 / (1 + e^(-12x + 12))` over the normalized history position
/// `x`: near zero for early history, exactly 0.5 at `x = 1`, saturating
/// toward 1 beyond it.
///
/// # Examples
///
/// ```
/// use faultline_risk::time_weight;
///
/// assert!(time_weight(0.0) < 0.001);
/// assert_eq!(time_weight(1.0), 0.5);
/// assert!(time_weight(2.0) > 0.999);
/// ```
pub fn time_weight(x: f64) -> f64 {
    1.0 / (1.0 + (-12.0 * x + 12.0).exp())
}

/// A commit's normalized position in the repository's lifetime.
///
/// 0 at `created_at`, 1 at `evaluated_at`. A single-instant history
/// resolves to 1 rather than dividing by zero.
fn normalized_position(created_at: i64, evaluated_at: i64, timestamp: i64) -> f64 {
    let span = evaluated_at - created_at;
    if span <= 0 {
        return 1.0;
    }
    (timestamp - created_at) as f64 / span as f64
}

/// Aggregate per-file risk scores from bug-fixing commits.
///
/// The map is seeded at 0.0 for every current file and mutated only
/// additively: each bug-fixing commit adds its recency weight to every
/// file its change records touch, provided that path is still a current
/// file. Paths outside the current snapshot are silently ignored. The
/// final map is not normalized; ranking and scaling are caller concerns.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use faultline_core::Repository;
/// use faultline_risk::analyze;
///
/// let repo = Repository {
///     commits: vec![],
///     created_at: 0,
///     evaluated_at: 100,
///     current_files: BTreeSet::from(["X.java".to_string()]),
/// };
/// let scores = analyze(&repo);
/// assert_eq!(scores["X.java"], 0.0);
/// ```
pub fn analyze(repository: &Repository) -> BTreeMap<String, f64> {
    let mut scores: BTreeMap<String, f64> = repository
        .current_files
        .iter()
        .map(|path| (path.clone(), 0.0))
        .collect();

    for commit in &repository.commits {
        if !is_bug_fixing(&commit.message) {
            continue;
        }
        let x = normalized_position(
            repository.created_at,
            repository.evaluated_at,
            commit.timestamp,
        );
        let weight = time_weight(x);
        for file in commit.touched_files() {
            if let Some(score) = scores.get_mut(file) {
                *score += weight;
            }
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{Change, ChangeOp, Commit, FileChange};
    use std::collections::BTreeSet;

    fn touch(path: &str) -> Change {
        Change::File(FileChange {
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            op: ChangeOp::Modified,
        })
    }

    fn commit(message: &str, timestamp: i64, paths: &[&str]) -> Commit {
        Commit {
            id: format!("id_{timestamp}"),
            message: message.into(),
            author: "alice@example.com".into(),
            timestamp,
            changes: paths.iter().map(|p| touch(p)).collect(),
        }
    }

    fn repo(commits: Vec<Commit>, created_at: i64, evaluated_at: i64, files: &[&str]) -> Repository {
        Repository {
            commits,
            created_at,
            evaluated_at,
            current_files: files.iter().map(|f| f.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn weight_bounds_hold() {
        assert!(time_weight(0.0) < 0.001);
        assert_eq!(time_weight(1.0), 0.5);
        assert!(time_weight(1.5) > 0.99);
        assert!(time_weight(3.0) > 0.999_999);
        assert!(time_weight(0.5) < 0.01);
    }

    #[test]
    fn bug_fixing_is_a_case_insensitive_substring_test() {
        assert!(is_bug_fixing("Fix crash on empty input"));
        assert!(is_bug_fixing("debug logging for the bug tracker"));
        assert!(is_bug_fixing("HOTFIX"));
        assert!(!is_bug_fixing("refactor module layout"));
    }

    #[test]
    fn fix_commit_at_evaluation_time_scores_half() {
        let commits = vec![
            commit("introduce API", 1000, &["X.java"]),
            commit("fix null pointer", 2000, &["X.java"]),
        ];
        let repository = repo(commits, 1000, 2000, &["X.java", "Other.java"]);
        let scores = analyze(&repository);

        assert!((scores["X.java"] - 0.5).abs() < 1e-12);
        assert_eq!(scores["Other.java"], 0.0);
    }

    #[test]
    fn non_current_paths_are_silently_ignored() {
        let commits = vec![commit("fix leak", 2000, &["Gone.java"])];
        let repository = repo(commits, 1000, 2000, &["Kept.java"]);
        let scores = analyze(&repository);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores["Kept.java"], 0.0);
    }

    #[test]
    fn adding_a_fix_commit_never_decreases_a_score() {
        let base = vec![commit("fix parser bug", 1500, &["X.java"])];
        let repository = repo(base.clone(), 1000, 2000, &["X.java"]);
        let before = analyze(&repository)["X.java"];

        let mut extended = base;
        extended.push(commit("fix another bug", 1800, &["X.java"]));
        let repository = repo(extended, 1000, 2000, &["X.java"]);
        let after = analyze(&repository)["X.java"];

        assert!(after >= before);
    }

    #[test]
    fn early_history_fixes_weigh_almost_nothing() {
        let commits = vec![
            commit("fix typo in parser", 1_000, &["X.java"]),
            commit("fix crash", 1_000_000, &["X.java"]),
        ];
        let repository = repo(commits, 1_000, 1_000_000, &["X.java"]);
        let scores = analyze(&repository);

        // Early fix contributes w(0) ~ 6e-6; late fix contributes 0.5.
        assert!(scores["X.java"] > 0.5);
        assert!(scores["X.java"] < 0.501);
    }

    #[test]
    fn single_instant_history_weighs_half() {
        let commits = vec![commit("fix it all", 1000, &["X.java"])];
        let repository = repo(commits, 1000, 1000, &["X.java"]);
        let scores = analyze(&repository);
        assert!((scores["X.java"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scores_accumulate_additively_per_file() {
        let commits = vec![
            commit("fix a", 2000, &["X.java", "Y.java"]),
            commit("fix b", 2000, &["X.java"]),
        ];
        let repository = repo(commits, 1000, 2000, &["X.java", "Y.java"]);
        let scores = analyze(&repository);

        assert!((scores["X.java"] - 1.0).abs() < 1e-12);
        assert!((scores["Y.java"] - 0.5).abs() < 1e-12);
    }
}
