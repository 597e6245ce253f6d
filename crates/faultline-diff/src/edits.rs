//! Line-level edit-sequence extraction.

use faultline_core::{EditKind, EditRun};
use similar::{ChangeTag, TextDiff};

/// Run-scanner state: at most one run is open, in one direction.
#[derive(Clone, Copy)]
enum RunState {
    Closed,
    Open { kind: EditKind, start: u32 },
}

/// Extract ordered edit runs between two text versions.
///
/// Lines are aligned with an LCS-based diff and classified as unchanged,
/// added, or removed. Two counters track the position in each version: the
/// old-side counter advances on removed and unchanged lines, the new-side
/// counter on added and unchanged lines. Consecutive same-direction lines
/// coalesce into one run; a run closes when the direction changes, an
/// unchanged line appears, or input ends, fixing `end` to its own side's
/// counter at closure. Adjacent opposite-direction runs are emitted
/// independently, never merged into a single replace entry.
///
/// # Examples
///
/// ```
/// use faultline_core::EditKind;
/// use faultline_diff::edit_runs;
///
/// let runs = edit_runs("a\nb\nc\n", "a\nx\nc\n");
/// assert_eq!(runs.len(), 2);
/// assert_eq!((runs[0].kind, runs[0].start, runs[0].end), (EditKind::Removed, 2, 2));
/// assert_eq!((runs[1].kind, runs[1].start, runs[1].end), (EditKind::Added, 2, 2));
///
/// assert!(edit_runs("same\n", "same\n").is_empty());
/// ```
pub fn edit_runs(old: &str, new: &str) -> Vec<EditRun> {
    let diff = TextDiff::from_lines(old, new);
    let mut runs = Vec::new();
    let mut state = RunState::Closed;
    let mut line_a: u32 = 0;
    let mut line_b: u32 = 0;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => {
                if let RunState::Open {
                    kind: EditKind::Added,
                    start,
                } = state
                {
                    runs.push(EditRun {
                        kind: EditKind::Added,
                        start,
                        end: line_b,
                    });
                    state = RunState::Closed;
                }
                line_a += 1;
                if let RunState::Closed = state {
                    state = RunState::Open {
                        kind: EditKind::Removed,
                        start: line_a,
                    };
                }
            }
            ChangeTag::Insert => {
                if let RunState::Open {
                    kind: EditKind::Removed,
                    start,
                } = state
                {
                    runs.push(EditRun {
                        kind: EditKind::Removed,
                        start,
                        end: line_a,
                    });
                    state = RunState::Closed;
                }
                line_b += 1;
                if let RunState::Closed = state {
                    state = RunState::Open {
                        kind: EditKind::Added,
                        start: line_b,
                    };
                }
            }
            ChangeTag::Equal => {
                if let RunState::Open { kind, start } = state {
                    runs.push(close_run(kind, start, line_a, line_b));
                    state = RunState::Closed;
                }
                line_a += 1;
                line_b += 1;
            }
        }
    }

    // End of input while a run is open closes it at the current counter.
    if let RunState::Open { kind, start } = state {
        runs.push(close_run(kind, start, line_a, line_b));
    }

    runs
}

fn close_run(kind: EditKind, start: u32, line_a: u32, line_b: u32) -> EditRun {
    let end = match kind {
        EditKind::Added => line_b,
        EditKind::Removed => line_a,
    };
    EditRun { kind, start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_yield_no_runs() {
        let text = "alpha\nbeta\ngamma\n";
        assert!(edit_runs(text, text).is_empty());
        assert!(edit_runs("", "").is_empty());
    }

    #[test]
    fn replaced_line_emits_two_independent_runs() {
        let runs = edit_runs("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(
            runs,
            vec![
                EditRun {
                    kind: EditKind::Removed,
                    start: 2,
                    end: 2
                },
                EditRun {
                    kind: EditKind::Added,
                    start: 2,
                    end: 2
                },
            ]
        );
    }

    #[test]
    fn trailing_addition_closes_at_end_of_input() {
        let runs = edit_runs("a\n", "a\nb\nc\n");
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Added,
                start: 2,
                end: 3
            }]
        );
    }

    #[test]
    fn trailing_removal_closes_at_end_of_input() {
        let runs = edit_runs("a\nb\nc\n", "a\n");
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Removed,
                start: 2,
                end: 3
            }]
        );
    }

    #[test]
    fn consecutive_same_direction_lines_coalesce() {
        let runs = edit_runs("a\nd\n", "a\nb\nc\nd\n");
        assert_eq!(
            runs,
            vec![EditRun {
                kind: EditKind::Added,
                start: 2,
                end: 3
            }]
        );
    }

    #[test]
    fn separated_edits_emit_separate_runs() {
        let runs = edit_runs("a\nb\nc\nd\ne\n", "a\nX\nc\nd\nY\n");
        assert_eq!(runs.len(), 4);
        assert_eq!(
            runs.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![
                EditKind::Removed,
                EditKind::Added,
                EditKind::Removed,
                EditKind::Added
            ]
        );
        // Second replacement sits at line 5 in both numberings.
        assert_eq!((runs[2].start, runs[2].end), (5, 5));
        assert_eq!((runs[3].start, runs[3].end), (5, 5));
    }

    #[test]
    fn runs_use_their_own_versions_numbering() {
        // Two lines inserted before a removal shift the numberings apart.
        let runs = edit_runs("a\nb\nz\n", "x\ny\na\nz\n");
        let added: Vec<_> = runs.iter().filter(|r| r.kind == EditKind::Added).collect();
        let removed: Vec<_> = runs
            .iter()
            .filter(|r| r.kind == EditKind::Removed)
            .collect();
        assert_eq!((added[0].start, added[0].end), (1, 2));
        assert_eq!((removed[0].start, removed[0].end), (2, 2));
    }
}
