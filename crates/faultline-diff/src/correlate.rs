//! Correlation of edit runs with structural ranges.

use std::collections::BTreeSet;

use faultline_core::{Change, ChangeOp, ClassChange, EditKind, MethodChange};
use faultline_parse::StructureParser;

use crate::edits::edit_runs;

/// One version of a file: its path and raw source.
#[derive(Debug, Clone, Copy)]
pub struct FileVersion<'a> {
    /// Path of this version.
    pub path: &'a str,
    /// Raw source text of this version.
    pub source: &'a str,
}

/// Name-based identity of a method: `(class_path, method)`.
///
/// Blind to parameter signatures, so overloads sharing a name collapse
/// into a single identity.
type MethodKey = (String, String);

/// Classify structural changes between two versions of a file.
///
/// Both versions are parsed with the supplied [`StructureParser`]; line
/// edits are extracted over the raw sources; every removed run marks each
/// before-side component whose range it intersects (inclusive: any
/// partial overlap marks the whole component) and every added run marks
/// after-side components symmetrically. Method records then follow from
/// set algebra over name-based identities, and a class present in both
/// versions is modified iff it owns at least one changed method.
///
/// Identical sources yield an empty list. A side that fails to parse
/// contributes an empty component set, so all of its counterparts classify
/// as added or removed rather than modified.
///
/// # Examples
///
/// ```
/// use faultline_diff::{correlate, FileVersion};
/// use faultline_parse::GrammarJavaParser;
///
/// let old = "public class A {\n    void m() {\n        int x = 1;\n    }\n}\n";
/// let new = "public class A {\n    void m() {\n        int x = 2;\n    }\n}\n";
/// let changes = correlate(
///     &GrammarJavaParser,
///     FileVersion { path: "A.java", source: old },
///     FileVersion { path: "A.java", source: new },
/// );
/// assert_eq!(changes.len(), 2); // the method and its owning class
/// ```
pub fn correlate(
    parser: &dyn StructureParser,
    old: FileVersion<'_>,
    new: FileVersion<'_>,
) -> Vec<Change> {
    if old.source == new.source {
        return Vec::new();
    }

    let components_a = parser.parse(old.source);
    let components_b = parser.parse(new.source);

    let mut touched_a: BTreeSet<MethodKey> = BTreeSet::new();
    let mut touched_b: BTreeSet<MethodKey> = BTreeSet::new();
    for run in edit_runs(old.source, new.source) {
        let (components, touched) = match run.kind {
            EditKind::Removed => (&components_a, &mut touched_a),
            EditKind::Added => (&components_b, &mut touched_b),
        };
        for component in components {
            if component.overlaps(run.start, run.end) {
                touched.insert((component.class_path.clone(), component.method.clone()));
            }
        }
    }

    let methods_a: BTreeSet<MethodKey> = components_a
        .iter()
        .map(|c| (c.class_path.clone(), c.method.clone()))
        .collect();
    let methods_b: BTreeSet<MethodKey> = components_b
        .iter()
        .map(|c| (c.class_path.clone(), c.method.clone()))
        .collect();

    let added: BTreeSet<MethodKey> = methods_b.difference(&methods_a).cloned().collect();
    let removed: BTreeSet<MethodKey> = methods_a.difference(&methods_b).cloned().collect();
    let touched: BTreeSet<MethodKey> = touched_a.union(&touched_b).cloned().collect();
    let modified: BTreeSet<MethodKey> = touched
        .into_iter()
        .filter(|key| !added.contains(key) && !removed.contains(key))
        .collect();

    let mut changes = Vec::new();
    for ((class_path, method), op) in [
        (&added, ChangeOp::Added),
        (&removed, ChangeOp::Removed),
        (&modified, ChangeOp::Modified),
    ]
    .into_iter()
    .flat_map(|(set, op)| set.iter().map(move |key| (key.clone(), op)))
    {
        changes.push(Change::Method(MethodChange {
            file: new.path.to_string(),
            class_path,
            method,
            op,
        }));
    }

    // Class rollup.
    let classes_a: BTreeSet<&str> = methods_a.iter().map(|(c, _)| c.as_str()).collect();
    let classes_b: BTreeSet<&str> = methods_b.iter().map(|(c, _)| c.as_str()).collect();
    let changed_classes: BTreeSet<&str> = added
        .iter()
        .chain(removed.iter())
        .chain(modified.iter())
        .map(|(c, _)| c.as_str())
        .collect();

    for class_path in classes_b.difference(&classes_a) {
        changes.push(class_change(new.path, class_path, ChangeOp::Added));
    }
    for class_path in classes_a.difference(&classes_b) {
        changes.push(class_change(new.path, class_path, ChangeOp::Removed));
    }
    for class_path in classes_a.intersection(&classes_b) {
        if changed_classes.contains(class_path) {
            changes.push(class_change(new.path, class_path, ChangeOp::Modified));
        }
    }

    changes
}

fn class_change(file: &str, class_path: &str, op: ChangeOp) -> Change {
    Change::Class(ClassChange {
        file: file.to_string(),
        class_path: class_path.to_string(),
        op,
    })
}
