//! Per-commit extraction and chronological assembly.

use std::collections::BTreeSet;
use std::path::Path;

use faultline_core::{
    Change, ChangeOp, ClassChange, Commit, FaultlineConfig, FaultlineError, FileChange,
    MethodChange, Repository,
};
use faultline_diff::{correlate, FileVersion};
use faultline_parse::{ParserRegistry, StructureParser};
use git2::{Delta, DiffFindOptions, DiffOptions, ObjectType, Oid, Sort, TreeWalkMode};
use rayon::prelude::*;

use crate::filter::ScopeFilter;

/// Worker count used when the host CPU count cannot be determined.
const FALLBACK_WORKERS: usize = 2;

/// Immutable per-run context handed to every extraction unit.
///
/// Workers share it by reference; there is no process-wide repository
/// state.
struct ExtractContext {
    filter: ScopeFilter,
    registry: ParserRegistry,
    method_granularity: bool,
}

/// Extract the full change history of the repository at `repo_path`.
///
/// Commits are enumerated newest-first, extracted independently (across a
/// worker pool sized to the host CPU count unless `extraction.parallel` is
/// off), and reordered into a chronologically ascending sequence. Commits
/// that contribute no changes, or whose extraction fails on decode or
/// metadata errors, are omitted. The sequential and concurrent paths
/// produce identical results.
///
/// # Errors
///
/// Returns [`FaultlineError::Git`] if the repository cannot be opened or
/// walked, and [`FaultlineError::Concurrency`] if the worker pool cannot
/// be built. Per-commit failures are contained and never surface here.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use faultline_core::FaultlineConfig;
/// use faultline_extract::extract_repository;
///
/// let repo = extract_repository(Path::new("."), &FaultlineConfig::default()).unwrap();
/// for commit in &repo.commits {
///     println!("{}: {} changes", &commit.id[..7], commit.changes.len());
/// }
/// ```
pub fn extract_repository(
    repo_path: &Path,
    config: &FaultlineConfig,
) -> Result<Repository, FaultlineError> {
    let repo = git2::Repository::open(repo_path)
        .map_err(|e| FaultlineError::Git(format!("failed to open repository: {e}")))?;

    let all_ids = walk_history(&repo)?;
    let Some((&newest, &oldest)) = all_ids.first().zip(all_ids.last()) else {
        return Err(FaultlineError::Git("repository has no commits".into()));
    };

    // The repository's lifetime bounds come from the full history even
    // when extraction itself is capped.
    let evaluated_at = commit_time(&repo, newest)?;
    let created_at = commit_time(&repo, oldest)?;

    let ids: Vec<Oid> = match config.extraction.max_commits {
        Some(cap) => all_ids.iter().copied().take(cap).collect(),
        None => all_ids.clone(),
    };

    let ctx = ExtractContext {
        filter: ScopeFilter::new(&config.extraction.ignore_patterns),
        registry: ParserRegistry::from_config(&config.parsing),
        method_granularity: config.extraction.method_granularity,
    };

    let extracted: Vec<Option<Commit>> = if config.extraction.parallel {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count())
            .build()
            .map_err(|e| FaultlineError::Concurrency(format!("failed to build worker pool: {e}")))?;
        let path = repo_path.to_path_buf();
        // git2 handles are not Sync: each worker opens its own read-only
        // handle and reads only its own commits' tree and blob data.
        pool.install(|| {
            ids.par_iter()
                .map_init(
                    || git2::Repository::open(&path),
                    |repo, oid| match repo {
                        Ok(repo) => extract_commit(repo, *oid, &ctx),
                        Err(_) => None,
                    },
                )
                .collect()
        })
    } else {
        ids.iter().map(|oid| extract_commit(&repo, *oid, &ctx)).collect()
    };

    // Enumeration was newest-first; the assembled sequence is ascending.
    let mut commits: Vec<Commit> = extracted.into_iter().flatten().collect();
    commits.reverse();

    let current_files = snapshot_paths(&repo, newest, &ctx.filter)?;

    Ok(Repository {
        commits,
        created_at,
        evaluated_at,
        current_files,
    })
}

fn walk_history(repo: &git2::Repository) -> Result<Vec<Oid>, FaultlineError> {
    let mut revwalk = repo
        .revwalk()
        .map_err(|e| FaultlineError::Git(format!("failed to create revwalk: {e}")))?;
    revwalk.set_sorting(Sort::TIME).ok();
    revwalk
        .push_head()
        .map_err(|e| FaultlineError::Git(format!("failed to push HEAD: {e}")))?;

    let mut ids = Vec::new();
    for oid in revwalk {
        ids.push(oid.map_err(|e| FaultlineError::Git(format!("revwalk error: {e}")))?);
    }
    Ok(ids)
}

fn commit_time(repo: &git2::Repository, oid: Oid) -> Result<i64, FaultlineError> {
    let commit = repo
        .find_commit(oid)
        .map_err(|e| FaultlineError::Git(format!("failed to find commit: {e}")))?;
    Ok(commit.time().seconds())
}

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Extract one commit. Returns `None` when the commit contributes nothing:
/// zero in-scope changes, undecodable blob content, or malformed metadata.
/// Failures never propagate past this unit.
fn extract_commit(repo: &git2::Repository, oid: Oid, ctx: &ExtractContext) -> Option<Commit> {
    let commit = repo.find_commit(oid).ok()?;
    let message = commit.message()?.to_string();
    let author = commit.author().email()?.to_string();
    let timestamp = commit.time().seconds();

    let changes = extract_changes(repo, &commit, ctx).ok()?;
    if changes.is_empty() {
        return None;
    }

    Some(Commit {
        id: oid.to_string(),
        message,
        author,
        timestamp,
        changes,
    })
}

fn extract_changes(
    repo: &git2::Repository,
    commit: &git2::Commit,
    ctx: &ExtractContext,
) -> Result<Vec<Change>, FaultlineError> {
    let mut changes = Vec::new();

    // Root commit: the whole snapshot is an addition and the correlator is
    // never invoked; there is no "before" version.
    if commit.parent_count() == 0 {
        let tree = commit
            .tree()
            .map_err(|e| FaultlineError::Git(format!("failed to get commit tree: {e}")))?;
        for (path, blob_id) in tree_blobs(&tree) {
            if !ctx.filter.in_scope(&path) {
                continue;
            }
            changes.push(Change::File(FileChange {
                old_path: None,
                new_path: Some(path.clone()),
                op: ChangeOp::Added,
            }));
            if ctx.method_granularity {
                if let Some(parser) = ctx.registry.resolve(&path) {
                    let source = blob_text(repo, blob_id, &path)?;
                    push_added_components(parser, &path, &source, &mut changes);
                }
            }
        }
        return Ok(changes);
    }

    for parent_idx in 0..commit.parent_count() {
        let parent = commit
            .parent(parent_idx)
            .map_err(|e| FaultlineError::Git(format!("failed to get parent: {e}")))?;
        let parent_tree = parent
            .tree()
            .map_err(|e| FaultlineError::Git(format!("failed to get parent tree: {e}")))?;
        let tree = commit
            .tree()
            .map_err(|e| FaultlineError::Git(format!("failed to get commit tree: {e}")))?;

        let mut diff = repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut DiffOptions::new()))
            .map_err(|e| FaultlineError::Git(format!("failed to compute diff: {e}")))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))
            .map_err(|e| FaultlineError::Git(format!("failed to find renames: {e}")))?;

        let num_deltas = diff.deltas().len();
        for delta_idx in 0..num_deltas {
            let delta = diff.get_delta(delta_idx).expect("delta index in range");
            let old_path = file_path(&delta.old_file());
            let new_path = file_path(&delta.new_file());

            match delta.status() {
                Delta::Added => {
                    if !ctx.filter.in_scope(&new_path) {
                        continue;
                    }
                    changes.push(Change::File(FileChange {
                        old_path: None,
                        new_path: Some(new_path.clone()),
                        op: ChangeOp::Added,
                    }));
                    if ctx.method_granularity {
                        if let Some(parser) = ctx.registry.resolve(&new_path) {
                            let source = blob_text(repo, delta.new_file().id(), &new_path)?;
                            push_added_components(parser, &new_path, &source, &mut changes);
                        }
                    }
                }
                Delta::Deleted => {
                    if !ctx.filter.in_scope(&old_path) {
                        continue;
                    }
                    changes.push(Change::File(FileChange {
                        old_path: Some(old_path.clone()),
                        new_path: None,
                        op: ChangeOp::Removed,
                    }));
                }
                Delta::Renamed => {
                    if !ctx.filter.in_scope(&new_path) {
                        continue;
                    }
                    changes.push(Change::File(FileChange {
                        old_path: Some(old_path.clone()),
                        new_path: Some(new_path.clone()),
                        op: ChangeOp::Renamed,
                    }));
                    // A pure move carries no content change to correlate.
                    if delta.old_file().id() != delta.new_file().id() && ctx.method_granularity {
                        if let Some(parser) = ctx.registry.resolve(&new_path) {
                            let source_a = blob_text(repo, delta.old_file().id(), &old_path)?;
                            let source_b = blob_text(repo, delta.new_file().id(), &new_path)?;
                            changes.extend(correlate(
                                parser,
                                FileVersion {
                                    path: &old_path,
                                    source: &source_a,
                                },
                                FileVersion {
                                    path: &new_path,
                                    source: &source_b,
                                },
                            ));
                        }
                    }
                }
                _ => {
                    // Modified in place (and the rarer statuses treated as
                    // such).
                    if !ctx.filter.in_scope(&old_path) && !ctx.filter.in_scope(&new_path) {
                        continue;
                    }
                    changes.push(Change::File(FileChange {
                        old_path: Some(old_path.clone()),
                        new_path: Some(new_path.clone()),
                        op: ChangeOp::Modified,
                    }));
                    if ctx.method_granularity {
                        if let Some(parser) = ctx.registry.resolve(&new_path) {
                            let source_a = blob_text(repo, delta.old_file().id(), &old_path)?;
                            let source_b = blob_text(repo, delta.new_file().id(), &new_path)?;
                            changes.extend(correlate(
                                parser,
                                FileVersion {
                                    path: &old_path,
                                    source: &source_a,
                                },
                                FileVersion {
                                    path: &new_path,
                                    source: &source_b,
                                },
                            ));
                        }
                    }
                }
            }
        }
    }

    Ok(changes)
}

/// Emit added method records and the added classes that own them, in
/// name-based identity terms (overloads collapse).
fn push_added_components(
    parser: &dyn StructureParser,
    path: &str,
    source: &str,
    changes: &mut Vec<Change>,
) {
    let components = parser.parse(source);

    let methods: BTreeSet<(&str, &str)> = components
        .iter()
        .map(|c| (c.class_path.as_str(), c.method.as_str()))
        .collect();
    for (class_path, method) in &methods {
        changes.push(Change::Method(MethodChange {
            file: path.to_string(),
            class_path: (*class_path).to_string(),
            method: (*method).to_string(),
            op: ChangeOp::Added,
        }));
    }

    let classes: BTreeSet<&str> = components.iter().map(|c| c.class_path.as_str()).collect();
    for class_path in classes {
        changes.push(Change::Class(ClassChange {
            file: path.to_string(),
            class_path: class_path.to_string(),
            op: ChangeOp::Added,
        }));
    }
}

fn blob_text(repo: &git2::Repository, id: Oid, path: &str) -> Result<String, FaultlineError> {
    let blob = repo
        .find_blob(id)
        .map_err(|e| FaultlineError::Git(format!("failed to read blob for {path}: {e}")))?;
    let text = std::str::from_utf8(blob.content())
        .map_err(|_| FaultlineError::Decode(format!("{path} is not valid UTF-8")))?;
    Ok(text.to_string())
}

fn file_path(file: &git2::DiffFile) -> String {
    file.path()
        .unwrap_or(Path::new(""))
        .to_string_lossy()
        .to_string()
}

fn tree_blobs(tree: &git2::Tree) -> Vec<(String, Oid)> {
    let mut blobs = Vec::new();
    let _ = tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            if let Some(name) = entry.name() {
                blobs.push((format!("{dir}{name}"), entry.id()));
            }
        }
        0
    });
    blobs
}

fn snapshot_paths(
    repo: &git2::Repository,
    head: Oid,
    filter: &ScopeFilter,
) -> Result<BTreeSet<String>, FaultlineError> {
    let commit = repo
        .find_commit(head)
        .map_err(|e| FaultlineError::Git(format!("failed to find commit: {e}")))?;
    let tree = commit
        .tree()
        .map_err(|e| FaultlineError::Git(format!("failed to get commit tree: {e}")))?;
    Ok(tree_blobs(&tree)
        .into_iter()
        .map(|(path, _)| path)
        .filter(|path| filter.in_scope(path))
        .collect())
}
