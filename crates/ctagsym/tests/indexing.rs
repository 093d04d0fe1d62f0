//! Integration tests for loading, merging, querying, and resolving tags.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use ctagsym::{
    MatchMode, Position, Settings, SymbolProvider, TagIndex, TargetAddress, resolve,
};
use tempfile::TempDir;

/// Create a temporary project root with the given files.
fn workspace_with_files(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("failed to write file");
    }
    dir
}

/// Push the file's modification time into the future so the next staleness
/// check sees it as changed regardless of filesystem timestamp resolution.
fn touch_later(path: &Path) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("failed to open file");
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .expect("failed to set mtime");
}

fn roots(dirs: &[&TempDir]) -> Vec<PathBuf> {
    dirs.iter().map(|dir| dir.path().to_path_buf()).collect()
}

const A_C: &str = "int x;\n\nint y;\n\nint something(void);\nint z;\n";

// -- End-to-end scenarios --

#[test]
fn query_then_resolve_line_and_pattern_addresses() {
    let dir = workspace_with_files(&[
        (".tags", "foo\tsrc/a.c\t12\nbar\tsrc/a.c\t?something?\n"),
        ("src/a.c", A_C),
    ]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());

    let found = provider.query("fo", MatchMode::Substring).expect("query failed");
    assert_eq!(found.len(), 1);
    let foo = &found[0];
    assert_eq!(foo.name, "foo");
    assert!(!foo.is_resolved(), "query results must be unresolved");
    assert_eq!(foo.source_path, dir.path().join("src/a.c"));

    let foo = resolve(foo).expect("resolve foo failed");
    assert_eq!(foo.location, Some(Position::new(11, 0)));

    let bar = provider.query("bar", MatchMode::Substring).expect("query failed");
    assert_eq!(bar.len(), 1);
    let bar = resolve(&bar[0]).expect("resolve bar failed");
    assert_eq!(bar.location, Some(Position::new(4, 0)));
}

#[test]
fn two_roots_keep_duplicates_unless_hidden() {
    let first = workspace_with_files(&[("src/a.c", A_C)]);
    let shared = first.path().join("src/a.c");
    fs::write(first.path().join(".tags"), "foo\tsrc/a.c\t3\n").expect("failed to write tags");
    let second = workspace_with_files(&[(
        ".tags",
        &format!("foo\t{}\t5\n", shared.display()),
    )]);

    let visible = SymbolProvider::new(roots(&[&first, &second]), Settings::default());
    let found = visible.query("foo", MatchMode::Substring).expect("query failed");
    assert_eq!(found.len(), 2, "both records kept without deduplication");

    let hidden = SymbolProvider::new(
        roots(&[&first, &second]),
        Settings {
            hide_duplicate_tags: true,
            ..Settings::default()
        },
    );
    let found = hidden.query("foo", MatchMode::Substring).expect("query failed");
    assert_eq!(found.len(), 1, "duplicates collapse to one record");
    assert_eq!(
        found[0].address,
        TargetAddress::LineNumber(3),
        "the record from the first root wins"
    );
}

#[test]
fn two_roots_with_distinct_files_are_both_kept_when_deduplicating() {
    let first = workspace_with_files(&[(".tags", "foo\ta.c\t1\n")]);
    let second = workspace_with_files(&[(".tags", "foo\tb.c\t1\n")]);
    let provider = SymbolProvider::new(
        roots(&[&first, &second]),
        Settings {
            hide_duplicate_tags: true,
            ..Settings::default()
        },
    );

    let found = provider.query("foo", MatchMode::Substring).expect("query failed");
    assert_eq!(found.len(), 2);
}

#[test]
fn max_number_of_symbols_keeps_first_by_name() {
    let dir = workspace_with_files(&[(".tags", "parse_line\tp.rs\t9\nparse_address\tp.rs\t3\n")]);
    let provider = SymbolProvider::new(
        roots(&[&dir]),
        Settings {
            max_number_of_symbols: 1,
            ..Settings::default()
        },
    );

    let found = provider.query("parse", MatchMode::Substring).expect("query failed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "parse_address");
}

#[test]
fn short_query_does_not_load_tags() {
    let dir = workspace_with_files(&[(".tags", "foo\ta.c\t1\n")]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());

    let found = provider.query("f", MatchMode::Substring).expect("query failed");

    assert!(found.is_empty());
    assert_eq!(provider.with_index(|index| index.caches().count()), 0);
}

#[test]
fn regex_query_matches_case_insensitively() {
    let dir = workspace_with_files(&[(".tags", "ReadConfig\tc.rs\t1\nread_cache\tc.rs\t2\nwrite\tc.rs\t3\n")]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());

    let found = provider.query("^read", MatchMode::Regex).expect("query failed");
    let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();

    assert_eq!(names, ["ReadConfig", "read_cache"]);
}

#[test]
fn invalid_regex_is_an_error() {
    let dir = workspace_with_files(&[(".tags", "foo\ta.c\t1\n")]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());

    let result = provider.query("foo(", MatchMode::Regex);

    assert!(matches!(result, Err(ctagsym::Error::Query(_))));
}

// -- Staleness --

#[test]
fn refresh_without_changes_is_idempotent() {
    let dir = workspace_with_files(&[(".tags", "foo\ta.c\t1\nbar\ta.c\t2\n")]);
    let roots = roots(&[&dir]);
    let mut index = TagIndex::new();

    let first = index.refresh(&roots, ".tags", false);
    assert_eq!(first.rebuilt, roots);
    assert!(first.changed);
    let loaded_at = index.cache_for(dir.path()).expect("cache missing").loaded_at();
    let entries = index.entries().to_vec();

    let second = index.refresh(&roots, ".tags", false);

    assert!(second.rebuilt.is_empty());
    assert!(!second.changed);
    assert_eq!(
        index.cache_for(dir.path()).expect("cache missing").loaded_at(),
        loaded_at
    );
    assert_eq!(index.entries(), entries.as_slice());
}

#[test]
fn modified_tags_file_is_reloaded() {
    let dir = workspace_with_files(&[(".tags", "foo\ta.c\t1\n")]);
    let roots = roots(&[&dir]);
    let mut index = TagIndex::new();
    index.refresh(&roots, ".tags", false);

    let tags = dir.path().join(".tags");
    fs::write(&tags, "foo\ta.c\t1\nfresh\ta.c\t2\n").expect("failed to rewrite tags");
    touch_later(&tags);

    let outcome = index.refresh(&roots, ".tags", false);

    assert_eq!(outcome.rebuilt, roots);
    let names: Vec<&str> = index.entries().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["foo", "fresh"]);
}

#[test]
fn missing_tags_file_provides_no_symbols_until_created() {
    let dir = workspace_with_files(&[]);
    let roots = roots(&[&dir]);
    let mut index = TagIndex::new();

    index.refresh(&roots, ".tags", false);
    let cache = index.cache_for(dir.path()).expect("cache missing");
    assert!(cache.entries().is_empty());
    assert!(cache.read_error().is_some());

    assert!(
        index.refresh(&roots, ".tags", false).rebuilt.is_empty(),
        "a missing file is not re-read on every refresh"
    );

    let tags = dir.path().join(".tags");
    fs::write(&tags, "foo\ta.c\t1\n").expect("failed to write tags");
    touch_later(&tags);

    index.refresh(&roots, ".tags", false);
    assert_eq!(index.entries().len(), 1);
}

#[test]
fn tags_file_moved_into_place_with_older_mtime_is_loaded() {
    let dir = workspace_with_files(&[]);
    let roots = roots(&[&dir]);
    let mut index = TagIndex::new();
    index.refresh(&roots, ".tags", false);
    assert!(index.entries().is_empty());

    let tags = dir.path().join(".tags");
    fs::write(&tags, "foo\ta.c\t1\n").expect("failed to write tags");
    File::options()
        .write(true)
        .open(&tags)
        .expect("failed to open tags")
        .set_modified(SystemTime::now() - Duration::from_secs(5))
        .expect("failed to set mtime");

    let outcome = index.refresh(&roots, ".tags", false);

    assert_eq!(outcome.rebuilt, roots);
    assert_eq!(index.entries().len(), 1);
    assert!(index.cache_for(dir.path()).expect("cache missing").read_error().is_none());
}

#[test]
fn tags_file_replaced_by_older_copy_is_reloaded() {
    let dir = workspace_with_files(&[(".tags", "new_symbol\ta.c\t1\n")]);
    let roots = roots(&[&dir]);
    let mut index = TagIndex::new();
    index.refresh(&roots, ".tags", false);

    let tags = dir.path().join(".tags");
    fs::write(&tags, "old_symbol\ta.c\t1\n").expect("failed to write tags");
    File::options()
        .write(true)
        .open(&tags)
        .expect("failed to open tags")
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .expect("failed to set mtime");

    index.refresh(&roots, ".tags", false);

    assert_eq!(index.entries()[0].name, "old_symbol");
}

#[test]
fn removed_root_drops_its_symbols() {
    let first = workspace_with_files(&[(".tags", "alpha\ta.c\t1\n")]);
    let second = workspace_with_files(&[(".tags", "beta\tb.c\t1\n")]);
    let mut index = TagIndex::new();
    index.refresh(&roots(&[&first, &second]), ".tags", false);
    assert_eq!(index.entries().len(), 2);

    let outcome = index.refresh(&roots(&[&first]), ".tags", false);

    assert!(outcome.rebuilt.is_empty(), "remaining root is still fresh");
    assert!(outcome.changed);
    assert_eq!(index.entries().len(), 1);
    assert_eq!(index.entries()[0].name, "alpha");
    assert!(index.cache_for(second.path()).is_none());
}

#[test]
fn malformed_lines_are_skipped_and_reported() {
    let dir = workspace_with_files(&[(
        ".tags",
        "!_TAG_FILE_FORMAT\t2\t/extended format/\nno_tabs_here\nzero\ta.c\t0\ngood\ta.c\t4;\"\tf\n",
    )]);
    let mut index = TagIndex::new();
    index.refresh(&roots(&[&dir]), ".tags", false);

    let cache = index.cache_for(dir.path()).expect("cache missing");
    assert_eq!(cache.format_version(), Some(2));
    assert_eq!(cache.entries().len(), 1);
    assert_eq!(cache.entries()[0].name, "good");
    let kinds: Vec<&str> = cache.warnings().iter().map(ctagsym::Warning::kind).collect();
    assert_eq!(kinds, ["malformed_line", "malformed_address"]);
}

// -- Resolution --

#[test]
fn pattern_missing_from_source_stays_unresolved() {
    let dir = workspace_with_files(&[
        (".tags", "gone\ta.c\t/^int gone(void);$/;\"\tf\n"),
        ("a.c", A_C),
    ]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());
    let found = provider.query("gone", MatchMode::Substring).expect("query failed");

    let resolved = resolve(&found[0]).expect("resolve failed");

    assert_eq!(resolved, found[0]);
}

#[test]
fn pattern_in_unreadable_file_is_an_error() {
    let dir = workspace_with_files(&[(".tags", "lost\tmissing.c\t/lost/\n")]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());
    let found = provider.query("lost", MatchMode::Substring).expect("query failed");

    let result = resolve(&found[0]);

    assert!(matches!(
        result,
        Err(ctagsym::ResolveError::TargetFileUnreadable { .. })
    ));
}

// -- LSP surface --

#[test]
#[cfg(unix)]
fn workspace_symbols_resolve_through_their_payload() {
    use lsp_types::OneOf;

    let dir = workspace_with_files(&[
        (".tags", "foo\tsrc/a.c\t12\nbar\tsrc/a.c\t?something?\n"),
        ("src/a.c", A_C),
    ]);
    let provider = SymbolProvider::new(roots(&[&dir]), Settings::default());

    let symbols = provider
        .provide_workspace_symbols("bar")
        .expect("workspace symbols failed");
    assert_eq!(symbols.len(), 1);
    assert!(matches!(symbols[0].location, OneOf::Right(_)), "location is deferred");

    let resolved = provider.resolve_workspace_symbol(symbols[0].clone());

    let OneOf::Left(location) = resolved.location else {
        panic!("symbol should be resolved");
    };
    assert_eq!(location.range.start, lsp_types::Position::new(4, 0));
    assert!(location.uri.as_str().ends_with("/src/a.c"));
}
