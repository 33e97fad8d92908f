//! Property-based tests for Bookmark Manager operations.
//!
//! These tests verify that adding a bookmark and then searching by its title
//! always returns a result containing that bookmark, and that tag
//! intersection never returns a bookmark missing a requested tag.

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkshelf::types::bookmark::{BookmarkDraft, BookmarkFilter};
use proptest::prelude::*;

/// Strategy for generating valid URL strings.
/// Produces URLs with http/https scheme, alphanumeric host, and optional path.
fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,15}",
        prop_oneof![Just(".com"), Just(".org"), Just(".net"), Just(".io")],
        proptest::option::of("/[a-z0-9]{1,10}"),
    )
        .prop_map(|(scheme, host, tld, path)| {
            format!("{}://{}{}{}", scheme, host, tld, path.unwrap_or_default())
        })
}

/// Strategy for generating non-empty bookmark titles.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{1,30}"
}

fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")], 0..4)
        .prop_map(|tags| tags.into_iter().map(String::from).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bookmark_add_then_search_returns_result(
        url in arb_url(),
        title in arb_title(),
    ) {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database");
        let conn = db.connection();
        let mut manager = BookmarkManager::new(&conn);

        let added = manager
            .add_bookmark(&BookmarkDraft {
                title: title.clone(),
                url: url.clone(),
                ..Default::default()
            })
            .expect("add_bookmark should succeed");

        let filter = BookmarkFilter {
            search: Some(title.to_uppercase()),
            ..Default::default()
        };
        let results = manager.list_bookmarks(&filter).expect("search should succeed");
        prop_assert!(results.iter().any(|b| b.id == added.id && b.url == url));
    }

    #[test]
    fn tag_filter_returns_only_supersets(
        tag_sets in proptest::collection::vec(arb_tags(), 1..8),
        wanted in arb_tags(),
    ) {
        let db = Database::open_in_memory()
            .expect("Failed to open in-memory database");
        let conn = db.connection();
        let mut manager = BookmarkManager::new(&conn);

        for (i, tags) in tag_sets.iter().enumerate() {
            manager
                .add_bookmark(&BookmarkDraft {
                    title: format!("bm {i}"),
                    url: format!("https://site{i}.example/"),
                    tags: tags.clone(),
                    ..Default::default()
                })
                .expect("add_bookmark should succeed");
        }

        let filter = BookmarkFilter { tags: wanted.clone(), ..Default::default() };
        let results = manager.list_bookmarks(&filter).expect("list should succeed");

        let expected = tag_sets
            .iter()
            .filter(|tags| wanted.iter().all(|w| tags.contains(w)))
            .count();
        prop_assert_eq!(results.len(), expected);
        for bookmark in &results {
            for tag in &wanted {
                prop_assert!(bookmark.tags.contains(tag));
            }
        }
    }
}
