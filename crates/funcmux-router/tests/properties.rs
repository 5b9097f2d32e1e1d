//! Property tests for pattern resolution.

use funcmux_core::QueryParams;
use funcmux_router::Router;
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,8}"
}

fn literal_path() -> impl Strategy<Value = Vec<String>> {
    vec(segment(), 1..5)
}

proptest! {
    #[test]
    fn registered_literals_resolve_to_their_endpoint(paths in btree_set(literal_path(), 1..12)) {
        let paths: Vec<_> = paths.into_iter().collect();
        let mut router = Router::new();
        for (idx, segments) in paths.iter().enumerate() {
            router.register(&format!("/{}", segments.join("/")), idx, &[]).unwrap();
        }

        for (idx, segments) in paths.iter().enumerate() {
            let mut query = QueryParams::new();
            let found = router.resolve(&format!("/{}", segments.join("/")), &mut query);
            prop_assert_eq!(found, Some(&idx));
            prop_assert!(query.is_empty());
        }
    }

    #[test]
    fn changing_one_segment_misses(
        segments in literal_path(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut router = Router::new();
        router.register(&format!("/{}", segments.join("/")), 1u8, &[]).unwrap();

        let mut changed = segments.clone();
        let at = pick.index(changed.len());
        // Uppercase never appears in generated segments.
        changed[at].push('X');
        let mut query = QueryParams::new();
        prop_assert_eq!(router.resolve(&format!("/{}", changed.join("/")), &mut query), None);
    }

    #[test]
    fn variable_captures_the_segment(prefix in segment(), value in "[A-Za-z0-9._~-]{1,12}") {
        let mut router = Router::new();
        router.register(&format!("/{prefix}/:id/tail"), (), &[]).unwrap();

        let mut query = QueryParams::new();
        let found = router.resolve(&format!("/{prefix}/{value}/tail"), &mut query);
        prop_assert!(found.is_some());
        prop_assert_eq!(query.get("id"), Some(value.as_str()));
        prop_assert_eq!(query.len(), 1);
    }
}
