//! Segment trie router implementation.
//!
//! Patterns are split on `/` after dropping one leading and one trailing
//! slash, so `""` and `"/"` both become the single empty segment. A segment
//! starting with `:` is a variable; every other segment is matched literally
//! and case-sensitively.

use std::borrow::Cow;
use std::collections::HashMap;

use funcmux_core::{QueryParams, percent_decode_path};

use crate::error::RouteError;
use crate::r#match::{RouteEntry, RouteMatch};

#[derive(Debug)]
struct Node<T> {
    endpoint: Option<T>,
    notes: Vec<String>,
    literals: HashMap<String, Node<T>>,
    variable: Option<Variable<T>>,
}

#[derive(Debug)]
struct Variable<T> {
    name: String,
    node: Box<Node<T>>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            endpoint: None,
            notes: Vec::new(),
            literals: HashMap::new(),
            variable: None,
        }
    }

    /// Depth-first search: literal child first, then the variable child.
    fn find<'n>(
        &'n self,
        segments: &[Cow<'_, str>],
        captured: &mut Vec<(&'n str, String)>,
    ) -> Option<&'n Node<T>> {
        let Some((first, rest)) = segments.split_first() else {
            return self.endpoint.is_some().then_some(self);
        };

        if let Some(found) = self
            .literals
            .get(&**first)
            .and_then(|child| child.find(rest, captured))
        {
            return Some(found);
        }

        if let Some(var) = &self.variable {
            captured.push((var.name.as_str(), first.to_string()));
            if let Some(found) = var.node.find(rest, captured) {
                return Some(found);
            }
            captured.pop();
        }

        None
    }

    fn collect<'n>(&'n self, prefix: &mut Vec<String>, out: &mut Vec<RouteEntry<'n, T>>) {
        if let Some(endpoint) = &self.endpoint {
            out.push(RouteEntry {
                pattern: format!("/{}", prefix.join("/")),
                endpoint,
                notes: &self.notes,
            });
        }

        let mut literals: Vec<_> = self.literals.iter().collect();
        literals.sort_by(|a, b| a.0.cmp(b.0));
        for (segment, child) in literals {
            prefix.push(segment.clone());
            child.collect(prefix, out);
            prefix.pop();
        }

        if let Some(var) = &self.variable {
            prefix.push(format!(":{}", var.name));
            var.node.collect(prefix, out);
            prefix.pop();
        }
    }
}

/// Split a pattern or request path into segments.
///
/// ```
/// use funcmux_router::split_segments;
///
/// assert_eq!(split_segments("/user/:id/"), vec!["user", ":id"]);
/// assert_eq!(split_segments("/"), vec![""]);
/// assert_eq!(split_segments("/a//b"), vec!["a", "", "b"]);
/// ```
#[must_use]
pub fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').collect()
}

/// Segment trie mapping path patterns to endpoints of type `T`.
#[derive(Debug)]
pub struct Router<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bind `endpoint` to `pattern`, storing `notes` with it.
    ///
    /// # Errors
    ///
    /// - [`RouteError::EmptyVariableName`] for a bare `:` segment
    /// - [`RouteError::ConflictingVariable`] when another variable name is
    ///   already registered at the same position
    /// - [`RouteError::DuplicateRoute`] when the pattern is already bound
    pub fn register(
        &mut self,
        pattern: &str,
        endpoint: T,
        notes: &[&str],
    ) -> Result<(), RouteError> {
        let segments = split_segments(pattern);
        if segments.iter().any(|s| *s == ":") {
            return Err(RouteError::EmptyVariableName {
                pattern: pattern.to_string(),
            });
        }

        let mut node = &mut self.root;
        for segment in segments {
            node = match segment.strip_prefix(':') {
                Some(name) => {
                    if let Some(existing) = &node.variable {
                        if existing.name != name {
                            return Err(RouteError::ConflictingVariable {
                                pattern: pattern.to_string(),
                                existing: existing.name.clone(),
                                requested: name.to_string(),
                            });
                        }
                    }
                    let var = node.variable.get_or_insert_with(|| Variable {
                        name: name.to_string(),
                        node: Box::new(Node::new()),
                    });
                    &mut *var.node
                }
                None => node
                    .literals
                    .entry(segment.to_string())
                    .or_insert_with(Node::new),
            };
        }

        if node.endpoint.is_some() {
            return Err(RouteError::DuplicateRoute {
                pattern: pattern.to_string(),
            });
        }
        node.endpoint = Some(endpoint);
        node.notes = notes.iter().map(|n| (*n).to_string()).collect();
        self.len += 1;
        Ok(())
    }

    /// Find the endpoint for a request path.
    ///
    /// Request segments are percent-decoded before matching. Captured
    /// variables come back in the match rather than being written anywhere.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        let segments: Vec<Cow<'_, str>> = split_segments(path)
            .into_iter()
            .map(percent_decode_path)
            .collect();
        let mut params = Vec::new();
        let node = self.root.find(&segments, &mut params)?;
        let endpoint = node.endpoint.as_ref()?;
        Some(RouteMatch {
            endpoint,
            params,
            notes: &node.notes,
        })
    }

    /// Find the endpoint for a request path, appending captured variables to
    /// `query` as `(name, value)` pairs.
    pub fn resolve(&self, path: &str, query: &mut QueryParams) -> Option<&T> {
        let matched = self.lookup(path)?;
        for (name, value) in matched.params {
            query.append(name, value);
        }
        Some(matched.endpoint)
    }

    /// Every registered route, literals in lexical order before the
    /// variable at each level.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry<'_, T>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut Vec::new(), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(patterns: &[(&str, u32)]) -> Router<u32> {
        let mut router = Router::new();
        for (pattern, id) in patterns {
            router.register(pattern, *id, &[]).unwrap();
        }
        router
    }

    #[test]
    fn literal_routes_resolve() {
        let router = router(&[("/users", 1), ("/users/me", 2), ("/", 3)]);
        let mut q = QueryParams::new();
        assert_eq!(router.resolve("/users", &mut q), Some(&1));
        assert_eq!(router.resolve("/users/me/", &mut q), Some(&2));
        assert_eq!(router.resolve("/", &mut q), Some(&3));
        assert_eq!(router.resolve("", &mut q), Some(&3));
        assert!(q.is_empty());
    }

    #[test]
    fn one_differing_segment_is_not_found() {
        let router = router(&[("/users/me", 1)]);
        let mut q = QueryParams::new();
        assert_eq!(router.resolve("/users/you", &mut q), None);
        assert_eq!(router.resolve("/Users/me", &mut q), None);
        assert_eq!(router.resolve("/users", &mut q), None);
        assert_eq!(router.resolve("/users/me/more", &mut q), None);
    }

    #[test]
    fn variables_are_appended_to_query() {
        let router = router(&[("/user/:userId/name", 1)]);
        let mut q = QueryParams::parse("x=1");
        assert_eq!(router.resolve("/user/42/name", &mut q), Some(&1));
        let pairs: Vec<_> = q.iter().collect();
        assert_eq!(pairs, vec![("x", "1"), ("userId", "42")]);
    }

    #[test]
    fn literal_wins_over_variable() {
        let router = router(&[("/user/me", 1), ("/user/:id", 2)]);
        let mut q = QueryParams::new();
        assert_eq!(router.resolve("/user/me", &mut q), Some(&1));
        assert!(q.is_empty());
        assert_eq!(router.resolve("/user/7", &mut q), Some(&2));
        assert_eq!(q.get("id"), Some("7"));
    }

    #[test]
    fn dead_end_literal_falls_back_to_variable() {
        let router = router(&[("/a/b/c", 1), ("/a/:x/d", 2)]);
        let matched = router.lookup("/a/b/d").unwrap();
        assert_eq!(*matched.endpoint, 2);
        assert_eq!(matched.get_param("x"), Some("b"));
        assert_eq!(*router.lookup("/a/b/c").unwrap().endpoint, 1);
    }

    #[test]
    fn failed_variable_branch_leaves_no_captures() {
        let router = router(&[("/:a/x", 1), ("/:a/:b/y", 2)]);
        let matched = router.lookup("/1/2/y").unwrap();
        assert_eq!(*matched.endpoint, 2);
        assert_eq!(matched.params, vec![("a", "1".to_string()), ("b", "2".to_string())]);
        assert!(router.lookup("/1/2/z").is_none());
    }

    #[test]
    fn segments_are_percent_decoded() {
        let router = router(&[("/files/my file", 1), ("/tags/:tag", 2)]);
        let mut q = QueryParams::new();
        assert_eq!(router.resolve("/files/my%20file", &mut q), Some(&1));
        assert_eq!(router.resolve("/tags/a%2Fb+c", &mut q), Some(&2));
        assert_eq!(q.get("tag"), Some("a/b+c"));
    }

    #[test]
    fn duplicate_route_is_rejected() {
        let mut router = router(&[("/user/:id", 1)]);
        let err = router.register("/user/:id/", 2, &[]).unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicateRoute {
                pattern: "/user/:id/".into()
            }
        );
        assert_eq!(err.to_string(), "duplicate route for path /user/:id/");
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn second_variable_name_conflicts() {
        let mut router = router(&[("/user/:id", 1)]);
        let err = router.register("/user/:name/posts", 2, &[]).unwrap_err();
        assert!(matches!(
            err,
            RouteError::ConflictingVariable { ref existing, ref requested, .. }
                if existing == "id" && requested == "name"
        ));
        router.register("/user/:id/posts", 3, &[]).unwrap();
    }

    #[test]
    fn bare_colon_is_rejected() {
        let mut router: Router<u32> = Router::new();
        let err = router.register("/a/:/b", 1, &[]).unwrap_err();
        assert!(matches!(err, RouteError::EmptyVariableName { .. }));
        assert!(router.routes().is_empty());
    }

    #[test]
    fn routes_lists_patterns_and_notes() {
        let mut router = Router::new();
        router.register("/user/:id", 1, &["Fetch a user"]).unwrap();
        router.register("/user/me", 2, &[]).unwrap();
        router.register("/", 3, &[]).unwrap();
        let routes: Vec<_> = router
            .routes()
            .into_iter()
            .map(|r| (r.pattern, *r.endpoint, r.notes.to_vec()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("/".to_string(), 3, vec![]),
                ("/user/me".to_string(), 2, vec![]),
                ("/user/:id".to_string(), 1, vec!["Fetch a user".to_string()]),
            ]
        );
    }
}
