//! Route matching results.

use funcmux_core::Method;

/// A resolved path with its captured variables.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The bound endpoint.
    pub endpoint: &'a T,
    /// Captured `(variable name, decoded segment)` pairs, outermost first.
    pub params: Vec<(&'a str, String)>,
    /// Notes stored with the route.
    pub notes: &'a [String],
}

impl<T> RouteMatch<'_, T> {
    /// Get a captured variable by name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One registered route, as listed by [`Router::routes`](crate::Router::routes).
#[derive(Debug)]
pub struct RouteEntry<'a, T> {
    /// Canonical pattern, e.g. `/user/:id/name`.
    pub pattern: String,
    /// The bound endpoint.
    pub endpoint: &'a T,
    /// Notes stored with the route.
    pub notes: &'a [String],
}

/// Methods a path accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    /// Create a normalized allow list, sorted and de-duplicated for stable
    /// output.
    #[must_use]
    pub fn new(mut methods: Vec<Method>) -> Self {
        methods.sort_by_key(method_order);
        methods.dedup();
        Self { methods }
    }

    /// Access the normalized methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Check whether a method is allowed.
    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// Whether nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Format as an HTTP Allow header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut out = String::new();
        for (idx, method) in self.methods.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(method.as_str());
        }
        out
    }
}

fn method_order(method: &Method) -> u8 {
    match *method {
        Method::Get => 0,
        Method::Head => 1,
        Method::Post => 2,
        Method::Put => 3,
        Method::Delete => 4,
        Method::Patch => 5,
        Method::Options => 6,
        Method::Trace => 7,
    }
}
