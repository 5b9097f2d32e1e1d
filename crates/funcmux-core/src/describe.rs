//! Type descriptions.
//!
//! Handlers are classified from what their parameter and return types say
//! about themselves: a short name, a structural [`Shape`] and a set of
//! [`Capabilities`]. Descriptions come from [`Input::describe`] and
//! [`Output::describe`] (derived or built in) and are only ever read at
//! registration time.
//!
//! [`Input::describe`]: crate::Input::describe
//! [`Output::describe`]: crate::Output::describe

use serde::Serialize;

/// Structural kind of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "inner")]
pub enum Shape {
    /// Text.
    Str,
    /// Signed or unsigned integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// Sequence of values.
    Seq,
    /// Key/value map.
    Map,
    /// Record with named or positional fields.
    Struct,
    /// Arbitrary self-describing value.
    Any,
    /// Optional indirection to another type.
    Pointer(Box<TypeDesc>),
}

impl Shape {
    /// Whether values of this shape can be read from a query parameter.
    #[must_use]
    pub fn is_query_scalar(&self) -> bool {
        matches!(self, Self::Str | Self::Int)
    }
}

/// Conversion capabilities a type declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Populates itself from the request (`FromRequest`).
    pub from_request: bool,
    /// Renders itself into the response (`ToResponse`).
    pub to_response: bool,
    /// Is an error value.
    pub error: bool,
}

impl Capabilities {
    /// No capabilities.
    pub const NONE: Self = Self {
        from_request: false,
        to_response: false,
        error: false,
    };
    /// Custom extraction.
    pub const FROM_REQUEST: Self = Self {
        from_request: true,
        to_response: false,
        error: false,
    };
    /// Custom rendering.
    pub const TO_RESPONSE: Self = Self {
        from_request: false,
        to_response: true,
        error: false,
    };
    /// Error value.
    pub const ERROR: Self = Self {
        from_request: false,
        to_response: false,
        error: true,
    };
}

/// Description of one parameter or return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDesc {
    name: String,
    shape: Shape,
    caps: Capabilities,
}

impl TypeDesc {
    /// Describe a type with no capabilities.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            caps: Capabilities::NONE,
        }
    }

    /// Describe an error type.
    #[must_use]
    pub fn error(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Struct).with_caps(Capabilities::ERROR)
    }

    /// Describe a custom-extraction type.
    #[must_use]
    pub fn extractor(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, shape).with_caps(Capabilities::FROM_REQUEST)
    }

    /// Describe a custom-rendering type.
    #[must_use]
    pub fn responder(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, shape).with_caps(Capabilities::TO_RESPONSE)
    }

    /// Describe an optional wrapper around `inner`.
    ///
    /// The wrapper keeps the inner name and capabilities.
    #[must_use]
    pub fn pointer(inner: TypeDesc) -> Self {
        Self {
            name: inner.name.clone(),
            caps: inner.caps,
            shape: Shape::Pointer(Box::new(inner)),
        }
    }

    /// Replace the capabilities.
    #[must_use]
    pub fn with_caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Short type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Declared capabilities.
    #[must_use]
    pub fn caps(&self) -> Capabilities {
        self.caps
    }

    /// Strip one pointer level, reporting whether there was one.
    #[must_use]
    pub fn peel(&self) -> (&TypeDesc, bool) {
        match &self.shape {
            Shape::Pointer(inner) => (inner, true),
            _ => (self, false),
        }
    }
}

/// `std::any::type_name` with module paths removed, generics kept.
///
/// ```
/// use funcmux_core::short_type_name;
///
/// assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
/// assert_eq!(short_type_name::<Option<u8>>(), "Option<u8>");
/// ```
#[must_use]
pub fn short_type_name<T: ?Sized>() -> String {
    strip_paths(std::any::type_name::<T>())
}

fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (idx, ch) in full.char_indices() {
        if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';') {
            out.push_str(last_path_segment(&full[segment_start..idx]));
            out.push(ch);
            segment_start = idx + ch.len_utf8();
        }
    }
    out.push_str(last_path_segment(&full[segment_start..]));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
