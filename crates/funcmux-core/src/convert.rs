//! Conversion traits between requests, handler values and responses.
//!
//! A handler parameter implements [`Input`]: it describes itself and decodes
//! from whichever [`InputSource`] the classifier picked for it. A handler
//! result implements [`Output`] (one value) and [`Outputs`] (the whole
//! return type, including tuples and `Result`). Parameter lists implement
//! [`Inputs`].
//!
//! Most implementations come from the derive macros; the helpers in this
//! module ([`decode_json`], [`extract`], [`query_text`], [`query_int`],
//! [`single_describe`], [`single_slot`]) are what the generated code calls.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::context::RequestContext;
use crate::describe::{Shape, TypeDesc, short_type_name};
use crate::error::{BoxError, HttpError, ResponseError, boxed};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Where an input's value is read from.
#[derive(Debug, Clone, Copy)]
pub enum InputSource<'a> {
    /// The raw request body.
    Body(&'a [u8]),
    /// A query parameter, already looked up. `None` when absent.
    Query {
        /// Parameter key.
        name: &'a str,
        /// The value, parsed as the parameter's kind.
        value: Option<QueryValue<'a>>,
    },
    /// The whole request, for custom extraction.
    Request {
        /// Request context.
        ctx: &'a RequestContext,
        /// The request.
        req: &'a Request,
    },
}

impl InputSource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Body(_) => "body",
            Self::Query { .. } => "query parameter",
            Self::Request { .. } => "request",
        }
    }
}

/// A looked-up query parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValue<'a> {
    /// Text value.
    Str(&'a str),
    /// Integer value.
    Int(i64),
}

/// Custom extraction: the type populates itself from the request.
///
/// The adaptor creates the value with [`Default`] and then calls
/// [`from_request`](Self::from_request) on it.
///
/// ```ignore
/// #[derive(Default, Extractor)]
/// struct UserId(String);
///
/// impl FromRequest for UserId {
///     type Error = HttpError;
///
///     fn from_request(&mut self, _ctx: &RequestContext, req: &Request) -> Result<(), HttpError> {
///         self.0 = req.query_params().get("id").unwrap_or_default().to_string();
///         Ok(())
///     }
/// }
/// ```
pub trait FromRequest: Default + Send + 'static {
    /// Extraction failure.
    type Error: ResponseError;

    /// Populate `self` from the request.
    fn from_request(&mut self, ctx: &RequestContext, req: &Request) -> Result<(), Self::Error>;
}

/// Custom rendering: the value writes itself into the response.
pub trait ToResponse: Send + 'static {
    /// Rendering failure.
    type Error: ResponseError;

    /// Write status, headers or body bytes.
    fn to_response(self, res: &mut ResponseWriter) -> Result<(), Self::Error>;
}

/// A handler parameter type.
pub trait Input: Sized + Send + 'static {
    /// Describe the type for classification.
    fn describe() -> TypeDesc;

    /// Decode a value from its source.
    fn decode(source: InputSource<'_>) -> Result<Self, BoxError>;
}

/// A handler parameter list.
pub trait Inputs: Sized + Send + 'static {
    /// Describe every parameter, in declared order.
    fn describe() -> Vec<TypeDesc>;

    /// Decode the parameters from sources yielded in declared order.
    ///
    /// Stops at the first failure; later sources are never pulled.
    fn decode<'a, I>(sources: I) -> Result<Self, BoxError>
    where
        I: Iterator<Item = Result<InputSource<'a>, BoxError>>;
}

/// How an output value is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRole {
    /// Encoded as the response body, after everything else.
    Body,
    /// Renders itself, in declared order.
    Custom,
    /// Error value; honored only in the last position.
    Error,
}

/// Something that writes into a [`ResponseWriter`].
pub trait Render: Send {
    /// Write into the response.
    fn render(self: Box<Self>, res: &mut ResponseWriter) -> Result<(), BoxError>;
}

/// One output value, ready for the output phase.
pub enum OutputSlot {
    /// A value to render (custom or body, as the plan says).
    Render(Box<dyn Render>),
    /// An error position; `None` when there was no error.
    Error(Option<BoxError>),
    /// Nothing to do.
    Skip,
}

impl fmt::Debug for OutputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(_) => f.write_str("Render(..)"),
            Self::Error(Some(err)) => write!(f, "Error(Some({err}))"),
            Self::Error(None) => f.write_str("Error(None)"),
            Self::Skip => f.write_str("Skip"),
        }
    }
}

/// A single handler result value.
pub trait Output: Sized + Send + 'static {
    /// Describe the type for classification.
    fn describe() -> TypeDesc;

    /// Turn the value into a slot for the given role.
    fn into_slot(self, role: OutputRole) -> OutputSlot;
}

/// A handler's full return type.
pub trait Outputs: Send + 'static {
    /// Describe every output position, in declared order.
    fn describe() -> Vec<TypeDesc>;

    /// Split into one slot per position. `roles` has one entry per position.
    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot>;
}

/// Error types usable in the error position of a `Result` return.
pub trait IntoBoxError: Send + 'static {
    /// Short name of the error type.
    fn error_name() -> String;

    /// Erase the error.
    fn into_box_error(self) -> BoxError;
}

impl<E: ResponseError> IntoBoxError for E {
    fn error_name() -> String {
        short_type_name::<E>()
    }

    fn into_box_error(self) -> BoxError {
        Box::new(self)
    }
}

impl IntoBoxError for BoxError {
    fn error_name() -> String {
        "BoxError".to_string()
    }

    fn into_box_error(self) -> BoxError {
        self
    }
}

/// A decode plan and the value it was handed disagree. Internal: no status.
#[derive(Debug)]
pub struct PlanMismatch {
    message: String,
}

impl PlanMismatch {
    /// Create with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PlanMismatch {}

impl ResponseError for PlanMismatch {}

fn mismatch<T: ?Sized>(source: &InputSource<'_>, expected: &str) -> BoxError {
    boxed(PlanMismatch::new(format!(
        "{} expects a {expected} source, got {}",
        short_type_name::<T>(),
        source.kind()
    )))
}

/// 400 for an absent required query parameter.
#[must_use]
pub fn missing_query(name: &str) -> BoxError {
    boxed(
        HttpError::bad_request()
            .with_detail(format!("missing required query parameter '{name}'")),
    )
}

/// 400 for a query parameter that is not a valid integer.
#[must_use]
pub fn not_integer(name: &str) -> BoxError {
    boxed(
        HttpError::bad_request()
            .with_detail(format!("query param '{name}' expected to be integer value")),
    )
}

/// Decode a JSON body input.
pub fn decode_json<T: DeserializeOwned>(source: InputSource<'_>) -> Result<T, BoxError> {
    match source {
        InputSource::Body(bytes) => codec::decode_body(bytes).map_err(boxed),
        other => Err(mismatch::<T>(&other, "body")),
    }
}

/// Run a [`FromRequest`] extractor on a default value.
pub fn extract<T: FromRequest>(source: InputSource<'_>) -> Result<T, BoxError> {
    match source {
        InputSource::Request { ctx, req } => {
            let mut value = T::default();
            value.from_request(ctx, req).map_err(boxed)?;
            Ok(value)
        }
        other => Err(mismatch::<T>(&other, "request")),
    }
}

/// Read a text query parameter for the wrapper type `T`.
pub fn query_text<T: ?Sized>(source: InputSource<'_>) -> Result<String, BoxError> {
    match source {
        InputSource::Query {
            value: Some(QueryValue::Str(s)),
            ..
        } => Ok(s.to_string()),
        InputSource::Query {
            value: Some(QueryValue::Int(v)),
            ..
        } => Ok(v.to_string()),
        InputSource::Query { name, value: None } => Err(missing_query(name)),
        other => Err(mismatch::<T>(&other, "query parameter")),
    }
}

/// Read an integer query parameter into `N` for the wrapper type `T`.
///
/// Values outside `N`'s range are rejected like non-numeric ones.
pub fn query_int<T: ?Sized, N: TryFrom<i64>>(source: InputSource<'_>) -> Result<N, BoxError> {
    match source {
        InputSource::Query {
            name,
            value: Some(QueryValue::Int(v)),
        } => N::try_from(v).map_err(|_| not_integer(name)),
        InputSource::Query {
            name,
            value: Some(QueryValue::Str(s)),
        } => s
            .parse::<i64>()
            .ok()
            .and_then(|v| N::try_from(v).ok())
            .ok_or_else(|| not_integer(name)),
        InputSource::Query { name, value: None } => Err(missing_query(name)),
        other => Err(mismatch::<T>(&other, "query parameter")),
    }
}

/// `Outputs::describe` for a single value.
#[must_use]
pub fn single_describe<T: Output>() -> Vec<TypeDesc> {
    vec![T::describe()]
}

/// `Outputs::into_slots` for a single value.
#[must_use]
pub fn single_slot<T: Output>(value: T, roles: &[OutputRole]) -> Vec<OutputSlot> {
    vec![value.into_slot(role_at(roles, 0))]
}

fn role_at(roles: &[OutputRole], idx: usize) -> OutputRole {
    roles.get(idx).copied().unwrap_or(OutputRole::Body)
}

/// Renders a value as the encoded response body.
///
/// Sets `content-type` when the head is still open and none was set.
pub struct JsonBody<T>(pub T);

impl<T: Serialize + Send> Render for JsonBody<T> {
    fn render(self: Box<Self>, res: &mut ResponseWriter) -> Result<(), BoxError> {
        let bytes = codec::encode_body(&self.0).map_err(boxed)?;
        if !res.is_committed() && res.header("content-type").is_none() {
            res.set_header("content-type", codec::CONTENT_TYPE);
        }
        res.write(&bytes);
        Ok(())
    }
}

/// Renders a [`ToResponse`] value.
pub struct Rendered<T>(pub T);

impl<T: ToResponse> Render for Rendered<T> {
    fn render(self: Box<Self>, res: &mut ResponseWriter) -> Result<(), BoxError> {
        self.0.to_response(res).map_err(boxed)
    }
}

/// JSON body wrapper for any serde type, no derive needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned + Send + 'static> Input for Json<T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<T>(), Shape::Struct)
    }

    fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
        decode_json(source).map(Json)
    }
}

impl<T: Serialize + Send + 'static> Output for Json<T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<T>(), Shape::Struct)
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Render(Box::new(JsonBody(self.0)))
    }
}

impl<T: Serialize + Send + 'static> Outputs for Json<T> {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl<T: Input> Input for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::pointer(T::describe())
    }

    fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
        match source {
            InputSource::Query { value: None, .. } => Ok(None),
            InputSource::Body(bytes) if bytes.is_empty() => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}

impl<T: Output> Output for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::pointer(T::describe())
    }

    fn into_slot(self, role: OutputRole) -> OutputSlot {
        match self {
            Some(value) => value.into_slot(role),
            None => match role {
                OutputRole::Body => OutputSlot::Render(Box::new(JsonBody(()))),
                OutputRole::Error => OutputSlot::Error(None),
                OutputRole::Custom => OutputSlot::Skip,
            },
        }
    }
}

impl<T: Output> Outputs for Option<T> {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl Output for HttpError {
    fn describe() -> TypeDesc {
        TypeDesc::error("HttpError")
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Error(Some(boxed(self)))
    }
}

impl Outputs for HttpError {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl Output for BoxError {
    fn describe() -> TypeDesc {
        TypeDesc::error("BoxError")
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Error(Some(self))
    }
}

impl Outputs for BoxError {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl Outputs for () {
    fn describe() -> Vec<TypeDesc> {
        Vec::new()
    }

    fn into_slots(self, _roles: &[OutputRole]) -> Vec<OutputSlot> {
        Vec::new()
    }
}

impl<O: Outputs, E: IntoBoxError> Outputs for Result<O, E> {
    fn describe() -> Vec<TypeDesc> {
        let mut descs = O::describe();
        descs.push(TypeDesc::error(E::error_name()));
        descs
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        let leading = roles.len().saturating_sub(1);
        match self {
            Ok(out) => {
                let mut slots = out.into_slots(&roles[..leading]);
                slots.push(OutputSlot::Error(None));
                slots
            }
            Err(err) => {
                let mut slots: Vec<OutputSlot> = std::iter::repeat_with(|| OutputSlot::Skip)
                    .take(leading)
                    .collect();
                slots.push(OutputSlot::Error(Some(err.into_box_error())));
                slots
            }
        }
    }
}

macro_rules! tuple_outputs {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty: Output),+> Outputs for ($($ty,)+) {
            fn describe() -> Vec<TypeDesc> {
                vec![$($ty::describe()),+]
            }

            fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
                vec![$(self.$idx.into_slot(role_at(roles, $idx))),+]
            }
        }
    };
}

tuple_outputs!(A => 0);
tuple_outputs!(A => 0, B => 1);
tuple_outputs!(A => 0, B => 1, C => 2);
tuple_outputs!(A => 0, B => 1, C => 2, D => 3);
tuple_outputs!(A => 0, B => 1, C => 2, D => 3, E => 4);
tuple_outputs!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

fn next_source<'a, I>(sources: &mut I) -> Result<InputSource<'a>, BoxError>
where
    I: Iterator<Item = Result<InputSource<'a>, BoxError>>,
{
    sources
        .next()
        .unwrap_or_else(|| Err(boxed(PlanMismatch::new("decode plan has too few inputs"))))
}

macro_rules! tuple_inputs {
    ($($ty:ident),*) => {
        impl<$($ty: Input),*> Inputs for ($($ty,)*) {
            fn describe() -> Vec<TypeDesc> {
                vec![$($ty::describe()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn decode<'a, I>(mut sources: I) -> Result<Self, BoxError>
            where
                I: Iterator<Item = Result<InputSource<'a>, BoxError>>,
            {
                Ok(($($ty::decode(next_source(&mut sources)?)?,)*))
            }
        }
    };
}

tuple_inputs!();
tuple_inputs!(A);
tuple_inputs!(A, B);
tuple_inputs!(A, B, C);
tuple_inputs!(A, B, C, D);
tuple_inputs!(A, B, C, D, E);
tuple_inputs!(A, B, C, D, E, F);
tuple_inputs!(A, B, C, D, E, F, G);
tuple_inputs!(A, B, C, D, E, F, G, H);

macro_rules! json_value_impls {
    ($($ty:ty => $shape:ident),* $(,)?) => {$(
        impl Input for $ty {
            fn describe() -> TypeDesc {
                TypeDesc::new(short_type_name::<$ty>(), Shape::$shape)
            }

            fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
                decode_json(source)
            }
        }

        impl Output for $ty {
            fn describe() -> TypeDesc {
                TypeDesc::new(short_type_name::<$ty>(), Shape::$shape)
            }

            fn into_slot(self, _role: OutputRole) -> OutputSlot {
                OutputSlot::Render(Box::new(JsonBody(self)))
            }
        }

        impl Outputs for $ty {
            fn describe() -> Vec<TypeDesc> {
                single_describe::<Self>()
            }

            fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
                single_slot(self, roles)
            }
        }
    )*};
}

json_value_impls!(
    String => Str,
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    isize => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    u64 => Int,
    usize => Int,
    f32 => Float,
    f64 => Float,
    serde_json::Value => Any,
);

impl<T: DeserializeOwned + Send + 'static> Input for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Seq)
    }

    fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
        decode_json(source)
    }
}

impl<T: Serialize + Send + 'static> Output for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Seq)
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Render(Box::new(JsonBody(self)))
    }
}

impl<T: Serialize + Send + 'static> Outputs for Vec<T> {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl<T: DeserializeOwned + Send + 'static> Input for HashMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Map)
    }

    fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
        decode_json(source)
    }
}

impl<T: Serialize + Send + 'static> Output for HashMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Map)
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Render(Box::new(JsonBody(self)))
    }
}

impl<T: Serialize + Send + 'static> Outputs for HashMap<String, T> {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

impl<T: DeserializeOwned + Send + 'static> Input for BTreeMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Map)
    }

    fn decode(source: InputSource<'_>) -> Result<Self, BoxError> {
        decode_json(source)
    }
}

impl<T: Serialize + Send + 'static> Output for BTreeMap<String, T> {
    fn describe() -> TypeDesc {
        TypeDesc::new(short_type_name::<Self>(), Shape::Map)
    }

    fn into_slot(self, _role: OutputRole) -> OutputSlot {
        OutputSlot::Render(Box::new(JsonBody(self)))
    }
}

impl<T: Serialize + Send + 'static> Outputs for BTreeMap<String, T> {
    fn describe() -> Vec<TypeDesc> {
        single_describe::<Self>()
    }

    fn into_slots(self, roles: &[OutputRole]) -> Vec<OutputSlot> {
        single_slot(self, roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use crate::response::StatusCode;
    use asupersync::Cx;

    fn render_all(slots: Vec<OutputSlot>) -> ResponseWriter {
        let mut res = ResponseWriter::new();
        for slot in slots {
            if let OutputSlot::Render(r) = slot {
                r.render(&mut res).unwrap();
            }
        }
        res
    }

    #[test]
    fn string_input_is_a_json_body() {
        let desc = <String as Input>::describe();
        assert_eq!(desc.name(), "String");
        assert_eq!(desc.shape(), &Shape::Str);
        let value = <String as Input>::decode(InputSource::Body(br#""hi""#)).unwrap();
        assert_eq!(value, "hi");
    }

    #[test]
    fn body_decode_rejects_wrong_source() {
        let err = <i64 as Input>::decode(InputSource::Query {
            name: "x",
            value: None,
        })
        .unwrap_err();
        assert!(err.status().is_none());
        assert!(err.to_string().contains("expects a body source"));
    }

    #[test]
    fn option_input_handles_absent_values() {
        let none = <Option<i64> as Input>::decode(InputSource::Body(b"")).unwrap();
        assert_eq!(none, None);
        let some = <Option<i64> as Input>::decode(InputSource::Body(b"5")).unwrap();
        assert_eq!(some, Some(5));
        let desc = <Option<i64> as Input>::describe();
        assert!(desc.peel().1);
    }

    #[test]
    fn query_int_checks_range_and_format() {
        let source = |v| InputSource::Query {
            name: "amount",
            value: Some(QueryValue::Int(v)),
        };
        assert_eq!(query_int::<(), u8>(source(200)).unwrap(), 200u8);
        let err = query_int::<(), u8>(source(300)).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.to_string(),
            "query param 'amount' expected to be integer value"
        );

        let text = InputSource::Query {
            name: "amount",
            value: Some(QueryValue::Str("abc")),
        };
        assert!(query_int::<(), i64>(text).is_err());
    }

    #[test]
    fn query_text_reports_missing() {
        let err = query_text::<()>(InputSource::Query {
            name: "food",
            value: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "missing required query parameter 'food'");
    }

    #[derive(Default)]
    struct Agent(String);

    impl FromRequest for Agent {
        type Error = HttpError;

        fn from_request(&mut self, _ctx: &RequestContext, req: &Request) -> Result<(), HttpError> {
            let agent = req
                .headers()
                .get_str("user-agent")
                .ok_or_else(|| HttpError::bad_request().with_detail("no agent"))?;
            self.0 = agent.to_string();
            Ok(())
        }
    }

    #[test]
    fn extract_populates_default_value() {
        let ctx = RequestContext::new(Cx::for_testing(), 1);
        let mut req = Request::new(Method::Get, "/");
        let err = extract::<Agent>(InputSource::Request { ctx: &ctx, req: &req })
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no agent");

        req.headers_mut().insert("User-Agent", b"curl".to_vec());
        let agent = extract::<Agent>(InputSource::Request { ctx: &ctx, req: &req }).unwrap();
        assert_eq!(agent.0, "curl");
    }

    #[test]
    fn tuple_inputs_decode_in_order() {
        let sources: Vec<Result<InputSource<'_>, BoxError>> = vec![
            Ok(InputSource::Body(b"1")),
            Ok(InputSource::Body(br#""two""#)),
        ];
        let (a, b) = <(i64, String) as Inputs>::decode(sources.into_iter()).unwrap();
        assert_eq!((a, b.as_str()), (1, "two"));
    }

    #[test]
    fn tuple_inputs_stop_at_first_failure() {
        let sources = vec![
            Err(missing_query("first")),
            Ok(InputSource::Body(b"not json")),
        ];
        let err = <(Option<i64>, i64) as Inputs>::decode(sources.into_iter()).unwrap_err();
        assert_eq!(err.to_string(), "missing required query parameter 'first'");
    }

    #[test]
    fn too_few_sources_is_internal() {
        let err = <(i64,) as Inputs>::decode(std::iter::empty()).unwrap_err();
        assert!(err.status().is_none());
    }

    #[test]
    fn result_outputs_append_error_position() {
        let descs = <Result<(String, i64), HttpError> as Outputs>::describe();
        assert_eq!(descs.len(), 3);
        assert!(descs[2].caps().error);

        let roles = [OutputRole::Body, OutputRole::Body, OutputRole::Error];
        let ok: Result<(String, i64), HttpError> = Ok(("a".into(), 1));
        let slots = ok.into_slots(&roles);
        assert!(matches!(slots[2], OutputSlot::Error(None)));

        let err: Result<(String, i64), HttpError> = Err(HttpError::not_found());
        let slots = err.into_slots(&roles);
        assert!(matches!(slots[0], OutputSlot::Skip));
        assert!(matches!(slots[1], OutputSlot::Skip));
        assert!(matches!(&slots[2], OutputSlot::Error(Some(e)) if e.status() == Some(StatusCode::NOT_FOUND)));
    }

    #[test]
    fn none_body_renders_null() {
        let slots = <Option<String> as Outputs>::into_slots(None, &[OutputRole::Body]);
        let res = render_all(slots).finish();
        assert_eq!(res.body_ref().as_bytes(), b"null");
        assert_eq!(res.header_value("content-type"), Some(&b"application/json"[..]));
    }

    #[test]
    fn none_error_is_no_error() {
        let slots = <Option<HttpError> as Outputs>::into_slots(None, &[OutputRole::Error]);
        assert!(matches!(slots[0], OutputSlot::Error(None)));
    }

    #[test]
    fn json_wrapper_uses_inner_name() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Item {
            id: u32,
        }
        assert_eq!(<Json<Item> as Output>::describe().name(), "Item");
        let item = <Json<Item> as Input>::decode(InputSource::Body(br#"{"id":3}"#)).unwrap();
        assert_eq!(item.0.id, 3);
    }

    #[test]
    fn body_render_keeps_existing_content_type() {
        let mut res = ResponseWriter::new();
        res.set_header("Content-Type", "application/vnd.custom+json");
        Box::new(JsonBody(1)).render(&mut res).unwrap();
        let res = res.finish();
        assert_eq!(
            res.header_value("content-type"),
            Some(&b"application/vnd.custom+json"[..])
        );
        assert_eq!(res.body_ref().as_bytes(), b"1");
    }
}
