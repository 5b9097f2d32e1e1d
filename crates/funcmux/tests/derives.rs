//! Tests for the conversion derives.
//!
//! Covers:
//! - `QueryParam`: names, shapes, decoding of string and integer wrappers
//! - `Payload`: decode/encode directions and JSON shapes
//! - `Extractor` / `Responder`: declared capabilities and the roles the
//!   classifier assigns to them

use funcmux::core::{Input, InputSource, Output, QueryValue, Shape};
use funcmux::prelude::*;
use funcmux::{InputRole, OutputRole, QueryKind, Signature};

// ============================================================================
// FIXTURES
// ============================================================================

#[derive(Debug, QueryParam)]
struct PageSizeQueryParam(u32);

#[derive(Debug, QueryParam)]
struct SearchTermQueryParam {
    term: String,
}

#[derive(Debug, Deserialize, Payload)]
#[payload(decode)]
struct Filter {
    tags: Vec<String>,
}

#[allow(dead_code)]
#[derive(Debug, Serialize, Deserialize, Payload)]
enum Status {
    Active,
    Archived,
}

#[derive(Debug, Default, Extractor)]
struct Caller {
    agent: Option<String>,
}

impl FromRequest for Caller {
    type Error = HttpError;

    fn from_request(&mut self, _ctx: &RequestContext, req: &Request) -> Result<(), HttpError> {
        self.agent = req
            .headers()
            .get_str("user-agent")
            .map(str::to_string);
        Ok(())
    }
}

#[derive(Responder)]
struct NoCache;

impl ToResponse for NoCache {
    type Error = HttpError;

    fn to_response(self, res: &mut ResponseWriter) -> Result<(), HttpError> {
        res.set_header("cache-control", "no-store");
        Ok(())
    }
}

fn query_source(name: &'static str, value: Option<QueryValue<'static>>) -> InputSource<'static> {
    InputSource::Query { name, value }
}

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

#[test]
fn test_query_param_describe() {
    let desc = PageSizeQueryParam::describe();
    assert_eq!(desc.name(), "PageSizeQueryParam");
    assert_eq!(desc.shape(), &Shape::Int);

    let desc = SearchTermQueryParam::describe();
    assert_eq!(desc.shape(), &Shape::Str);
}

#[test]
fn test_query_param_decodes_integers() {
    let value =
        PageSizeQueryParam::decode(query_source("page_size", Some(QueryValue::Int(25)))).unwrap();
    assert_eq!(value.0, 25);

    let err =
        PageSizeQueryParam::decode(query_source("page_size", Some(QueryValue::Int(-1))))
            .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(
        err.to_string(),
        "query param 'page_size' expected to be integer value"
    );
}

#[test]
fn test_query_param_decodes_named_field() {
    let value =
        SearchTermQueryParam::decode(query_source("search_term", Some(QueryValue::Str("rust"))))
            .unwrap();
    assert_eq!(value.term, "rust");

    let err = SearchTermQueryParam::decode(query_source("search_term", None)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing required query parameter 'search_term'"
    );
}

#[test]
fn test_query_param_names_in_signature() {
    let signature =
        Signature::of::<(PageSizeQueryParam, Option<SearchTermQueryParam>), ()>().unwrap();
    let inputs = signature.inputs();
    assert_eq!(inputs[0].role, InputRole::Query(QueryKind::Int));
    assert_eq!(inputs[0].name.as_deref(), Some("page_size"));
    assert!(!inputs[0].optional);
    assert_eq!(inputs[1].role, InputRole::Query(QueryKind::Str));
    assert_eq!(inputs[1].name.as_deref(), Some("search_term"));
    assert!(inputs[1].optional);
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[test]
fn test_payload_decodes_body() {
    let filter = Filter::decode(InputSource::Body(br#"{"tags":["a","b"]}"#)).unwrap();
    assert_eq!(filter.tags, vec!["a", "b"]);

    let err = Filter::decode(InputSource::Body(b"[1]")).unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().starts_with("decoding json: "));
}

#[test]
fn test_payload_shapes() {
    assert_eq!(<Filter as Input>::describe().shape(), &Shape::Struct);
    assert_eq!(<Status as Input>::describe().shape(), &Shape::Any);
    assert_eq!(<Status as Output>::describe().name(), "Status");
}

#[test]
fn test_payload_roles() {
    let signature = Signature::of::<(Filter,), Vec<Status>>().unwrap();
    assert_eq!(signature.inputs()[0].role, InputRole::Body);
    assert_eq!(signature.output_roles(), vec![OutputRole::Body]);
    assert_eq!(signature.response_body(), Some(0));
}

// ============================================================================
// CUSTOM CONVERSIONS
// ============================================================================

#[test]
fn test_extractor_and_responder_roles() {
    let caller = <Caller as Input>::describe();
    assert!(caller.caps().from_request);
    assert_eq!(caller.name(), "Caller");

    let signature =
        Signature::of::<(Caller, Filter), Result<(NoCache, Status), HttpError>>().unwrap();
    assert_eq!(signature.inputs()[0].role, InputRole::Custom);
    assert_eq!(signature.inputs()[1].role, InputRole::Body);
    assert_eq!(
        signature.output_roles(),
        vec![OutputRole::Custom, OutputRole::Body, OutputRole::Error]
    );
    assert!(signature.last_is_error());
}

#[test]
fn test_custom_conversions_run() {
    let mux = ServeMux::new();
    mux.handle(
        "/whoami",
        |caller: Caller| async move { (NoCache, caller.agent) },
        &[],
    )
    .unwrap();

    let client = funcmux::testing::TestClient::new(mux);
    let res = client
        .get("/whoami")
        .header("user-agent", "curl/8")
        .send();
    res.assert_status(StatusCode::OK)
        .assert_header("cache-control", "no-store");
    assert_eq!(res.text(), r#""curl/8""#);
}
