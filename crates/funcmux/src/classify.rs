//! Signature classification.
//!
//! Turns the type descriptions of a handler's parameters and results into a
//! [`Signature`]: where each argument comes from and how each result is
//! written. Classification happens once per distinct signature, at
//! registration time.
//!
//! Input rules, after peeling one `Option` level:
//! 1. a `*QueryParam` name with a text or integer shape reads a query
//!    parameter keyed by the rest of the name in snake_case;
//! 2. a `FromRequest` type extracts itself from the request;
//! 3. anything else is the request body (at most one).
//!
//! Output rules:
//! 1. a `ToResponse` type renders itself;
//! 2. an error type is an error position (only the last one is honored);
//! 3. anything else is the response body (at most one).

use funcmux_core::{Inputs, OutputRole, Outputs, Shape, TypeDesc};
use serde::Serialize;
use thiserror::Error;

const QUERY_SUFFIX: &str = "QueryParam";

/// A handler signature that cannot be adapted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// Two parameters both resolve to the request body.
    #[error("multiple inputs trying to use request body: {first} and {second}")]
    MultipleBodyInputs {
        /// First body parameter type.
        first: String,
        /// Second body parameter type.
        second: String,
    },
    /// Two results both resolve to the response body.
    #[error("multiple outputs trying to use response body: {first} and {second}")]
    MultipleBodyOutputs {
        /// First body result type.
        first: String,
        /// Second body result type.
        second: String,
    },
    /// A query parameter type whose name leaves no key.
    #[error("query parameter type {type_name} has an empty name")]
    EmptyQueryName {
        /// The offending type.
        type_name: String,
    },
    /// A precompiled output converter disagrees with its declared role.
    #[error("output {index} ({type_name}) cannot take the {role:?} role")]
    InvalidOutputRole {
        /// Position in the output list.
        index: usize,
        /// Output type.
        type_name: String,
        /// Requested role.
        role: OutputRole,
    },
    /// A precompiled input converter disagrees with the parameter's type.
    #[error("input {index} ({type_name}) is a {expected:?} input, signature says {found:?}")]
    InputRoleMismatch {
        /// Position in the parameter list.
        index: usize,
        /// Parameter type.
        type_name: String,
        /// Role the type classifies to.
        expected: InputRole,
        /// Role the signature declares.
        found: InputRole,
    },
    /// A precompiled output converter disagrees with the result's type.
    #[error("output {index} ({type_name}) is a {expected:?} output, signature says {found:?}")]
    OutputRoleMismatch {
        /// Position in the result list.
        index: usize,
        /// Result type.
        type_name: String,
        /// Role the type classifies to.
        expected: OutputRole,
        /// Role the signature declares.
        found: OutputRole,
    },
    /// A precompiled signature does not fit the handler it was installed for.
    #[error(
        "signature has {inputs} inputs and {outputs} outputs, handler has {expected_inputs} and {expected_outputs}"
    )]
    ArityMismatch {
        /// Inputs in the signature.
        inputs: usize,
        /// Outputs in the signature.
        outputs: usize,
        /// Handler parameters.
        expected_inputs: usize,
        /// Handler results.
        expected_outputs: usize,
    },
}

/// Value kind read from a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Text.
    Str,
    /// Integer.
    Int,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    /// The JSON request body.
    Body,
    /// The type's own `FromRequest` impl.
    Custom,
    /// A query parameter (or router-captured path variable).
    Query(QueryKind),
}

/// How one parameter is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputConverter {
    /// Source of the value.
    pub role: InputRole,
    /// The parameter's type.
    pub desc: TypeDesc,
    /// Query key, for query roles.
    pub name: Option<String>,
    /// Whether the parameter is an `Option`.
    pub optional: bool,
}

impl InputConverter {
    /// A body input.
    #[must_use]
    pub fn body(desc: TypeDesc) -> Self {
        let optional = desc.peel().1;
        Self {
            role: InputRole::Body,
            desc,
            name: None,
            optional,
        }
    }

    /// A custom extraction input.
    #[must_use]
    pub fn custom(desc: TypeDesc) -> Self {
        let optional = desc.peel().1;
        Self {
            role: InputRole::Custom,
            desc,
            name: None,
            optional,
        }
    }

    /// A query parameter input.
    #[must_use]
    pub fn query(desc: TypeDesc, kind: QueryKind, name: impl Into<String>) -> Self {
        let optional = desc.peel().1;
        Self {
            role: InputRole::Query(kind),
            desc,
            name: Some(name.into()),
            optional,
        }
    }
}

/// How one result is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConverter {
    /// Use of the value.
    pub role: OutputRole,
    /// The result's type.
    pub desc: TypeDesc,
    /// Whether the result is an `Option`.
    pub optional: bool,
}

impl OutputConverter {
    /// Create a converter for `desc` in `role`.
    #[must_use]
    pub fn new(role: OutputRole, desc: TypeDesc) -> Self {
        let optional = desc.peel().1;
        Self {
            role,
            desc,
            optional,
        }
    }
}

/// The decode/encode plan for one handler signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    inputs: Vec<InputConverter>,
    outputs: Vec<OutputConverter>,
    response_body: Option<usize>,
    last_is_error: bool,
    uses_query: bool,
}

impl Signature {
    /// Classify the signature of a handler taking `Args` and returning `R`.
    ///
    /// # Errors
    ///
    /// See [`Signature::classify`].
    pub fn of<Args: Inputs, R: Outputs>() -> Result<Self, ClassifyError> {
        Self::classify(&Args::describe(), &R::describe())
    }

    /// Classify described parameter and result types.
    ///
    /// # Errors
    ///
    /// Fails on two body inputs, two body outputs or a query parameter type
    /// with an empty key.
    pub fn classify(inputs: &[TypeDesc], outputs: &[TypeDesc]) -> Result<Self, ClassifyError> {
        let inputs = inputs
            .iter()
            .map(classify_input)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = outputs.iter().map(classify_output).collect();
        Self::from_parts(inputs, outputs)
    }

    /// Assemble a signature from explicit converters, as a precompiled
    /// generator would.
    ///
    /// # Errors
    ///
    /// Enforces the same invariants as [`Signature::classify`], and rejects
    /// an error role on a type that is not an error.
    pub fn from_parts(
        inputs: Vec<InputConverter>,
        outputs: Vec<OutputConverter>,
    ) -> Result<Self, ClassifyError> {
        let mut request_body: Option<&TypeDesc> = None;
        let mut uses_query = false;
        for input in &inputs {
            match input.role {
                InputRole::Body => {
                    if let Some(first) = request_body {
                        return Err(ClassifyError::MultipleBodyInputs {
                            first: first.name().to_string(),
                            second: input.desc.name().to_string(),
                        });
                    }
                    request_body = Some(&input.desc);
                }
                InputRole::Query(_) => {
                    if input.name.as_deref().is_none_or(str::is_empty) {
                        return Err(ClassifyError::EmptyQueryName {
                            type_name: input.desc.name().to_string(),
                        });
                    }
                    uses_query = true;
                }
                InputRole::Custom => {}
            }
        }

        let mut response_body = None;
        for (index, output) in outputs.iter().enumerate() {
            match output.role {
                OutputRole::Body => {
                    if let Some(first) = response_body {
                        let first: &OutputConverter = &outputs[first];
                        return Err(ClassifyError::MultipleBodyOutputs {
                            first: first.desc.name().to_string(),
                            second: output.desc.name().to_string(),
                        });
                    }
                    response_body = Some(index);
                }
                OutputRole::Error if !output.desc.caps().error => {
                    return Err(ClassifyError::InvalidOutputRole {
                        index,
                        type_name: output.desc.name().to_string(),
                        role: output.role,
                    });
                }
                OutputRole::Error | OutputRole::Custom => {}
            }
        }

        let last_is_error = outputs
            .last()
            .is_some_and(|o| o.role == OutputRole::Error);

        Ok(Self {
            inputs,
            outputs,
            response_body,
            last_is_error,
            uses_query,
        })
    }

    /// Parameter converters, in declared order.
    #[must_use]
    pub fn inputs(&self) -> &[InputConverter] {
        &self.inputs
    }

    /// Result converters, in declared order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputConverter] {
        &self.outputs
    }

    /// Index of the result written as the response body.
    #[must_use]
    pub fn response_body(&self) -> Option<usize> {
        self.response_body
    }

    /// Whether the last result is an error position.
    #[must_use]
    pub fn last_is_error(&self) -> bool {
        self.last_is_error
    }

    /// Whether any parameter reads the query collection.
    #[must_use]
    pub fn uses_query(&self) -> bool {
        self.uses_query
    }

    /// Output roles, in declared order.
    #[must_use]
    pub fn output_roles(&self) -> Vec<OutputRole> {
        self.outputs.iter().map(|o| o.role).collect()
    }

    /// Check that this signature can serve a handler taking `Args` and
    /// returning `R`: one converter per parameter and result, each in the
    /// role classification gives that type. Query keys may differ.
    ///
    /// # Errors
    ///
    /// [`ClassifyError::ArityMismatch`] when the counts differ,
    /// [`ClassifyError::InputRoleMismatch`] or
    /// [`ClassifyError::OutputRoleMismatch`] for a converter in the wrong role.
    pub fn check_fits<Args: Inputs, R: Outputs>(&self) -> Result<(), ClassifyError> {
        let params = Args::describe();
        let results = R::describe();
        if self.inputs.len() != params.len() || self.outputs.len() != results.len() {
            return Err(ClassifyError::ArityMismatch {
                inputs: self.inputs.len(),
                outputs: self.outputs.len(),
                expected_inputs: params.len(),
                expected_outputs: results.len(),
            });
        }

        for (index, (converter, desc)) in self.inputs.iter().zip(&params).enumerate() {
            let expected = classify_input(desc)?.role;
            if converter.role != expected {
                return Err(ClassifyError::InputRoleMismatch {
                    index,
                    type_name: desc.name().to_string(),
                    expected,
                    found: converter.role,
                });
            }
        }
        for (index, (converter, desc)) in self.outputs.iter().zip(&results).enumerate() {
            let expected = classify_output(desc).role;
            if converter.role != expected {
                return Err(ClassifyError::OutputRoleMismatch {
                    index,
                    type_name: desc.name().to_string(),
                    expected,
                    found: converter.role,
                });
            }
        }
        Ok(())
    }
}

fn classify_input(desc: &TypeDesc) -> Result<InputConverter, ClassifyError> {
    let (inner, _) = desc.peel();
    if let Some(prefix) = inner.name().strip_suffix(QUERY_SUFFIX) {
        if inner.shape().is_query_scalar() {
            let kind = if matches!(inner.shape(), Shape::Int) {
                QueryKind::Int
            } else {
                QueryKind::Str
            };
            let name = snake_case(prefix);
            if name.is_empty() {
                return Err(ClassifyError::EmptyQueryName {
                    type_name: inner.name().to_string(),
                });
            }
            return Ok(InputConverter::query(desc.clone(), kind, name));
        }
    }

    if desc.caps().from_request {
        return Ok(InputConverter::custom(desc.clone()));
    }
    Ok(InputConverter::body(desc.clone()))
}

fn classify_output(desc: &TypeDesc) -> OutputConverter {
    let caps = desc.caps();
    let role = if caps.to_response {
        OutputRole::Custom
    } else if caps.error {
        OutputRole::Error
    } else {
        OutputRole::Body
    };
    OutputConverter::new(role, desc.clone())
}

/// `PageSize` → `page_size`, `HTTPCode` → `http_code`, `food` → `food`.
pub(crate) fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = idx.checked_sub(1).map(|i| chars[i]);
            let next = chars.get(idx + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use funcmux_core::Capabilities;

    fn query(name: &str, shape: Shape) -> TypeDesc {
        TypeDesc::new(name, shape)
    }

    fn body(name: &str) -> TypeDesc {
        TypeDesc::new(name, Shape::Struct)
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(snake_case("PageSize"), "page_size");
        assert_eq!(snake_case("UserId"), "user_id");
        assert_eq!(snake_case("HTTPCode"), "http_code");
        assert_eq!(snake_case("food"), "food");
        assert_eq!(snake_case("Page2Size"), "page2_size");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn query_parameters_are_keyed_by_name() {
        let sig = Signature::classify(
            &[
                query("PageSizeQueryParam", Shape::Int),
                TypeDesc::pointer(query("FoodQueryParam", Shape::Str)),
            ],
            &[],
        )
        .unwrap();

        let inputs = sig.inputs();
        assert_eq!(inputs[0].role, InputRole::Query(QueryKind::Int));
        assert_eq!(inputs[0].name.as_deref(), Some("page_size"));
        assert!(!inputs[0].optional);
        assert_eq!(inputs[1].role, InputRole::Query(QueryKind::Str));
        assert_eq!(inputs[1].name.as_deref(), Some("food"));
        assert!(inputs[1].optional);
        assert!(sig.uses_query());
    }

    #[test]
    fn query_suffix_with_struct_shape_is_body() {
        let sig = Signature::classify(&[body("FilterQueryParam")], &[]).unwrap();
        assert_eq!(sig.inputs()[0].role, InputRole::Body);
        assert!(!sig.uses_query());
    }

    #[test]
    fn bare_suffix_is_rejected() {
        let err = Signature::classify(&[query("QueryParam", Shape::Str)], &[]).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::EmptyQueryName {
                type_name: "QueryParam".into()
            }
        );
    }

    #[test]
    fn extractors_are_custom_and_may_be_optional() {
        let agent = TypeDesc::extractor("Agent", Shape::Struct);
        let sig =
            Signature::classify(&[agent.clone(), TypeDesc::pointer(agent), body("User")], &[])
                .unwrap();
        let roles: Vec<_> = sig.inputs().iter().map(|i| (i.role, i.optional)).collect();
        assert_eq!(
            roles,
            vec![
                (InputRole::Custom, false),
                (InputRole::Custom, true),
                (InputRole::Body, false),
            ]
        );
    }

    #[test]
    fn two_body_inputs_are_rejected_in_any_order() {
        let agent = TypeDesc::extractor("Agent", Shape::Struct);
        for inputs in [
            vec![body("A"), body("B")],
            vec![body("A"), agent.clone(), body("B")],
            vec![agent, body("A"), TypeDesc::new("Vec<u8>", Shape::Seq)],
        ] {
            let err = Signature::classify(&inputs, &[]).unwrap_err();
            assert!(matches!(err, ClassifyError::MultipleBodyInputs { .. }), "{err}");
        }
    }

    #[test]
    fn output_roles() {
        let sig = Signature::classify(
            &[],
            &[
                TypeDesc::responder("SetCookie", Shape::Struct),
                body("User"),
                TypeDesc::error("HttpError"),
            ],
        )
        .unwrap();
        assert_eq!(
            sig.output_roles(),
            vec![OutputRole::Custom, OutputRole::Body, OutputRole::Error]
        );
        assert_eq!(sig.response_body(), Some(1));
        assert!(sig.last_is_error());
    }

    #[test]
    fn error_not_last_is_still_error_role() {
        let sig = Signature::classify(&[], &[TypeDesc::error("HttpError"), body("User")]).unwrap();
        assert_eq!(sig.output_roles(), vec![OutputRole::Error, OutputRole::Body]);
        assert!(!sig.last_is_error());
    }

    #[test]
    fn two_body_outputs_are_rejected() {
        let err = Signature::classify(
            &[],
            &[body("User"), TypeDesc::responder("Header", Shape::Struct), body("Team")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClassifyError::MultipleBodyOutputs {
                first: "User".into(),
                second: "Team".into()
            }
        );
    }

    #[test]
    fn from_parts_enforces_invariants() {
        let ok = Signature::from_parts(
            vec![InputConverter::query(
                TypeDesc::new("IdQueryParam", Shape::Str),
                QueryKind::Str,
                "id",
            )],
            vec![
                OutputConverter::new(OutputRole::Body, body("User")),
                OutputConverter::new(OutputRole::Error, TypeDesc::error("HttpError")),
            ],
        )
        .unwrap();
        assert!(ok.last_is_error());
        assert!(ok.uses_query());

        let err = Signature::from_parts(
            vec![InputConverter::body(body("A")), InputConverter::body(body("B"))],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::MultipleBodyInputs { .. }));

        let err = Signature::from_parts(
            Vec::new(),
            vec![OutputConverter::new(OutputRole::Error, body("User"))],
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidOutputRole { index: 0, .. }));

        let err = Signature::from_parts(
            vec![InputConverter::query(
                TypeDesc::new("IdQueryParam", Shape::Str),
                QueryKind::Str,
                "",
            )],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyQueryName { .. }));
    }

    #[test]
    fn capabilities_survive_pointer_wrapping() {
        let token = TypeDesc::new("Token", Shape::Str).with_caps(Capabilities::FROM_REQUEST);
        let desc = TypeDesc::pointer(token);
        assert_eq!(classify_input(&desc).unwrap().role, InputRole::Custom);
    }

    #[test]
    fn signature_serializes_for_docs() {
        let sig =
            Signature::classify(&[query("IdQueryParam", Shape::Int)], &[body("User")]).unwrap();
        let value = serde_json::to_value(&sig).unwrap();
        assert_eq!(value["inputs"][0]["name"], "id");
        assert_eq!(value["inputs"][0]["role"]["query"], "int");
        assert_eq!(value["response_body"], 0);
    }
}
