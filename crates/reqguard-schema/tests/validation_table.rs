//! Integration test: the validate-test endpoint, driven through the
//! dispatcher with one row per constraint kind.
//!
//! Every row sends a body that is valid except for the field under test,
//! so each rejection carries exactly one detail.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use reqguard_core::{
    ApiDescription, BodyDecl, Constraints, EndpointSpec, FieldDecl, HttpMethod, ParameterDecl,
    PathTemplate, TypeDecl,
};
use reqguard_schema::{Dispatcher, Outcome, RequestParts, SchemaCache};

const TEST_UUID: &str = "00000000-0000-0000-0000-000000000000";
const ROUTE: &str = "/validate-test/{test_id}";

fn validate_test_endpoint() -> EndpointSpec {
    let uuid = || Constraints::new().with_format("uuid");
    let pattern = || Constraints::new().with_pattern(r"^test\d$");
    let strings = |c: Constraints| TypeDecl::array(TypeDecl::string()).with(c);

    let payload = TypeDecl::object([
        FieldDecl::required("format_str", TypeDecl::string().with(uuid())),
        FieldDecl::required("format_str_arr", strings(uuid())),
        FieldDecl::optional("min_len_str", TypeDecl::string().with(Constraints::new().with_min_length(5))),
        FieldDecl::optional("min_len_str_arr", strings(Constraints::new().with_min_length(5))),
        FieldDecl::optional("max_len_str", TypeDecl::string().with(Constraints::new().with_max_length(7))),
        FieldDecl::optional("max_len_str_arr", strings(Constraints::new().with_max_length(7))),
        FieldDecl::optional("enum_str", TypeDecl::string().with(Constraints::new().with_enum(["Foo", "Bar"]))),
        FieldDecl::optional("enum_str_arr", strings(Constraints::new().with_enum(["Foo", "Bar"]))),
        FieldDecl::optional("pattern_str", TypeDecl::string().with(pattern())),
        FieldDecl::optional("pattern_str_arr", strings(pattern())),
        FieldDecl::optional("raw_json", TypeDecl::any()),
        FieldDecl::optional("minimum", TypeDecl::integer().with(Constraints::new().with_minimum(5, false))),
        FieldDecl::optional("maximum", TypeDecl::integer().with(Constraints::new().with_maximum(1, false))),
        FieldDecl::optional(
            "nested",
            TypeDecl::object([FieldDecl::required("foo", TypeDecl::string())]),
        ),
    ]);

    EndpointSpec::new(HttpMethod::Post, PathTemplate::parse(ROUTE).unwrap())
        .summary("Test the validator")
        .param(
            ParameterDecl::path("test_id", TypeDecl::string().with(uuid())).describe("group id"),
        )
        .param(ParameterDecl::query("page", TypeDecl::integer()).describe("page number to return"))
        .param(ParameterDecl::query("per_page", TypeDecl::integer()))
        .body(BodyDecl::new(payload, true))
}

fn dispatcher() -> Dispatcher {
    let api = ApiDescription::new([validate_test_endpoint()]);
    Dispatcher::new(Arc::new(SchemaCache::build_all(&api).unwrap()))
}

/// The smallest body that passes: both required fields present.
fn base_body() -> Value {
    json!({ "format_str": TEST_UUID, "format_str_arr": [TEST_UUID] })
}

/// Post `fields` merged over [`base_body`]; return the details map.
fn post(dispatcher: &Dispatcher, fields: Value) -> BTreeMap<String, String> {
    let mut body = base_body();
    if let (Some(base), Value::Object(extra)) = (body.as_object_mut(), fields) {
        base.extend(extra);
    }
    let bytes = serde_json::to_vec(&body).unwrap();
    let outcome = dispatcher.check(&RequestParts {
        method: HttpMethod::Post,
        route: ROUTE,
        path_params: &[("test_id", TEST_UUID)],
        query: None,
        body: &bytes,
    });
    match outcome {
        Outcome::Pass => BTreeMap::new(),
        Outcome::Reject(details) => details.into_details(),
    }
}

fn details(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn constraint_table() {
    let dispatcher = dispatcher();
    let rows: Vec<(&str, Value, BTreeMap<String, String>)> = vec![
        (
            "scalar uuid with non-uuid value",
            json!({"format_str": "not-a-uuid"}),
            details(&[("body.format_str", "Does not match format 'uuid'")]),
        ),
        ("scalar uuid with uuid value", json!({"format_str": TEST_UUID}), details(&[])),
        (
            "uuid array with non-uuid value",
            json!({"format_str_arr": ["not-a-uuid"]}),
            details(&[("body.format_str_arr.0", "Does not match format 'uuid'")]),
        ),
        ("uuid array with uuid values", json!({"format_str_arr": [TEST_UUID]}), details(&[])),
        (
            "min length string too short",
            json!({"min_len_str": "1234"}),
            details(&[("body.min_len_str", "String length must be greater than or equal to 5")]),
        ),
        ("min length string long enough", json!({"min_len_str": "123456"}), details(&[])),
        (
            "min length array with a short entry",
            json!({"min_len_str_arr": ["1234"]}),
            details(&[("body.min_len_str_arr.0", "String length must be greater than or equal to 5")]),
        ),
        (
            "min length array all long enough",
            json!({"min_len_str_arr": ["12345", "123456"]}),
            details(&[]),
        ),
        (
            "max length string too long",
            json!({"max_len_str": "12345678"}),
            details(&[("body.max_len_str", "String length must be less than or equal to 7")]),
        ),
        ("max length string short enough", json!({"max_len_str": "123456"}), details(&[])),
        (
            "max length array with a long entry",
            json!({"max_len_str_arr": ["12345678"]}),
            details(&[("body.max_len_str_arr.0", "String length must be less than or equal to 7")]),
        ),
        (
            "max length array all short enough",
            json!({"max_len_str_arr": ["123456", "1234567"]}),
            details(&[]),
        ),
        (
            "enum string outside the set",
            json!({"enum_str": "test"}),
            details(&[(
                "body.enum_str",
                r#"body.enum_str must be one of the following: "Foo", "Bar""#,
            )]),
        ),
        ("enum string inside the set", json!({"enum_str": "Foo"}), details(&[])),
        (
            "enum array with a value outside the set",
            json!({"enum_str_arr": ["test"]}),
            details(&[(
                "body.enum_str_arr.0",
                r#"body.enum_str_arr.0 must be one of the following: "Foo", "Bar""#,
            )]),
        ),
        ("enum array inside the set", json!({"enum_str_arr": ["Bar"]}), details(&[])),
        (
            "pattern string not matching",
            json!({"pattern_str": "test"}),
            details(&[("body.pattern_str", r"Does not match pattern '^test\d$'")]),
        ),
        ("pattern string matching", json!({"pattern_str": "test1"}), details(&[])),
        (
            "pattern array with a non-matching value",
            json!({"pattern_str_arr": ["test"]}),
            details(&[("body.pattern_str_arr.0", r"Does not match pattern '^test\d$'")]),
        ),
        (
            "pattern array all matching",
            json!({"pattern_str_arr": ["test1", "test2", "test3"]}),
            details(&[]),
        ),
        (
            "minimum below bound",
            json!({"minimum": 4}),
            details(&[("body.minimum", "Must be greater than or equal to 5")]),
        ),
        ("minimum at bound", json!({"minimum": 5}), details(&[])),
        (
            "maximum above bound",
            json!({"maximum": 2}),
            details(&[("body.maximum", "Must be less than or equal to 1")]),
        ),
        ("maximum at bound", json!({"maximum": 1}), details(&[])),
        (
            "raw json accepts anything",
            json!({"raw_json": {"deeply": [1, "two", null]}}),
            details(&[]),
        ),
        (
            "wrong scalar type",
            json!({"minimum": "five"}),
            details(&[("body.minimum", "Invalid type. Expected: integer, given: string")]),
        ),
        (
            "nested required missing",
            json!({"nested": {}}),
            details(&[("body.nested.foo", "Is required")]),
        ),
        ("nested required present", json!({"nested": {"foo": "bar"}}), details(&[])),
    ];

    for (name, fields, expected) in rows {
        assert_eq!(post(&dispatcher, fields), expected, "row: {name}");
    }
}

#[test]
fn only_offending_indices_are_reported() {
    let found = post(
        &dispatcher(),
        json!({"min_len_str_arr": ["12345", "1", "123456", "12"]}),
    );
    let keys: Vec<_> = found.keys().map(String::as_str).collect();
    assert_eq!(keys, ["body.min_len_str_arr.1", "body.min_len_str_arr.3"]);
}

#[test]
fn missing_required_top_level_fields() {
    let dispatcher = dispatcher();
    let outcome = dispatcher.check(&RequestParts {
        method: HttpMethod::Post,
        route: ROUTE,
        path_params: &[("test_id", TEST_UUID)],
        query: None,
        body: b"{}",
    });
    let details = outcome.into_rejection().unwrap().details;
    assert_eq!(details.get("body.format_str"), Some("Is required"));
    assert_eq!(details.get("body.format_str_arr"), Some("Is required"));
    assert_eq!(details.len(), 2);
}

#[test]
fn required_uuid_array_may_not_be_omitted() {
    let body = serde_json::to_vec(&json!({ "format_str": TEST_UUID })).unwrap();
    let outcome = dispatcher().check(&RequestParts {
        method: HttpMethod::Post,
        route: ROUTE,
        path_params: &[("test_id", TEST_UUID)],
        query: None,
        body: &body,
    });
    let found = outcome.into_rejection().unwrap().details.into_details();
    assert_eq!(found, details(&[("body.format_str_arr", "Is required")]));
}

#[test]
fn path_and_query_violations_use_bare_names() {
    let dispatcher = dispatcher();
    let body = serde_json::to_vec(&base_body()).unwrap();
    let outcome = dispatcher.check(&RequestParts {
        method: HttpMethod::Post,
        route: "/validate-test/:test_id",
        path_params: &[("test_id", "10")],
        query: Some("page=abc&per_page=20"),
        body: &body,
    });
    let details = outcome.into_rejection().unwrap().details.into_details();
    assert_eq!(
        details,
        BTreeMap::from([
            ("test_id".to_string(), "Does not match format 'uuid'".to_string()),
            (
                "page".to_string(),
                "Invalid type. Expected: integer, given: string".to_string()
            ),
        ])
    );
}

#[test]
fn int_param_scenario() {
    let api = ApiDescription::new([EndpointSpec::new(
        HttpMethod::Get,
        PathTemplate::parse("/items").unwrap(),
    )
    .param(ParameterDecl::query("int_param", TypeDecl::integer()))]);
    let dispatcher = Dispatcher::new(Arc::new(SchemaCache::build_all(&api).unwrap()));
    let check = |query| {
        dispatcher.check(&RequestParts {
            method: HttpMethod::Get,
            route: "/items",
            path_params: &[],
            query: Some(query),
            body: b"",
        })
    };

    let rejected = check("int_param=abc").into_rejection().unwrap();
    assert_eq!(
        serde_json::to_value(rejected).unwrap(),
        json!({"details": {"int_param": "Invalid type. Expected: integer, given: string"}})
    );
    assert!(check("int_param=10").is_pass());
    assert!(check("").is_pass());
}

#[test]
fn uuid_path_scenario() {
    let api = ApiDescription::new([EndpointSpec::new(
        HttpMethod::Get,
        PathTemplate::parse("/groups/{uuid_id}").unwrap(),
    )
    .param(ParameterDecl::path(
        "uuid_id",
        TypeDecl::string().with(Constraints::new().with_format("uuid")),
    ))]);
    let dispatcher = Dispatcher::new(Arc::new(SchemaCache::build_all(&api).unwrap()));
    let check = |segment| {
        dispatcher.check(&RequestParts {
            method: HttpMethod::Get,
            route: "/groups/{uuid_id}",
            path_params: &[("uuid_id", segment)],
            query: None,
            body: b"",
        })
    };

    let details = check("10").into_rejection().unwrap().details;
    assert_eq!(details.get("uuid_id"), Some("Does not match format 'uuid'"));
    assert!(check(TEST_UUID).is_pass());
}
