//! Property tests for length and numeric bound edges, enum membership, and
//! repeatability of validation.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use reqguard_core::{
    ApiDescription, BodyDecl, Constraints, EndpointSpec, FieldDecl, HttpMethod, PathTemplate,
    TypeDecl,
};
use reqguard_schema::{Dispatcher, Outcome, RequestParts, SchemaCache};

/// Dispatcher for `POST /t` whose body has one optional field `f`.
fn single_field(field: TypeDecl) -> Dispatcher {
    let api = ApiDescription::new([EndpointSpec::new(
        HttpMethod::Post,
        PathTemplate::parse("/t").unwrap(),
    )
    .body(BodyDecl::new(
        TypeDecl::object([FieldDecl::optional("f", field)]),
        true,
    ))]);
    Dispatcher::new(Arc::new(SchemaCache::build_all(&api).unwrap()))
}

/// The message reported for `body.f`, if any.
fn check(dispatcher: &Dispatcher, value: Value) -> Option<String> {
    let bytes = serde_json::to_vec(&json!({ "f": value })).unwrap();
    let outcome = dispatcher.check(&RequestParts {
        method: HttpMethod::Post,
        route: "/t",
        path_params: &[],
        query: None,
        body: &bytes,
    });
    match outcome {
        Outcome::Pass => None,
        Outcome::Reject(details) => details.get("body.f").map(str::to_string),
    }
}

proptest! {
    #[test]
    fn min_length_edge(k in 1u64..40) {
        let d = single_field(TypeDecl::string().with(Constraints::new().with_min_length(k)));
        let short = "x".repeat(k as usize - 1);
        let exact = "x".repeat(k as usize);
        prop_assert_eq!(
            check(&d, json!(short)),
            Some(format!("String length must be greater than or equal to {k}"))
        );
        prop_assert_eq!(check(&d, json!(exact)), None);
    }

    #[test]
    fn max_length_edge(k in 0u64..40) {
        let d = single_field(TypeDecl::string().with(Constraints::new().with_max_length(k)));
        let exact = "y".repeat(k as usize);
        let long = "y".repeat(k as usize + 1);
        prop_assert_eq!(check(&d, json!(exact)), None);
        prop_assert_eq!(
            check(&d, json!(long)),
            Some(format!("String length must be less than or equal to {k}"))
        );
    }

    #[test]
    fn inclusive_minimum_edge(m in -10_000i64..10_000) {
        let d = single_field(TypeDecl::integer().with(Constraints::new().with_minimum(m, false)));
        prop_assert_eq!(check(&d, json!(m)), None);
        prop_assert_eq!(
            check(&d, json!(m - 1)),
            Some(format!("Must be greater than or equal to {m}"))
        );
    }

    #[test]
    fn exclusive_minimum_edge(m in -10_000i64..10_000) {
        let d = single_field(TypeDecl::integer().with(Constraints::new().with_minimum(m, true)));
        prop_assert_eq!(check(&d, json!(m)), Some(format!("Must be greater than {m}")));
        prop_assert_eq!(check(&d, json!(m + 1)), None);
    }

    #[test]
    fn inclusive_maximum_edge(m in -10_000i64..10_000) {
        let d = single_field(TypeDecl::integer().with(Constraints::new().with_maximum(m, false)));
        prop_assert_eq!(check(&d, json!(m)), None);
        prop_assert_eq!(
            check(&d, json!(m + 1)),
            Some(format!("Must be less than or equal to {m}"))
        );
    }

    #[test]
    fn exclusive_maximum_edge(m in -10_000i64..10_000) {
        let d = single_field(TypeDecl::integer().with(Constraints::new().with_maximum(m, true)));
        prop_assert_eq!(check(&d, json!(m)), Some(format!("Must be less than {m}")));
        prop_assert_eq!(check(&d, json!(m - 1)), None);
    }

    #[test]
    fn enum_membership(value in "[a-z]{1,6}") {
        let d = single_field(
            TypeDecl::string().with(Constraints::new().with_enum(["alpha", "beta"])),
        );
        let expected = if value == "alpha" || value == "beta" {
            None
        } else {
            Some(r#"body.f must be one of the following: "alpha", "beta""#.to_string())
        };
        prop_assert_eq!(check(&d, json!(value)), expected);
    }

    #[test]
    fn array_elements_fail_independently(lengths in prop::collection::vec(0usize..10, 0..8)) {
        let d = single_field(
            TypeDecl::array(TypeDecl::string()).with(Constraints::new().with_min_length(5)),
        );
        let items: Vec<String> = lengths.iter().map(|n| "z".repeat(*n)).collect();
        let bytes = serde_json::to_vec(&json!({ "f": items })).unwrap();
        let outcome = d.check(&RequestParts {
            method: HttpMethod::Post,
            route: "/t",
            path_params: &[],
            query: None,
            body: &bytes,
        });

        let mut expected: Vec<String> = lengths
            .iter()
            .enumerate()
            .filter(|(_, n)| **n < 5)
            .map(|(i, _)| format!("body.f.{i}"))
            .collect();
        expected.sort();
        let reported: Vec<String> = match outcome {
            Outcome::Pass => Vec::new(),
            Outcome::Reject(details) => details.into_details().into_keys().collect(),
        };
        prop_assert_eq!(reported, expected);
    }

    #[test]
    fn validation_is_repeatable(name in ".{0,12}", count in any::<i32>()) {
        let d = single_field(TypeDecl::object([
            FieldDecl::required("name", TypeDecl::string().with(Constraints::new().with_min_length(3))),
            FieldDecl::optional("count", TypeDecl::integer().with(Constraints::new().with_maximum(0, true))),
        ]));
        let bytes = serde_json::to_vec(&json!({ "f": { "name": name, "count": count } })).unwrap();
        let parts = RequestParts {
            method: HttpMethod::Post,
            route: "/t",
            path_params: &[],
            query: None,
            body: &bytes,
        };
        let first = d.check(&parts);
        for _ in 0..3 {
            prop_assert_eq!(d.check(&parts), first.clone());
        }
    }
}
