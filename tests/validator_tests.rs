use schemaguard::{validate, IssueCode, MessageCatalog, Schema, ValidationError, Validator};
use serde_json::{json, Value};

fn data_issue(schema: &Value, input: &Value) -> ValidationError {
    let err = validate(schema, input).unwrap_err();
    assert!(err.is_data_issue(), "expected data issue, got {err:?}");
    err
}

fn schema_issue(schema: &Value, input: &Value) -> ValidationError {
    let err = validate(schema, input).unwrap_err();
    assert!(err.is_schema_issue(), "expected schema issue, got {err:?}");
    err
}

#[test]
fn enum_accepts_literals_or_matching_alternative() {
    let schema = json!({ "enum": ["a", true, { "type": "number", "minimum": 0 }] });

    for ok in [json!("a"), json!(true), json!(0), json!(3.5), json!(1e9)] {
        assert!(validate(&schema, &ok).is_ok(), "{ok} should match");
    }
    for bad in [json!("b"), json!(false), json!(-1), json!(null), json!([0])] {
        let err = data_issue(&schema, &bad);
        assert_eq!(err.code(), IssueCode::Enum, "{bad}");
    }

    let err = data_issue(&schema, &json!(-1));
    assert_eq!(
        err.message(),
        "Invalid value at (root), allowed values: a, true, number"
    );
}

#[test]
fn bare_list_schema_is_an_enum() {
    let schema = json!(["red", "green", 1]);
    assert!(validate(&schema, &json!("red")).is_ok());
    assert!(validate(&schema, &json!(1.0)).is_ok());
    assert_eq!(data_issue(&schema, &json!("blue")).code(), IssueCode::Enum);
}

#[test]
fn enum_alternative_schema_issue_is_not_masked() {
    let schema = json!(["x", { "type": "strin" }]);
    let err = schema_issue(&schema, &json!("y"));
    assert_eq!(err.code(), IssueCode::Typeof);
    assert_eq!(err.path().to_string(), "[1]");

    let nested = json!(["x", { "type": ["y", "z"] }]);
    assert_eq!(schema_issue(&nested, &json!("q")).code(), IssueCode::NestedEnum);
}

#[test]
fn nested_enum_list_is_a_schema_issue() {
    let schema = json!({ "type": ["a", ["b"]] });
    assert!(validate(&schema, &json!("a")).is_ok());
    assert_eq!(schema_issue(&schema, &json!("c")).code(), IssueCode::NestedEnum);
}

#[test]
fn enums_inside_alternative_properties_are_allowed() {
    let schema = json!([
        "none",
        { "type": "object", "properties": { "mode": { "type": ["fast", "slow"] } } }
    ]);
    assert!(validate(&schema, &json!({ "mode": "fast" })).is_ok());
    assert_eq!(
        data_issue(&schema, &json!({ "mode": "medium" })).code(),
        IssueCode::Enum
    );
}

#[test]
fn bare_enum_property_rejects_a_missing_field() {
    let schema = json!({ "type": "object", "properties": { "color": ["red", "green"] } });
    let err = data_issue(&schema, &json!({}));
    assert_eq!(err.code(), IssueCode::Enum);
    assert_eq!(err.path().to_string(), "color");
}

#[test]
fn string_length_bounds() {
    let schema = json!({ "type": "string", "minLength": 2, "maxLength": 4 });
    assert!(validate(&schema, &json!("ab")).is_ok());
    assert!(validate(&schema, &json!("abcd")).is_ok());
    assert_eq!(data_issue(&schema, &json!("a")).code(), IssueCode::MinLength);
    assert_eq!(data_issue(&schema, &json!("abcde")).code(), IssueCode::MaxLength);
    assert_eq!(
        data_issue(&schema, &json!("abcde")).message(),
        "(root) must be at most 4 characters long"
    );
}

#[test]
fn array_item_bounds() {
    let schema = json!({ "type": "array", "minItems": 1, "maxItems": 2 });
    assert!(validate(&schema, &json!([1])).is_ok());
    assert!(validate(&schema, &json!([1, 2])).is_ok());
    assert_eq!(data_issue(&schema, &json!([])).code(), IssueCode::MinItems);
    assert_eq!(data_issue(&schema, &json!([1, 2, 3])).code(), IssueCode::MaxItems);
}

#[test]
fn vacuous_minimum_bound_is_a_schema_issue_for_any_input() {
    let schema = json!({ "type": "string", "minLength": 0, "maxLength": 2 });
    for input in [json!(""), json!("a"), json!("abcdef")] {
        assert_eq!(
            schema_issue(&schema, &input).code(),
            IssueCode::MinLengthMinimum
        );
    }
    let schema = json!({ "type": "array", "minItems": -1 });
    assert_eq!(
        schema_issue(&schema, &json!([1])).code(),
        IssueCode::MinItemsMinimum
    );
}

#[test]
fn non_numeric_bounds_are_schema_issues() {
    let schema = json!({ "type": "string", "maxLength": "10" });
    let err = schema_issue(&schema, &json!("abc"));
    assert_eq!(err.code(), IssueCode::MaxLength);
    assert_eq!(err.message(), "`maxLength` at (root) must be a number");

    let schema = json!({ "type": "array", "minItems": null });
    assert_eq!(schema_issue(&schema, &json!([])).code(), IssueCode::MinItems);
}

#[test]
fn numeric_bounds_are_independent() {
    let schema = json!({ "type": "number", "minimum": 0, "maximum": 10, "exclusiveMaximum": 10 });
    assert!(validate(&schema, &json!(0)).is_ok());
    assert!(validate(&schema, &json!(9.99)).is_ok());
    assert_eq!(data_issue(&schema, &json!(-1)).code(), IssueCode::Minimum);
    assert_eq!(data_issue(&schema, &json!(11)).code(), IssueCode::Maximum);
    assert_eq!(
        data_issue(&schema, &json!(10)).code(),
        IssueCode::ExclusiveMaximum
    );

    let schema = json!({ "type": "integer", "exclusiveMinimum": 1 });
    let err = data_issue(&schema, &json!(1));
    assert_eq!(err.code(), IssueCode::ExclusiveMinimum);
    assert_eq!(err.message(), "(root) must be greater than 1");
}

#[test]
fn integer_and_decimal_tags() {
    assert!(validate(&json!("integer"), &json!(4)).is_ok());
    assert!(validate(&json!("integer"), &json!(4.0)).is_ok());
    assert_eq!(data_issue(&json!("integer"), &json!(4.5)).code(), IssueCode::Typeof);
    assert!(validate(&json!("decimal"), &json!(4.5)).is_ok());
    assert_eq!(data_issue(&json!("decimal"), &json!(4)).code(), IssueCode::Typeof);
    assert_eq!(data_issue(&json!("number"), &json!("4")).code(), IssueCode::Typeof);
}

#[test]
fn string_pattern() {
    let schema = json!({ "type": "string", "pattern": "^[a-z]+$" });
    assert!(validate(&schema, &json!("abc")).is_ok());
    let err = data_issue(&schema, &json!("abc1"));
    assert_eq!(err.code(), IssueCode::Pattern);
    assert_eq!(err.message(), "(root) does not match the pattern ^[a-z]+$");

    let broken = json!({ "type": "string", "pattern": "([a-z]" });
    assert_eq!(schema_issue(&broken, &json!("abc")).code(), IssueCode::Pattern);

    // regex 方言不支持前瞻，按 schema 错误报告
    let lookahead = json!({ "type": "string", "pattern": "^(?=.*[0-9]).+$" });
    assert_eq!(schema_issue(&lookahead, &json!("a1")).code(), IssueCode::Pattern);
}

#[test]
fn array_items_single_positional_and_tag() {
    let single = json!({
        "type": "object",
        "properties": { "tags": { "type": "array", "items": { "type": "string" } } }
    });
    assert!(validate(&single, &json!({ "tags": ["a", "b"] })).is_ok());
    let err = data_issue(&single, &json!({ "tags": ["a", 2] }));
    assert_eq!(err.code(), IssueCode::Typeof);
    assert_eq!(err.path().to_string(), "tags[1]");
    assert_eq!(err.message(), "tags[1] must be of type string");

    let positional = json!({ "type": "array", "items": ["string", "number"] });
    assert!(validate(&positional, &json!(["a", 1, true, null])).is_ok());
    assert!(validate(&positional, &json!(["a"])).is_ok());
    assert_eq!(
        data_issue(&positional, &json!(["a", "b"])).path().to_string(),
        "[1]"
    );

    let tag = json!({ "type": "array", "items": "integer" });
    assert!(validate(&tag, &json!([1, 2, 3])).is_ok());
    assert_eq!(data_issue(&tag, &json!([1, 2.5])).code(), IssueCode::Typeof);
}

#[test]
fn unexpected_key_names_key_and_parent() {
    let schema = json!({ "type": "object", "properties": { "a": "number" } });
    let err = data_issue(&schema, &json!({ "a": 1, "b": 2 }));
    assert_eq!(err.code(), IssueCode::UnexpectedKey);
    assert_eq!(err.path().to_string(), "b");
    assert_eq!(err.message(), "Unexpected key `b` in (root)");

    let nested = json!({
        "type": "object",
        "properties": {
            "user": { "type": "object", "properties": { "name": "string" } }
        }
    });
    let err = data_issue(&nested, &json!({ "user": { "name": "x", "age": 3 } }));
    assert_eq!(err.path().to_string(), "user.age");
    assert_eq!(err.message(), "Unexpected key `age` in user");
}

#[test]
fn additional_properties_only_opens_objects_without_declared_properties() {
    let open = json!({ "type": "object", "additionalProperties": true });
    assert!(validate(&open, &json!({ "anything": 1 })).is_ok());

    let closed = json!({ "type": "object" });
    assert!(validate(&closed, &json!({})).is_ok());
    assert_eq!(
        data_issue(&closed, &json!({ "x": 1 })).code(),
        IssueCode::UnexpectedKey
    );

    // 同时声明 properties 时 additionalProperties 不生效
    let both = json!({
        "type": "object",
        "additionalProperties": true,
        "properties": { "a": "number" }
    });
    assert!(validate(&both, &json!({ "a": 1 })).is_ok());
    assert_eq!(
        data_issue(&both, &json!({ "a": 1, "b": 2 })).code(),
        IssueCode::UnexpectedKey
    );
}

#[test]
fn required_field_and_default_exception() {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "required": true },
            "port": { "type": "integer", "required": true, "default": 8080 }
        }
    });
    assert!(validate(&schema, &json!({ "name": "svc" })).is_ok());

    let err = data_issue(&schema, &json!({ "port": 1 }));
    assert_eq!(err.code(), IssueCode::Required);
    assert_eq!(err.path().to_string(), "name");
    assert_eq!(err.message(), "name is required");

    let optional = json!({ "type": "object", "properties": { "nick": "string" } });
    assert!(validate(&optional, &json!({})).is_ok());
}

#[test]
fn malformed_schemas() {
    let err = schema_issue(&json!({}), &json!(1));
    assert_eq!(err.code(), IssueCode::RequireType);

    let err = schema_issue(&json!({ "type": "object", "properties": "x" }), &json!({}));
    assert_eq!(err.code(), IssueCode::Properties);

    let err = schema_issue(&json!({ "type": "strin" }), &json!("x"));
    assert_eq!(err.code(), IssueCode::Typeof);
    assert_eq!(
        err.message(),
        "Invalid type `strin` at (root), allowed types: string, number, integer, decimal, boolean, null, array, object"
    );

    let err = schema_issue(&json!({ "type": 5 }), &json!("x"));
    assert_eq!(err.code(), IssueCode::Typeof);
}

#[test]
fn unknown_type_on_missing_optional_field_is_not_reached() {
    let schema = json!({ "type": "object", "properties": { "x": { "type": "strin" } } });
    assert!(validate(&schema, &json!({})).is_ok());
}

#[test]
fn errors_carry_schema_metadata() {
    let schema = json!({
        "type": "object",
        "properties": {
            "age": {
                "type": "integer",
                "title": "Age",
                "description": "Age in years",
                "examples": [30]
            }
        }
    });
    let err = data_issue(&schema, &json!({ "age": "old" }));
    let issue = err.issue();
    assert_eq!(issue.title, Some(json!("Age")));
    assert_eq!(issue.description, Some(json!("Age in years")));
    assert_eq!(issue.examples, Some(json!([30])));
    assert_eq!(issue.default, None);
}

#[test]
fn first_violation_in_declaration_order_wins() {
    let schema = json!({
        "type": "object",
        "properties": { "z": "string", "a": "string" }
    });
    let err = data_issue(&schema, &json!({ "a": 1, "z": 2 }));
    assert_eq!(err.path().to_string(), "z");
}

#[test]
fn validation_is_deterministic() {
    let schema = Schema::from_value(&json!({
        "type": "object",
        "properties": { "a": { "type": "array", "items": "string", "maxItems": 2 } }
    }));
    let input = json!({ "a": ["x", "y", "z"] });
    let validator = Validator::default();
    let first = validator.validate(&schema, &input).unwrap_err();
    let second = validator.validate(&schema, &input).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn custom_catalog_renders_messages() {
    let catalog = MessageCatalog::builtin()
        .clone()
        .with_template(IssueCode::Required, false, "Se requiere $path");
    let validator = Validator::new(&catalog);
    let schema = json!({ "type": "object", "properties": { "id": { "type": "string", "required": true } } });
    let err = validator.validate_value(&schema, &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "Se requiere id");
}

#[test]
fn error_serializes_for_callers() {
    let schema = json!({ "type": "object", "properties": { "n": { "type": "number", "maximum": 3 } } });
    let err = data_issue(&schema, &json!({ "n": 4 }));
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["domain"], json!("data"));
    assert_eq!(value["code"], json!("maximum"));
    assert_eq!(value["path"], json!(["n"]));
    assert_eq!(value["message"], json!("n must be less than or equal to 3"));
}
