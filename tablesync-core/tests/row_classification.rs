//! Synced / incomplete classification of source rows.
//!
//! Each `#[case]` is isolated: no shared state.

use rstest::rstest;
use serde_json::{json, Value};
use tablesync_core::{SourceRow, Uid};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_with(fields: Value) -> SourceRow {
    serde_json::from_value(json!({ "recordId": "recQ1", "fields": fields })).expect("row")
}

fn complete() -> Value {
    json!({
        "email": "a@b.com",
        "firstname": "A",
        "lastname": "B",
        "displayname": "A B",
    })
}

fn complete_with(key: &str, value: Value) -> Value {
    let mut fields = complete();
    fields[key] = value;
    fields
}

// ---------------------------------------------------------------------------
// uid marker
// ---------------------------------------------------------------------------

#[rstest]
#[case("absent", complete(), false)]
#[case("empty_string", complete_with("uid", json!("")), false)]
#[case("whitespace", complete_with("uid", json!("  ")), false)]
#[case("null", complete_with("uid", Value::Null), false)]
#[case("false", complete_with("uid", json!(false)), false)]
#[case("string", complete_with("uid", json!("u-9")), true)]
#[case("number", complete_with("uid", json!(42)), true)]
#[case("zero", complete_with("uid", json!(0)), false)]
#[case("float_zero", complete_with("uid", json!(0.0)), false)]
fn synced_marker(#[case] label: &str, #[case] fields: Value, #[case] expected: bool) {
    assert_eq!(row_with(fields).is_synced(), expected, "[{label}]");
}

// ---------------------------------------------------------------------------
// Required attributes
// ---------------------------------------------------------------------------

#[rstest]
#[case("email", json!(""))]
#[case("email", json!("   "))]
#[case("firstname", Value::Null)]
#[case("lastname", json!(12))]
#[case("displayname", json!("\t"))]
fn blank_required_attribute_is_reported(#[case] key: &str, #[case] value: Value) {
    let row = row_with(complete_with(key, value));
    let missing = row.contact().unwrap_err();
    assert_eq!(missing, vec![key]);
}

#[test]
fn empty_row_reports_all_required_attributes_in_order() {
    let row = row_with(json!({}));
    assert_eq!(
        row.missing_attributes(),
        vec!["email", "firstname", "lastname", "displayname"]
    );
}

#[test]
fn write_back_fields_carry_exact_uid() {
    let row = row_with(complete());
    let fields = row.fields_with_uid(&Uid::from("zX81uid"));
    assert_eq!(fields["uid"], json!("zX81uid"));
    assert_eq!(fields["email"], json!("a@b.com"));
}
