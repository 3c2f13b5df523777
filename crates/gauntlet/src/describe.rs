use crate::{
    ledger::AssertionRecord,
    value::{Kind, Value},
};

/// Describe why an assertion failed in a single human-readable line.
pub fn describe_mismatch(record: &AssertionRecord) -> String {
    let (expected, result) = (&record.expected, &record.result);

    if expected.kind() != result.kind() {
        return format!(
            "Expected '{}' but resulted in '{}'",
            expected.kind(),
            result.kind()
        );
    }

    match (expected, result) {
        (Value::Bool(..), Value::Bool(..)) => {
            format!("Expected '{}' but resulted in '{}'", expected, result)
        }
        _ if expected.is_structured() => {
            "Expected array but resulted in array with different content.".to_owned()
        }
        (
            Value::Object {
                type_name: expected,
                ..
            },
            Value::Object {
                type_name: result, ..
            },
        ) => format!("Expected '{}' but resulted in '{}'", expected, result),
        _ => match expected.kind() {
            Kind::String | Kind::Integer | Kind::Double => {
                format!("Expected '{}' but resulted in '{}'", expected, result)
            }
            _ => "Failed the assertion".to_owned(),
        },
    }
}
