use crate::value::Value;
use indexmap::IndexMap;
use std::time::Duration;

/// The outcome of a single assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionRecord {
    pub status: bool,
    pub name: String,
    pub result: Value,
    pub expected: Value,
    /// Time elapsed since the previous assertion of the same operation,
    /// or since the operation started for the first one.
    pub duration: Duration,
}

impl AssertionRecord {
    /// Compare `result` against `expected` and build a record from it.
    pub fn evaluate(
        name: impl Into<String>,
        result: impl Into<Value>,
        expected: impl Into<Value>,
        duration: Duration,
    ) -> Self {
        let result = result.into();
        let expected = expected.into();
        Self {
            status: result == expected,
            name: name.into(),
            result,
            expected,
            duration,
        }
    }
}

/// Assertion records of a test unit, grouped by operation name.
///
/// Within an operation, records keep the order in which they were made.
#[derive(Debug, Default)]
pub struct AssertionLedger {
    records: IndexMap<String, Vec<AssertionRecord>>,
}

impl AssertionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the records produced by the operation, in call order.
    pub fn records(&self, operation: &str) -> &[AssertionRecord] {
        self.records.get(operation).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every operation that recorded at least one assertion.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AssertionRecord])> + '_ {
        self.records
            .iter()
            .map(|(name, records)| (name.as_str(), &records[..]))
    }

    pub fn has_failure(&self, operation: &str) -> bool {
        self.records(operation).iter().any(|record| !record.status)
    }

    /// Return the 1-based number the next assertion of the operation will get.
    pub fn next_assertion_number(&self, operation: &str) -> usize {
        self.records(operation).len() + 1
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn append(&mut self, operation: &str, record: AssertionRecord) {
        match self.records.get_mut(operation) {
            Some(records) => records.push(record),
            None => {
                self.records.insert(operation.to_owned(), vec![record]);
            }
        }
    }
}
