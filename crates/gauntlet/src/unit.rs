use crate::{
    ledger::{AssertionLedger, AssertionRecord},
    value::Value,
};
use std::{fmt, time::Instant};

/// The signature shared by test operations and lifecycle hooks.
pub type TestFn<S> = fn(&mut S, &mut Context<'_>) -> anyhow::Result<()>;

/// Prefix that marks a method as a test operation.
pub const TEST_PREFIX: &str = "test";

/// A discovered test operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    display_name: String,
    tagged: bool,
}

impl Operation {
    fn new(name: String, tagged: bool) -> Self {
        let display_name = format_test_name(&name);
        Self {
            name,
            display_name,
            tagged,
        }
    }

    /// Return the name of this operation, which is also its identity.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Return whether the operation was discovered through an explicit
    /// test marker rather than through its name.
    #[inline]
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }
}

/// Lifecycle hooks of a test unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hook {
    Init,
    Shutdown,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::Init => "init",
            Hook::Shutdown => "shutdown",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Hook::Init => "Initializer",
            Hook::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Context values while running a test operation.
///
/// Assertions made through the context are attributed to the operation
/// currently being executed. When there is no such operation (e.g. inside
/// lifecycle hooks), or the named target is not one of the discovered
/// operations, the assertion is silently dropped.
pub struct Context<'a> {
    ledger: &'a mut AssertionLedger,
    operations: &'a [Operation],
    current: Option<&'a str>,
    must_pass: bool,
    last_mark: Instant,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        ledger: &'a mut AssertionLedger,
        operations: &'a [Operation],
        current: Option<&'a str>,
        must_pass: bool,
    ) -> Self {
        Self {
            ledger,
            operations,
            current,
            must_pass,
            last_mark: Instant::now(),
        }
    }

    /// Return the name of the operation being executed.
    pub fn current_operation(&self) -> Option<&str> {
        self.current
    }

    /// Return whether further assertions of the current operation will be
    /// discarded because an earlier one failed under the halt policy.
    pub fn is_halted(&self) -> bool {
        self.must_pass
            && self
                .current
                .map_or(false, |operation| self.ledger.has_failure(operation))
    }

    /// Compare `result` against `expected` and record the outcome.
    ///
    /// Returns whether the two values are strictly equal.
    pub fn evaluate(&mut self, result: impl Into<Value>, expected: impl Into<Value>) -> bool {
        let current = self.current;
        self.record(current, None, result.into(), expected.into())
    }

    /// Same as `evaluate`, with an explicit assertion label.
    pub fn evaluate_named(
        &mut self,
        result: impl Into<Value>,
        expected: impl Into<Value>,
        name: impl Into<String>,
    ) -> bool {
        let current = self.current;
        self.record(current, Some(name.into()), result.into(), expected.into())
    }

    /// Record that `result` is `true`.
    pub fn assert(&mut self, result: impl Into<Value>) -> bool {
        self.evaluate(result, true)
    }

    pub fn assert_named(&mut self, result: impl Into<Value>, name: impl Into<String>) -> bool {
        self.evaluate_named(result, true, name)
    }

    /// Record an assertion on behalf of the named operation.
    ///
    /// Nothing is recorded if `operation` is not a discovered operation of
    /// this unit.
    pub fn evaluate_for(
        &mut self,
        operation: &str,
        result: impl Into<Value>,
        expected: impl Into<Value>,
        name: Option<&str>,
    ) -> bool {
        self.record(
            Some(operation),
            name.map(ToOwned::to_owned),
            result.into(),
            expected.into(),
        )
    }

    fn record(
        &mut self,
        operation: Option<&str>,
        name: Option<String>,
        result: Value,
        expected: Value,
    ) -> bool {
        let status = result == expected;

        let operations = self.operations;
        let operation = match operation.and_then(|op| operations.iter().find(|o| o.name == op)) {
            Some(operation) => &operation.name,
            None => {
                log::trace!("dropping an assertion made outside of a test operation");
                return status;
            }
        };

        if self.must_pass && self.ledger.has_failure(operation) {
            log::trace!("{}: assertion not evaluated after a failure", operation);
            return status;
        }

        let now = Instant::now();
        let duration = now.duration_since(self.last_mark);
        self.last_mark = now;

        let name = name.unwrap_or_else(|| {
            format!("Assertion {}", self.ledger.next_assertion_number(operation))
        });
        self.ledger.append(
            operation,
            AssertionRecord {
                status,
                name,
                result,
                expected,
                duration,
            },
        );

        status
    }
}

/// The object-safe interface through which units are executed.
pub trait TestUnit {
    /// Return the name of the unit, which is also its identity.
    fn name(&self) -> &str;

    /// Return whether a failure in this unit stops the remaining ones.
    fn must_pass(&self) -> bool;

    /// Return the operations discovered for this unit, in execution order.
    fn operations(&self) -> &[Operation];

    fn number_of_tests(&self) -> usize {
        self.operations().len()
    }

    fn has_hook(&self, hook: Hook) -> bool;

    /// Execute the hook. Does nothing if the unit does not define it.
    fn call_hook(&mut self, hook: Hook) -> anyhow::Result<()>;

    /// Execute the operation at `index` in `operations()`.
    fn call_operation(&mut self, index: usize) -> anyhow::Result<()>;

    fn ledger(&self) -> &AssertionLedger;
}

impl fmt::Debug for dyn TestUnit + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name())
            .field("must_pass", &self.must_pass())
            .field("operations", &self.operations())
            .finish()
    }
}

/// Types that declare a test unit over themselves.
///
/// Usually implemented through `#[test_unit]`.
pub trait Describe: Sized {
    fn describe(unit: UnitBuilder<Self>) -> UnitBuilder<Self>;
}

struct Candidate<S> {
    name: String,
    tagged: bool,
    testfn: TestFn<S>,
}

/// Declarative list of the methods of a test unit.
pub struct UnitBuilder<S> {
    name: String,
    must_pass: bool,
    candidates: Vec<Candidate<S>>,
    init: Option<TestFn<S>>,
    shutdown: Option<TestFn<S>>,
}

impl<S> UnitBuilder<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            must_pass: true,
            candidates: vec![],
            init: None,
            shutdown: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the halt policy. Defaults to `true`.
    pub fn must_pass(mut self, must_pass: bool) -> Self {
        self.must_pass = must_pass;
        self
    }

    /// Declare a method. It becomes a test operation only if its name
    /// starts with `test`.
    pub fn method(mut self, name: impl Into<String>, testfn: TestFn<S>) -> Self {
        self.candidates.push(Candidate {
            name: name.into(),
            tagged: false,
            testfn,
        });
        self
    }

    /// Declare a method explicitly marked as a test operation.
    pub fn tagged(mut self, name: impl Into<String>, testfn: TestFn<S>) -> Self {
        self.candidates.push(Candidate {
            name: name.into(),
            tagged: true,
            testfn,
        });
        self
    }

    pub fn init(mut self, hook: TestFn<S>) -> Self {
        self.init = Some(hook);
        self
    }

    pub fn shutdown(mut self, hook: TestFn<S>) -> Self {
        self.shutdown = Some(hook);
        self
    }

    /// Run the discovery and create the unit.
    pub fn build(self, state: S) -> Unit<S> {
        let mut operations: Vec<Operation> = vec![];
        let mut testfns = vec![];
        for candidate in self.candidates {
            if !candidate.tagged && !candidate.name.starts_with(TEST_PREFIX) {
                continue;
            }
            if operations.iter().any(|o| o.name == candidate.name) {
                log::warn!(
                    "{}: operation '{}' is declared more than once",
                    self.name,
                    candidate.name
                );
                continue;
            }
            operations.push(Operation::new(candidate.name, candidate.tagged));
            testfns.push(candidate.testfn);
        }
        log::debug!(
            "{}: discovered {} operation(s)",
            self.name,
            operations.len()
        );

        Unit {
            name: self.name,
            must_pass: self.must_pass,
            operations,
            testfns,
            init: self.init,
            shutdown: self.shutdown,
            ledger: AssertionLedger::new(),
            state,
        }
    }
}

/// A test unit over the fixture state `S`.
pub struct Unit<S> {
    name: String,
    must_pass: bool,
    operations: Vec<Operation>,
    testfns: Vec<TestFn<S>>,
    init: Option<TestFn<S>>,
    shutdown: Option<TestFn<S>>,
    ledger: AssertionLedger,
    state: S,
}

impl<S> Unit<S> {
    pub fn builder(name: impl Into<String>) -> UnitBuilder<S> {
        UnitBuilder::new(name)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: Describe> Unit<S> {
    /// Create a unit from the declaration of `S`.
    ///
    /// The unit is named after the type unless the declaration says otherwise.
    pub fn new(state: S) -> Self {
        S::describe(UnitBuilder::new(short_type_name::<S>())).build(state)
    }
}

impl<S> TestUnit for Unit<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn must_pass(&self) -> bool {
        self.must_pass
    }

    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn has_hook(&self, hook: Hook) -> bool {
        match hook {
            Hook::Init => self.init.is_some(),
            Hook::Shutdown => self.shutdown.is_some(),
        }
    }

    fn call_hook(&mut self, hook: Hook) -> anyhow::Result<()> {
        let hookfn = match hook {
            Hook::Init => self.init,
            Hook::Shutdown => self.shutdown,
        };
        match hookfn {
            Some(hookfn) => {
                let mut ctx =
                    Context::new(&mut self.ledger, &self.operations, None, self.must_pass);
                hookfn(&mut self.state, &mut ctx)
            }
            None => Ok(()),
        }
    }

    fn call_operation(&mut self, index: usize) -> anyhow::Result<()> {
        let testfn = match self.testfns.get(index) {
            Some(&testfn) => testfn,
            None => anyhow::bail!("{}: no operation at index {}", self.name, index),
        };
        let current = self.operations[index].name.as_str();
        let mut ctx = Context::new(
            &mut self.ledger,
            &self.operations,
            Some(current),
            self.must_pass,
        );
        testfn(&mut self.state, &mut ctx)
    }

    fn ledger(&self) -> &AssertionLedger {
        &self.ledger
    }
}

impl<S> fmt::Debug for Unit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("must_pass", &self.must_pass)
            .field("operations", &self.operations)
            .field("ledger", &self.ledger)
            .finish()
    }
}

/// Format an operation name for display.
///
/// The `test` prefix is removed, camel case humps and underscores become
/// word boundaries and every word is capitalized.
///
/// ```
/// # use gauntlet::format_test_name;
/// assert_eq!(format_test_name("testUser_login_flow"), "User Login Flow");
/// assert_eq!(format_test_name("test_valid_login"), "Valid Login");
/// ```
pub fn format_test_name(name: &str) -> String {
    let name = match name.strip_prefix(TEST_PREFIX) {
        Some(rest) => lower_first(rest),
        None => name.to_owned(),
    };

    let mut snake = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && prev.map_or(false, |p| p.is_alphanumeric() || p == '_') {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
        prev = Some(c);
    }

    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(upper_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Fixture {
        history: Vec<&'static str>,
    }

    fn noop(_: &mut Fixture, _: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn display_names() {
        assert_eq!(format_test_name("testUser_login_flow"), "User Login Flow");
        assert_eq!(format_test_name("testUser_login"), "User Login");
        assert_eq!(format_test_name("testA"), "A");
        assert_eq!(format_test_name("testValidLogin"), "Valid Login");
        assert_eq!(format_test_name("test_invalid_login"), "Invalid Login");
        assert_eq!(format_test_name("checkSomething"), "Check Something");
        assert_eq!(format_test_name("test"), "");
    }

    #[test]
    fn discovery_keeps_declaration_order() {
        let unit = Unit::builder("Order")
            .method("test_c", noop)
            .method("helper", noop)
            .method("test_a", noop)
            .tagged("verifies_b", noop)
            .build(Fixture::default());

        let names: Vec<_> = unit.operations().iter().map(Operation::name).collect();
        assert_eq!(names, vec!["test_c", "test_a", "verifies_b"]);
        assert_eq!(unit.number_of_tests(), 3);
        assert!(unit.operations()[2].is_tagged());

        let again: Vec<_> = unit.operations().iter().map(Operation::name).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn duplicate_operations_are_discovered_once() {
        let unit = Unit::builder("Dup")
            .method("test_a", noop)
            .tagged("test_a", noop)
            .build(Fixture::default());
        assert_eq!(unit.number_of_tests(), 1);
        assert!(!unit.operations()[0].is_tagged());
    }

    #[test]
    fn default_assertion_names_are_numbered() {
        let mut unit = Unit::builder("Names")
            .method("test_names", |_, ctx| {
                ctx.assert(true);
                ctx.evaluate_named(1, 1, "custom");
                ctx.evaluate(2, 2);
                Ok(())
            })
            .build(Fixture::default());
        unit.call_operation(0).unwrap();

        let names: Vec<_> = unit
            .ledger()
            .records("test_names")
            .iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(names, vec!["Assertion 1", "custom", "Assertion 3"]);
    }

    #[test]
    fn halt_within_operation() {
        let mut unit = Unit::builder("Halt")
            .method("test_halts", |_, ctx| {
                ctx.assert(true);
                ctx.assert(false);
                assert!(ctx.is_halted());
                ctx.assert(true);
                Ok(())
            })
            .build(Fixture::default());
        unit.call_operation(0).unwrap();

        let records = unit.ledger().records("test_halts");
        assert_eq!(records.len(), 2);
        assert!(records[0].status);
        assert!(!records[1].status);
    }

    #[test]
    fn no_halt_within_operation_without_must_pass() {
        let mut unit = Unit::builder("NoHalt")
            .must_pass(false)
            .method("test_continues", |_, ctx| {
                ctx.assert(true);
                ctx.assert(false);
                assert!(!ctx.is_halted());
                ctx.assert(true);
                Ok(())
            })
            .build(Fixture::default());
        unit.call_operation(0).unwrap();

        assert_eq!(unit.ledger().records("test_continues").len(), 3);
    }

    #[test]
    fn orphan_assertions_are_dropped() {
        let mut unit = Unit::builder("Orphans")
            .init(|_, ctx| {
                assert_eq!(ctx.current_operation(), None);
                ctx.assert(false);
                Ok(())
            })
            .method("test_known", |_, ctx| {
                ctx.evaluate_for("test_unknown", 1, 2, None);
                ctx.evaluate_for("helper", 1, 2, Some("helper"));
                Ok(())
            })
            .method("helper", noop)
            .build(Fixture::default());

        unit.call_hook(Hook::Init).unwrap();
        unit.call_operation(0).unwrap();
        assert!(unit.ledger().is_empty());
    }

    #[test]
    fn explicit_target_is_recorded() {
        let mut unit = Unit::builder("Explicit")
            .method("test_a", |_, ctx| {
                ctx.evaluate_for("test_b", "x", "x", Some("cross"));
                Ok(())
            })
            .method("test_b", noop)
            .build(Fixture::default());
        unit.call_operation(0).unwrap();

        assert!(unit.ledger().records("test_a").is_empty());
        assert_eq!(unit.ledger().records("test_b")[0].name, "cross");
    }

    #[test]
    fn assertion_timers_are_chained() {
        use std::{thread::sleep, time::Duration};

        let mut unit = Unit::builder("Timers")
            .method("test_timed", |_, ctx| {
                sleep(Duration::from_millis(20));
                ctx.assert(true);
                sleep(Duration::from_millis(40));
                ctx.assert(true);
                Ok(())
            })
            .build(Fixture::default());

        let start = Instant::now();
        unit.call_operation(0).unwrap();
        let elapsed = start.elapsed();

        let records = unit.ledger().records("test_timed");
        assert_eq!(records.len(), 2);
        assert!(records[0].duration >= Duration::from_millis(20));
        assert!(records[1].duration >= Duration::from_millis(40));
        assert!(records[1].duration < elapsed);
        assert!(records[0].duration + records[1].duration <= elapsed);
    }

    #[test]
    fn hooks_and_state() {
        let mut unit = Unit::builder("Hooks")
            .init(|state: &mut Fixture, _| {
                state.history.push("init");
                Ok(())
            })
            .method("test_a", |state, _| {
                state.history.push("test_a");
                Ok(())
            })
            .build(Fixture::default());

        assert!(unit.has_hook(Hook::Init));
        assert!(!unit.has_hook(Hook::Shutdown));
        unit.call_hook(Hook::Init).unwrap();
        unit.call_hook(Hook::Shutdown).unwrap();
        unit.call_operation(0).unwrap();
        assert!(unit.call_operation(1).is_err());
        assert_eq!(unit.into_state().history, vec!["init", "test_a"]);
    }

    #[test]
    fn named_after_the_type() {
        struct LoginTest;
        impl Describe for LoginTest {
            fn describe(unit: UnitBuilder<Self>) -> UnitBuilder<Self> {
                unit.method("test_login", |_, _| Ok(()))
            }
        }

        let unit = Unit::new(LoginTest);
        assert_eq!(unit.name(), "LoginTest");
        assert!(unit.must_pass());
        assert_eq!(unit.number_of_tests(), 1);
    }
}
