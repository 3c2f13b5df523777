/*!
A test execution and reporting engine.

Test units group related test operations over a shared fixture, with an
optional `init` and `shutdown` hook. Operations record assertions through
their [`Context`]; the results are collected per unit and rendered live to
the terminal, ending with a banner naming the first failure of the run.

```no_run
use gauntlet::{test_unit, Collection, Context, Unit};

#[derive(Default)]
struct LoginTest {
    attempts: u32,
}

#[test_unit]
impl LoginTest {
    pub fn init(&mut self) {
        self.attempts = 0;
    }

    pub fn test_valid_login(&mut self, ctx: &mut Context<'_>) {
        self.attempts += 1;
        ctx.evaluate(self.attempts, 1u32);
    }
}

fn main() {
    let mut collection = Collection::new();
    collection.register(Unit::new(LoginTest::default()));
    gauntlet::test_main(&mut collection).exit();
}
```

[`Context`]: ./struct.Context.html
!*/

#![doc(html_root_url = "https://docs.rs/gauntlet/0.1.0-dev")]
#![forbid(clippy::unimplemented, clippy::todo)]

#[macro_use]
mod macros;

pub mod cli;
pub mod layout;
pub mod reporter;
pub mod style;

mod collection;
mod describe;
mod error;
mod ledger;
mod report;
mod runner;
mod termination;
mod unit;
mod value;

pub use crate::{
    cli::{test_main, Args, ExitStatus},
    collection::Collection,
    describe::describe_mismatch,
    error::{Cause, OperationFailure, RunError},
    ledger::{AssertionLedger, AssertionRecord},
    report::{CollectionOutcome, Failure, Reporter, RunOutcome, TestResultInfo},
    runner::{run, run_with, Callbacks},
    termination::Termination,
    unit::{
        format_test_name, Context, Describe, Hook, Operation, TestFn, TestUnit, Unit, UnitBuilder,
        TEST_PREFIX,
    },
    value::{Kind, Value},
};

/// Declare a test unit from an inherent `impl` block.
///
/// Public methods whose names start with `test`, and methods marked with
/// `#[test]`, become the test operations of the unit in declaration order.
/// Methods named `init` and `shutdown` become its lifecycle hooks. Each of
/// them takes `&mut self` (or `&self`) and optionally a `&mut Context<'_>`,
/// and returns either `()` or a `Result<(), E>`.
///
/// The attribute accepts `name = "..."` to override the unit name (the type
/// name by default) and `must_pass = false` to disable the halt policy.
pub use gauntlet_macros::test_unit;

hidden_item! {
    /// Re-exported items for #[test_unit]
    pub mod _reexports {
        pub use crate::{
            termination::Termination,
            unit::{Context, Describe, UnitBuilder},
        };
    }
}
