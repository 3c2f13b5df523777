use gauntlet::{test_unit, Collection, Context, Unit, Value};
use std::collections::BTreeMap;

#[derive(Default)]
struct Arithmetic {
    total: i64,
}

#[test_unit]
impl Arithmetic {
    pub fn init(&mut self) {
        self.total = 40;
    }

    pub fn test_addition(&mut self, ctx: &mut Context<'_>) {
        self.total += 2;
        ctx.evaluate(self.total, 42);
        ctx.evaluate_named(0.1 + 0.2 > 0.3, true, "Floating point");
    }

    #[test]
    pub fn parses_numbers(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let parsed: i64 = "42".parse()?;
        ctx.evaluate(parsed, self.total);
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.total = 0;
    }
}

struct Records;

#[test_unit(name = "StructuredValues")]
impl Records {
    pub fn test_maps(&mut self, ctx: &mut Context<'_>) {
        let mut user = BTreeMap::new();
        user.insert("name", "alice");
        ctx.evaluate(user.clone(), user);
    }

    pub fn test_options(&mut self, ctx: &mut Context<'_>) {
        ctx.evaluate(None::<i32>, Value::Null);
        ctx.evaluate(Some("x"), "x");
    }
}

fn main() {
    let mut collection = Collection::new();
    collection.register(Unit::new(Arithmetic::default()));
    collection.register(Unit::new(Records));

    let status = gauntlet::test_main(&mut collection);
    drop(collection);
    status.exit();
}
