use gauntlet::{test_unit, Context, TestUnit, Unit};

struct Renamed;

#[test_unit(name = "Custom", must_pass = false, crate = ::gauntlet)]
impl Renamed {
    pub fn test_a(&mut self, ctx: &mut Context<'_>) {
        ctx.evaluate(1, 1);
    }
}

fn main() {
    let unit = Unit::new(Renamed);
    assert_eq!(unit.name(), "Custom");
    assert!(!unit.must_pass());
}
