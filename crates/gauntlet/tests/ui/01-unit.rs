use gauntlet::{test_unit, Collection, Context, Unit};

struct Unit1;

#[test_unit]
impl Unit1 {
    pub fn init(&mut self) {}

    pub fn test_sync(&mut self, ctx: &mut Context<'_>) {
        ctx.assert(true);
    }

    #[test]
    pub fn tagged(&self, ctx: &mut Context<'_>) -> Result<(), std::io::Error> {
        ctx.assert(true);
        Ok(())
    }

    pub fn test_without_context(&mut self) {}

    pub fn shutdown(&mut self, _: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

fn main() {
    let mut collection = Collection::new();
    collection.register(Unit::new(Unit1));
}
