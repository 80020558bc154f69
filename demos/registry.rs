//! Type-directed decode through an ahead-of-time registry.
//!
//! Run with: cargo run --example registry

use spore::{Freeze, Result, Sporable, Spore, SporeBuilder, SporeRegistry, SporeType};

#[derive(Debug, Default)]
struct Circle {
    radius: f64,
}

impl SporeType for Circle {
    const UNIQUE_IDENTIFIER: &'static str = "shape.circle";
    const VERSION: Option<&'static str> = Some("1");
}

impl Sporable for Circle {
    fn assemble_spore(&self) -> Spore {
        SporeBuilder::for_type::<Self>().append(&self.radius).build()
    }

    fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
        self.radius = spore.reader().next_as_f64()?.unwrap_or_default();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Rect {
    width: f64,
    height: f64,
}

impl SporeType for Rect {
    const UNIQUE_IDENTIFIER: &'static str = "shape.rect";
    const VERSION: Option<&'static str> = Some("1");
}

impl Sporable for Rect {
    fn assemble_spore(&self) -> Spore {
        SporeBuilder::for_type::<Self>()
            .append(&self.width)
            .append(&self.height)
            .build()
    }

    fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
        let mut reader = spore.reader();
        self.width = reader.next_as_f64()?.unwrap_or_default();
        self.height = reader.next_as_f64()?.unwrap_or_default();
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut registry: SporeRegistry = SporeRegistry::new();
    registry.register_type::<Circle>().register_type::<Rect>();

    let drawing = SporeBuilder::new()
        .append(&Circle { radius: 2.0 })
        .append(&Rect {
            width: 3.0,
            height: 4.5,
        })
        .append_null_payload()
        .build();

    let frozen = drawing.to_string();
    println!("Drawing:\n{}\n", frozen);

    let thawed = Spore::from_frozen(&frozen)?;
    let mut reader = thawed.reader();
    while reader.has_next() {
        match reader.next_as_automatic(&registry)? {
            Some(shape) => println!("shape -> {}", shape.freeze()),
            None => println!("shape -> (absent)"),
        }
    }

    Ok(())
}
