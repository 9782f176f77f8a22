//! Subsystem demo: a container block exposing an inner block through a proxy
//! port. Firing the container fires its whole cohort.
//!
//! Run with: cargo run -p syedra-core --example subsystem

use syedra_core::{Block, BlockIo, Graph, PortRegistry, Result};

/// Inner block: doubles its input.
struct Double;

impl Block<i64> for Double {
    fn block_name(&self) -> &str {
        "Double"
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        Ok(PortRegistry::new()
            .with_input("x", Some(0))
            .with_output("y", Some(0)))
    }

    fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
        let x = io.get("x")?.copied().unwrap_or_default();
        io.set("y", 2 * x)
    }
}

/// Container forwarding its inner source through a proxy port.
struct Subsystem;

impl Block<i64> for Subsystem {
    fn block_name(&self) -> &str {
        "Subsystem"
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        Ok(PortRegistry::new().with_proxy("y"))
    }
}

/// Constant source.
struct Source(i64);

impl Block<i64> for Source {
    fn block_name(&self) -> &str {
        "Source"
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        Ok(PortRegistry::new().with_output("y", Some(0)))
    }

    fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
        io.set("y", self.0)
    }
}

/// Prints `x`.
struct Sink;

impl Block<i64> for Sink {
    fn block_name(&self) -> &str {
        "Sink"
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        Ok(PortRegistry::new().with_input("x", Some(0)))
    }

    fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
        println!("sink: {}", io.get("x")?.copied().unwrap_or_default());
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut graph = Graph::new();
    let subsystem = graph.add_block(Subsystem)?;
    let source = graph.add_sub_block(subsystem, Source(21))?;
    let double = graph.add_block(Double)?;
    let sink = graph.add_block(Sink)?;

    // Inside: source -> proxy y. Outside: proxy y -> double -> sink.
    graph.connect(source, "y", subsystem, "y")?;
    graph.connect(subsystem, "y", double, "x")?;
    graph.connect(double, "y", sink, "x")?;

    println!("cohort: {:?}", graph.cohort(subsystem)?);
    println!(
        "proxy cell: {}",
        graph.wiring().cell_label(graph.cell_id(subsystem, "y")?)
    );

    let report = graph.execute(&[subsystem])?;
    println!("{report:?}");
    Ok(())
}
