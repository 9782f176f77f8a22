//! Basic diagram: a manual source feeding a printer through one wire.
//!
//! Run with: cargo run -p syedra-core --example basic
//! Set `RUST_LOG=syedra_core=debug` to see wiring and wavefront logs.

use syedra_core::{Block, BlockIo, Graph, PortRegistry, Result};
use tracing_subscriber::EnvFilter;

/// Output set from outside the diagram.
struct Manual;

impl Block<f64> for Manual {
    fn block_name(&self) -> &str {
        "Manual"
    }

    fn ports(&self) -> Result<PortRegistry<f64>> {
        Ok(PortRegistry::new().with_output("value", Some(0.0)))
    }
}

/// Prints whatever arrives on `value`.
struct Printer;

impl Block<f64> for Printer {
    fn block_name(&self) -> &str {
        "Display"
    }

    fn ports(&self) -> Result<PortRegistry<f64>> {
        Ok(PortRegistry::new().with_input("value", Some(0.0)))
    }

    fn update(&mut self, io: &mut BlockIo<'_, f64>) -> Result<()> {
        println!("{}: {:.2}", io.name(), io.get("value")?.copied().unwrap_or_default());
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut graph = Graph::new();
    let manual = graph.add_block(Manual)?;
    let printer = graph.add_block(Printer)?;
    graph.connect(manual, "value", printer, "value")?;

    for value in [0.5, 1.25, 3.0] {
        graph.set(manual, "value", value)?;
        let report = graph.execute(&[manual])?;
        println!(
            "  {} wavefronts, {} updates, {:?}",
            report.wavefronts, report.updates, report.outcome
        );
    }
    Ok(())
}
