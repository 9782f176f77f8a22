//! Run configuration demo: load or create a config, install logging, and run
//! a bounded self-triggering diagram with it.
//!
//! Run with: cargo run -p syedra-config --example run_config

use syedra_config::{RunConfig, default_config_path, init_tracing};
use syedra_core::{Block, BlockIo, Graph, PortRegistry};

struct Periodic;

impl Block<u64> for Periodic {
    fn block_name(&self) -> &str {
        "Periodic"
    }

    fn ports(&self) -> syedra_core::Result<PortRegistry<u64>> {
        Ok(PortRegistry::new()
            .with_input("trigger", Some(0))
            .with_output("y", Some(0)))
    }

    fn update(&mut self, io: &mut BlockIo<'_, u64>) -> syedra_core::Result<()> {
        let n = io.get("trigger")?.copied().unwrap_or_default();
        println!("tick {}", n + 1);
        io.set("y", n + 1)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = default_config_path();
    let mut config = RunConfig::load_or_default(&path)?;
    if config.scheduler.max_wavefronts.is_none() {
        config = config.with_max_wavefronts(5);
    }
    init_tracing(&config.logging)?;

    println!("=== Run Config ({}) ===\n", path.display());
    println!("{}", config.to_toml()?);

    let mut graph = Graph::with_options(config.execute_options());
    let periodic = graph.add_block(Periodic)?;
    graph.connect(periodic, "y", periodic, "trigger")?;

    let report = graph.execute(&[periodic])?;
    println!("\n{report:?}");
    Ok(())
}
