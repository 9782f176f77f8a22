//! Cooperative pipeline: five suspending stages, with a heartbeat task
//! interleaving while each stage awaits.
//!
//! Run with: cargo run -p syedra-core --example async_pipeline

use std::time::Duration;

use async_trait::async_trait;
use syedra_core::{Block, BlockIo, Graph, PortRegistry, Result};
use tracing_subscriber::EnvFilter;

struct Link {
    name: String,
    first: bool,
}

#[async_trait(?Send)]
impl Block<i64> for Link {
    fn block_name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        Ok(PortRegistry::new()
            .with_input("a", Some(0))
            .with_output("b", Some(0)))
    }

    async fn update_async(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
        if !self.first {
            let a = io.get("a")?.copied().unwrap_or_default();
            io.set("b", a + 1)?;
        }
        println!("{}: {}", self.name, io.get("b")?.copied().unwrap_or_default());
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut graph = Graph::new();
    let mut links = Vec::new();
    for i in 0..5 {
        links.push(graph.add_block(Link {
            name: format!("link_{i}"),
            first: i == 0,
        })?);
    }
    for pair in links.windows(2) {
        graph.connect(pair[0], "b", pair[1], "a")?;
    }

    let heartbeat = tokio::spawn(async {
        loop {
            println!("{}", "x".repeat(20));
            tokio::time::sleep(Duration::from_millis(350)).await;
        }
    });

    for seed in [3, 7] {
        graph.set(links[0], "b", seed)?;
        let report = graph.async_execute(&[links[0]]).await?;
        println!("{} {report:?}", "-".repeat(20));
    }
    heartbeat.abort();
    Ok(())
}
