//! Criterion benchmarks for the wavefront scheduler (`syedra-core::graph`).
//!
//! Measures scheduling overhead with a trivial `Step` block (`y = x + 1`).
//! Two axes:
//!
//! - **Wire** - building a diagram: block registration plus cell merges
//! - **Execute** - one full `execute()` run over chains and fan-outs
//!
//! Run with: `cargo bench -p syedra-core -- scheduler/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use syedra_core::{Block, BlockId, BlockIo, Graph, PortRegistry, Result};

const CHAIN_LENGTHS: &[usize] = &[5, 20, 100];
const FAN_OUTS: &[usize] = &[4, 16, 64];

// ---------------------------------------------------------------------------
// Trivial Step block
// ---------------------------------------------------------------------------

/// Adds one to its input. The head of a chain has no input.
struct Step {
    head: bool,
}

impl Block<i64> for Step {
    fn block_name(&self) -> &str {
        "Step"
    }

    fn ports(&self) -> Result<PortRegistry<i64>> {
        let ports = PortRegistry::new().with_output("y", Some(0));
        Ok(if self.head {
            ports
        } else {
            ports.with_input("x", Some(0))
        })
    }

    fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
        let x = if self.head {
            0
        } else {
            io.get("x")?.copied().unwrap_or_default()
        };
        io.set("y", x + 1)
    }
}

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

fn make_chain(n: usize) -> (Graph<i64>, BlockId) {
    let mut graph = Graph::new();
    let head = graph.add_block(Step { head: true }).unwrap();
    let mut prev = head;
    for _ in 1..n {
        let node = graph.add_block(Step { head: false }).unwrap();
        graph.connect(prev, "y", node, "x").unwrap();
        prev = node;
    }
    (graph, head)
}

fn make_fan_out(n: usize) -> (Graph<i64>, BlockId) {
    let mut graph = Graph::new();
    let head = graph.add_block(Step { head: true }).unwrap();
    for _ in 0..n {
        let node = graph.add_block(Step { head: false }).unwrap();
        graph.connect(head, "y", node, "x").unwrap();
    }
    (graph, head)
}

// ---------------------------------------------------------------------------
// Wiring benchmarks
// ---------------------------------------------------------------------------

fn bench_wire(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/wire");

    for &n in CHAIN_LENGTHS {
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, &n| {
            b.iter(|| black_box(make_chain(n)));
        });
    }
    for &n in FAN_OUTS {
        group.bench_with_input(BenchmarkId::new("fan_out", n), &n, |b, &n| {
            b.iter(|| black_box(make_fan_out(n)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Execute benchmarks
// ---------------------------------------------------------------------------

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/execute");

    for &n in CHAIN_LENGTHS {
        let (mut graph, head) = make_chain(n);
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, _| {
            b.iter(|| black_box(graph.execute(&[head]).unwrap()));
        });
    }
    for &n in FAN_OUTS {
        let (mut graph, head) = make_fan_out(n);
        group.bench_with_input(BenchmarkId::new("fan_out", n), &n, |b, _| {
            b.iter(|| black_box(graph.execute(&[head]).unwrap()));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Async execute - current-thread runtime
// ---------------------------------------------------------------------------

fn bench_async_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/async_execute");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for &n in CHAIN_LENGTHS {
        let (mut graph, head) = make_chain(n);
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, _| {
            b.iter(|| black_box(runtime.block_on(graph.async_execute(&[head])).unwrap()));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_wire, bench_execute, bench_async_execute);
criterion_main!(benches);
