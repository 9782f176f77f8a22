//! Wavefront scheduler.
//!
//! A run starts from the execution cohorts of the caller's start blocks and
//! proceeds in wavefronts:
//!
//! 1. clear the input tokens of every frontier block
//! 2. update every frontier block, in frontier order, one at a time
//! 3. set the output tokens of every frontier block, which marks every input
//!    latch sharing a cell with those outputs anywhere in the graph
//! 4. scan the whole registry for blocks with at least one input whose input
//!    tokens are all set; their cohorts form the next frontier
//!
//! The run ends when the frontier is empty, when a block returns
//! [`Error::Terminated`], or when [`ExecuteOptions::max_wavefronts`] is hit.
//! On every exit, errors included, the input tokens of every registered block
//! are cleared.

use crate::error::{Error, Result};

use super::block::{BlockId, BlockIo};
use super::registry::Graph;

/// Scheduler limits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Stop after this many wavefronts. `None` runs until the graph quiesces.
    pub max_wavefronts: Option<usize>,
}

impl ExecuteOptions {
    /// Options with a wavefront limit.
    pub fn with_max_wavefronts(max_wavefronts: usize) -> Self {
        Self {
            max_wavefronts: Some(max_wavefronts),
        }
    }
}

/// How a scheduling run ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// The frontier became empty.
    #[default]
    Quiescent,
    /// A block raised [`Error::Terminated`].
    Terminated,
    /// [`ExecuteOptions::max_wavefronts`] was reached.
    WavefrontLimit,
}

/// Summary of a scheduling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Wavefronts that started running.
    pub wavefronts: usize,
    /// Block updates that were issued.
    pub updates: usize,
    /// How the run ended.
    pub outcome: Outcome,
}

impl<V: 'static> Graph<V> {
    /// Runs the synchronous wavefront loop from `start`.
    ///
    /// Fails with [`Error::NoStartBlock`] if `start` is empty. Any error other
    /// than [`Error::Terminated`] raised by an update is returned after the
    /// global token cleanup.
    pub fn execute(&mut self, start: &[BlockId]) -> Result<ExecutionReport> {
        let frontier = self.start_frontier(start)?;
        let mut report = ExecutionReport::default();
        let result = self.propagate(frontier, &mut report);
        self.finish(result, report)
    }

    /// Runs the cooperative asynchronous wavefront loop from `start`.
    ///
    /// Each block's [`update_async`](super::Block::update_async) is awaited to
    /// completion, under that block's lock, before the next one is issued.
    /// Other tasks on the same runtime may interleave while an update is
    /// suspended.
    pub async fn async_execute(&mut self, start: &[BlockId]) -> Result<ExecutionReport> {
        let frontier = self.start_frontier(start)?;
        let mut report = ExecutionReport::default();
        let result = self.propagate_async(frontier, &mut report).await;
        self.finish(result, report)
    }

    /// Blocks whose inputs all hold a token, in registration order.
    ///
    /// Blocks without inputs are never ready.
    pub fn ready_blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|entry| {
                let inputs = &entry.meta.inputs;
                !inputs.is_empty()
                    && inputs
                        .iter()
                        .all(|&latch| self.wiring.token(latch).unwrap_or(false))
            })
            .map(|entry| entry.meta.id)
            .collect()
    }

    /// Clears the input tokens of `blocks`.
    pub fn clear_input_tokens(&mut self, blocks: &[BlockId]) -> Result<()> {
        for &block in blocks {
            let inputs = self.entry(block)?.meta.inputs.clone();
            for latch in inputs {
                self.wiring.set_token(latch, false)?;
            }
        }
        Ok(())
    }

    /// Sets the output tokens of `blocks`, propagating to connected inputs.
    pub fn set_output_tokens(&mut self, blocks: &[BlockId]) -> Result<()> {
        for &block in blocks {
            let outputs = self.entry(block)?.meta.outputs.clone();
            for latch in outputs {
                self.wiring.set_token(latch, true)?;
            }
        }
        Ok(())
    }

    fn propagate(&mut self, mut frontier: Vec<BlockId>, report: &mut ExecutionReport) -> Result<()> {
        while !frontier.is_empty() {
            if self.limit_reached(report) {
                return Ok(());
            }
            self.begin_wavefront(&frontier, report)?;
            for &block in &frontier {
                report.updates += 1;
                self.update_block(block)?;
            }
            frontier = self.end_wavefront(&frontier)?;
        }
        Ok(())
    }

    async fn propagate_async(
        &mut self,
        mut frontier: Vec<BlockId>,
        report: &mut ExecutionReport,
    ) -> Result<()> {
        while !frontier.is_empty() {
            if self.limit_reached(report) {
                return Ok(());
            }
            self.begin_wavefront(&frontier, report)?;
            for &block in &frontier {
                report.updates += 1;
                self.update_block_async(block).await?;
            }
            frontier = self.end_wavefront(&frontier)?;
        }
        Ok(())
    }

    /// Concatenated cohorts of `blocks`, duplicates kept.
    fn cohorts_of(&self, blocks: &[BlockId]) -> Result<Vec<BlockId>> {
        let mut frontier = Vec::new();
        for &block in blocks {
            frontier.extend_from_slice(&self.entry(block)?.meta.cohort);
        }
        Ok(frontier)
    }

    fn start_frontier(&self, start: &[BlockId]) -> Result<Vec<BlockId>> {
        if start.is_empty() {
            return Err(Error::NoStartBlock);
        }
        self.cohorts_of(start)
    }

    fn limit_reached(&self, report: &mut ExecutionReport) -> bool {
        match self.options.max_wavefronts {
            Some(max) if report.wavefronts >= max => {
                report.outcome = Outcome::WavefrontLimit;
                #[cfg(feature = "tracing")]
                tracing::debug!("execute: wavefront limit {max} reached");
                true
            }
            _ => false,
        }
    }

    fn begin_wavefront(&mut self, frontier: &[BlockId], report: &mut ExecutionReport) -> Result<()> {
        report.wavefronts += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            "wavefront[{}]: {}",
            report.wavefronts,
            frontier
                .iter()
                .filter_map(|&b| self.block_name(b).ok())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.clear_input_tokens(frontier)
    }

    fn end_wavefront(&mut self, frontier: &[BlockId]) -> Result<Vec<BlockId>> {
        self.set_output_tokens(frontier)?;
        let ready = self.ready_blocks();
        self.cohorts_of(&ready)
    }

    fn finish(&mut self, result: Result<()>, mut report: ExecutionReport) -> Result<ExecutionReport> {
        let everything: Vec<BlockId> = self.blocks().collect();
        let cleanup = self.clear_input_tokens(&everything);

        match result {
            Ok(()) => {}
            Err(Error::Terminated) => {
                report.outcome = Outcome::Terminated;
                #[cfg(feature = "tracing")]
                tracing::debug!("execute: terminated in wavefront {}", report.wavefronts);
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("execute: aborted in wavefront {}: {err}", report.wavefronts);
                return Err(err);
            }
        }
        cleanup?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "execute: {:?} after {} wavefronts, {} updates",
            report.outcome,
            report.wavefronts,
            report.updates
        );
        Ok(report)
    }

    fn update_block(&mut self, block: BlockId) -> Result<()> {
        let Self { blocks, wiring, .. } = self;
        let entry = blocks
            .get_mut(block.0 as usize)
            .ok_or(Error::BlockNotFound(block))?;
        let mut io = BlockIo {
            meta: &entry.meta,
            wiring,
        };
        entry.behavior.update(&mut io)
    }

    async fn update_block_async(&mut self, block: BlockId) -> Result<()> {
        let Self { blocks, wiring, .. } = self;
        let entry = blocks
            .get_mut(block.0 as usize)
            .ok_or(Error::BlockNotFound(block))?;
        let lock = std::rc::Rc::clone(&entry.lock);
        let _guard = lock.lock().await;
        let mut io = BlockIo {
            meta: &entry.meta,
            wiring,
        };
        entry.behavior.update_async(&mut io).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Block, PortRegistry};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records its name on every update and optionally writes `y`.
    struct Probe {
        name: &'static str,
        inputs: &'static [&'static str],
        output: bool,
        log: Log,
    }

    impl Block<i32> for Probe {
        fn block_name(&self) -> &str {
            self.name
        }

        fn ports(&self) -> Result<PortRegistry<i32>> {
            let mut ports = PortRegistry::new();
            for &input in self.inputs {
                ports = ports.with_input(input, Some(0));
            }
            if self.output {
                ports = ports.with_output("y", Some(0));
            }
            Ok(ports)
        }

        fn update(&mut self, io: &mut BlockIo<'_, i32>) -> Result<()> {
            self.log.borrow_mut().push(self.name.to_owned());
            if self.output {
                let sum: i32 = self
                    .inputs
                    .iter()
                    .map(|p| io.get(p).map(|v| v.copied().unwrap_or(0)))
                    .sum::<Result<i32>>()?;
                io.set("y", sum + 1)?;
            }
            Ok(())
        }
    }

    fn probe(log: &Log, name: &'static str, inputs: &'static [&'static str], output: bool) -> Probe {
        Probe {
            name,
            inputs,
            output,
            log: Rc::clone(log),
        }
    }

    struct Stop;

    impl Block<i32> for Stop {
        fn block_name(&self) -> &str {
            "Stop"
        }

        fn ports(&self) -> Result<PortRegistry<i32>> {
            Ok(PortRegistry::new().with_input("x", None))
        }

        fn update(&mut self, _io: &mut BlockIo<'_, i32>) -> Result<()> {
            Err(Error::Terminated)
        }
    }

    #[test]
    fn test_empty_start_rejected() {
        let mut graph = Graph::<i32>::new();
        assert!(matches!(graph.execute(&[]), Err(Error::NoStartBlock)));
    }

    #[test]
    fn test_single_block_runs_once() {
        let log = Log::default();
        let mut graph = Graph::new();
        let source = graph.add_block(probe(&log, "Source", &[], true)).unwrap();

        let report = graph.execute(&[source]).unwrap();
        assert_eq!(report.wavefronts, 1);
        assert_eq!(report.updates, 1);
        assert_eq!(report.outcome, Outcome::Quiescent);
        assert_eq!(*log.borrow(), ["Source"]);
    }

    #[test]
    fn test_chain_runs_in_wavefronts() {
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let b = graph.add_block(probe(&log, "B", &["x"], true)).unwrap();
        let c = graph.add_block(probe(&log, "C", &["x"], true)).unwrap();
        graph.connect(a, "y", b, "x").unwrap();
        graph.connect(b, "y", c, "x").unwrap();

        let report = graph.execute(&[a]).unwrap();
        assert_eq!(report.wavefronts, 3);
        assert_eq!(*log.borrow(), ["A", "B", "C"]);
        assert_eq!(graph.get(c, "y").unwrap(), Some(&3));
    }

    #[test]
    fn test_join_waits_for_all_inputs() {
        // A feeds B and P.x; B feeds P.y. P only fires once both are set.
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let b = graph.add_block(probe(&log, "B", &["x"], true)).unwrap();
        let p = graph.add_block(probe(&log, "P", &["x", "w"], false)).unwrap();
        graph.connect(a, "y", b, "x").unwrap();
        graph.connect(a, "y", p, "x").unwrap();
        graph.connect(b, "y", p, "w").unwrap();

        let report = graph.execute(&[a]).unwrap();
        // Wave 2 runs only B since P.w has no token yet. P.x keeps its token
        // because P was not in that frontier, so P fires in wave 3.
        assert_eq!(*log.borrow(), ["A", "B", "P"]);
        assert_eq!(report.wavefronts, 3);
    }

    #[test]
    fn test_tokens_cleared_after_run() {
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let b = graph.add_block(probe(&log, "B", &["x"], false)).unwrap();
        graph.connect(a, "y", b, "x").unwrap();

        graph.execute(&[a]).unwrap();
        for block in graph.blocks().collect::<Vec<_>>() {
            for &latch in graph.inputs(block).unwrap() {
                assert!(!graph.wiring().token(latch).unwrap());
            }
        }
    }

    #[test]
    fn test_terminated_stops_and_cleans_up() {
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let stop = graph.add_block(Stop).unwrap();
        let after = graph.add_block(probe(&log, "After", &["x"], false)).unwrap();
        graph.connect(a, "y", stop, "x").unwrap();
        graph.connect(a, "y", after, "x").unwrap();

        let report = graph.execute(&[a]).unwrap();
        assert_eq!(report.outcome, Outcome::Terminated);
        assert_eq!(report.wavefronts, 2);
        // Stop is registered before After, so After never runs.
        assert_eq!(*log.borrow(), ["A"]);
        assert!(graph.ready_blocks().is_empty());
    }

    #[test]
    fn test_client_error_propagates_after_cleanup() {
        struct Broken;
        impl Block<i32> for Broken {
            fn block_name(&self) -> &str {
                "Broken"
            }
            fn ports(&self) -> Result<PortRegistry<i32>> {
                Ok(PortRegistry::new().with_input("x", None))
            }
            fn update(&mut self, _io: &mut BlockIo<'_, i32>) -> Result<()> {
                Err(Error::other("sensor fault"))
            }
        }

        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let broken = graph.add_block(Broken).unwrap();
        let other = graph.add_block(probe(&log, "Other", &["x"], false)).unwrap();
        graph.connect(a, "y", broken, "x").unwrap();
        graph.connect(a, "y", other, "x").unwrap();

        let err = graph.execute(&[a]).unwrap_err();
        assert_eq!(err.to_string(), "sensor fault");
        assert!(!graph.latch(other, "x").unwrap().token());
        assert!(graph.ready_blocks().is_empty());
    }

    #[test]
    fn test_self_loop_hits_wavefront_limit() {
        let log = Log::default();
        let mut graph = Graph::with_options(ExecuteOptions::with_max_wavefronts(5));
        let periodic = graph
            .add_block(probe(&log, "Periodic", &["trigger"], true))
            .unwrap();
        graph.connect(periodic, "y", periodic, "trigger").unwrap();

        let report = graph.execute(&[periodic]).unwrap();
        assert_eq!(report.outcome, Outcome::WavefrontLimit);
        assert_eq!(report.wavefronts, 5);
        assert_eq!(log.borrow().len(), 5);
        assert!(!graph.latch(periodic, "trigger").unwrap().token());
    }

    #[test]
    fn test_duplicate_start_blocks_run_twice() {
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], false)).unwrap();

        let report = graph.execute(&[a, a]).unwrap();
        assert_eq!(report.updates, 2);
        assert_eq!(*log.borrow(), ["A", "A"]);
    }

    #[tokio::test]
    async fn test_async_execute_matches_sync_order() {
        let log = Log::default();
        let mut graph = Graph::new();
        let a = graph.add_block(probe(&log, "A", &[], true)).unwrap();
        let b = graph.add_block(probe(&log, "B", &["x"], true)).unwrap();
        graph.connect(a, "y", b, "x").unwrap();

        let report = graph.async_execute(&[a]).await.unwrap();
        assert_eq!(report.wavefronts, 2);
        assert_eq!(*log.borrow(), ["A", "B"]);
        assert_eq!(graph.get(b, "y").unwrap(), Some(&2));
    }
}
