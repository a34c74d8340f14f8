//! Geometric Brownian Motion Path Simulation
//!
//! Discrete-time GBM, one step per period:
//!
//! P_t = P_{t-1} * exp((drift - volatility^2 / 2) + volatility * Z)
//!
//! Each row of the ensemble is generated by drawing all of its normal
//! variates up front and then applying the recurrence cumulatively along the
//! time axis. Rows are independent: they can be split across rayon workers or
//! simulated in separate blocks and reassembled, and a given seed always
//! yields the same ensemble.
//!
//! Every price must stay finite and strictly positive. A step that underflows
//! to zero or overflows to infinity fails the run with `InvalidRequest`
//! naming the path and step.

use std::ops::Range;

use rayon::prelude::*;

use super::params::{SimulationRequest, DEFAULT_PARALLEL_THRESHOLD};
use super::rng::{entropy_seed, PathRng};
use crate::domain::{SimulationEnsemble, SimulationError};

/// A validated request with its base seed resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationPlan {
    request: SimulationRequest,
    seed: u64,
    /// `drift - volatility^2 / 2`
    log_drift: f64,
}

impl SimulationPlan {
    /// Validate a request and resolve its seed
    ///
    /// Unseeded requests draw a base seed from entropy; the drawn value is
    /// kept so the run can be replayed.
    pub fn new(request: &SimulationRequest) -> Result<Self, SimulationError> {
        request.validate()?;
        let seed = request.seed.unwrap_or_else(entropy_seed);
        Ok(Self {
            request: *request,
            seed,
            log_drift: request.log_drift(),
        })
    }

    pub fn request(&self) -> &SimulationRequest {
        &self.request
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn path_count(&self) -> usize {
        self.request.path_count
    }

    pub fn columns(&self) -> usize {
        self.request.horizon_steps + 1
    }

    /// Grid size in prices; `new` has already checked it is addressable
    fn grid_cells(&self) -> usize {
        self.path_count() * self.columns()
    }

    /// Fill one row with the path at `path_index`
    fn fill_path(&self, path_index: usize, row: &mut [f64]) -> Result<(), SimulationError> {
        let Some((start, steps)) = row.split_first_mut() else {
            return Ok(());
        };
        *start = self.request.last_price;

        // Batch draw, then cumulative transform in place
        PathRng::for_path(self.seed, path_index).fill_normal(steps);

        let volatility = self.request.volatility;
        let mut price = self.request.last_price;
        for (step, cell) in steps.iter_mut().enumerate() {
            price *= (self.log_drift + volatility * *cell).exp();
            if !(price.is_finite() && price > 0.0) {
                return Err(SimulationError::invalid_request(format!(
                    "path {} left the representable price range at step {} \
                     (drift {}, volatility {})",
                    path_index,
                    step + 1,
                    self.request.drift,
                    volatility
                )));
            }
            *cell = price;
        }
        Ok(())
    }

    /// Stitch blocks covering `0..path_count` back into a full ensemble
    ///
    /// Blocks may arrive in any order but must tile the path range exactly.
    pub fn assemble(
        &self,
        mut blocks: Vec<EnsembleBlock>,
    ) -> Result<SimulationEnsemble, SimulationError> {
        blocks.sort_by_key(|b| b.paths.start);

        let mut grid = Vec::with_capacity(self.grid_cells());
        let mut next = 0;
        for block in blocks {
            if block.seed != self.seed || block.columns != self.columns() {
                return Err(SimulationError::invalid_request(
                    "block was produced by a different plan",
                ));
            }
            if block.paths.start != next {
                return Err(SimulationError::invalid_request(format!(
                    "blocks do not tile the path range: expected path {}, got {}",
                    next, block.paths.start
                )));
            }
            next = block.paths.end;
            grid.extend(block.grid);
        }

        if next != self.path_count() {
            return Err(SimulationError::invalid_request(format!(
                "blocks cover {} of {} paths",
                next,
                self.path_count()
            )));
        }

        SimulationEnsemble::from_grid(
            grid,
            self.path_count(),
            self.request.horizon_steps,
            self.request.last_price,
            self.seed,
        )
    }
}

/// Rows for a contiguous range of paths
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleBlock {
    paths: Range<usize>,
    columns: usize,
    seed: u64,
    grid: Vec<f64>,
}

impl EnsembleBlock {
    pub fn paths(&self) -> Range<usize> {
        self.paths.clone()
    }

    /// Row for absolute path index `index`, if it falls in this block
    pub fn path(&self, index: usize) -> Option<&[f64]> {
        if !self.paths.contains(&index) {
            return None;
        }
        let offset = (index - self.paths.start) * self.columns;
        Some(&self.grid[offset..offset + self.columns])
    }
}

/// Generates ensembles of GBM price paths
#[derive(Debug, Clone)]
pub struct PathSimulator {
    /// Path count at which rows are generated on the rayon pool
    parallel_threshold: usize,
}

impl Default for PathSimulator {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl PathSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path count at which generation goes parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Simulate a full ensemble
    ///
    /// # Errors
    /// `InvalidRequest` when `path_count < 1`, `horizon_steps < 1` or
    /// `last_price <= 0` (also non-finite inputs, negative volatility, a grid
    /// too large to allocate, and prices that leave the f64 range).
    pub fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationEnsemble, SimulationError> {
        let plan = SimulationPlan::new(request)?;
        self.run(&plan)
    }

    /// Simulate every path of an already validated plan
    pub fn run(&self, plan: &SimulationPlan) -> Result<SimulationEnsemble, SimulationError> {
        let mut grid = vec![0.0; plan.grid_cells()];
        self.fill_rows(plan, 0, &mut grid)?;

        SimulationEnsemble::from_grid(
            grid,
            plan.path_count(),
            plan.request.horizon_steps,
            plan.request.last_price,
            plan.seed,
        )
    }

    /// Simulate only the paths in `paths`
    ///
    /// Rows are identical to the same rows of a full run with the same plan.
    pub fn simulate_block(
        &self,
        plan: &SimulationPlan,
        paths: Range<usize>,
    ) -> Result<EnsembleBlock, SimulationError> {
        if paths.start > paths.end || paths.end > plan.path_count() {
            return Err(SimulationError::invalid_request(format!(
                "path range {}..{} outside 0..{}",
                paths.start,
                paths.end,
                plan.path_count()
            )));
        }

        let mut grid = vec![0.0; paths.len() * plan.columns()];
        self.fill_rows(plan, paths.start, &mut grid)?;

        Ok(EnsembleBlock {
            paths,
            columns: plan.columns(),
            seed: plan.seed,
            grid,
        })
    }

    fn fill_rows(
        &self,
        plan: &SimulationPlan,
        first_path: usize,
        grid: &mut [f64],
    ) -> Result<(), SimulationError> {
        let columns = plan.columns();
        let rows = grid.len() / columns;
        let parallel = rows >= self.parallel_threshold;

        tracing::debug!(
            "Simulating {} paths x {} steps (seed {}, parallel: {})",
            rows,
            plan.request.horizon_steps,
            plan.seed,
            parallel
        );

        if parallel {
            grid.par_chunks_mut(columns)
                .enumerate()
                .try_for_each(|(i, row)| plan.fill_path(first_path + i, row))
        } else {
            grid.chunks_mut(columns)
                .enumerate()
                .try_for_each(|(i, row)| plan.fill_path(first_path + i, row))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request() -> SimulationRequest {
        SimulationRequest::new(100.0, 0.0005, 0.02, 30, 64).with_seed(42)
    }

    #[test]
    fn test_shape_and_start_column() {
        let ens = PathSimulator::new().simulate(&request()).unwrap();
        assert_eq!(ens.path_count(), 64);
        assert_eq!(ens.columns(), 31);
        for path in ens.paths() {
            assert_eq!(path.len(), 31);
            assert_eq!(path[0], 100.0);
        }
    }

    #[test]
    fn test_zero_volatility_flat_path() {
        let req = SimulationRequest::new(105.0, 0.0, 0.0, 3, 2).with_seed(1);
        let ens = PathSimulator::new().simulate(&req).unwrap();

        assert_eq!(ens.path(0), Some(&[105.0, 105.0, 105.0, 105.0][..]));
        assert_eq!(ens.path(1), Some(&[105.0, 105.0, 105.0, 105.0][..]));
    }

    #[test]
    fn test_zero_volatility_follows_drift_curve() {
        let drift: f64 = 0.01;
        let req = SimulationRequest::new(50.0, drift, 0.0, 20, 5).with_seed(3);
        let ens = PathSimulator::new().simulate(&req).unwrap();

        let first = ens.path(0).unwrap().to_vec();
        for path in ens.paths() {
            assert_eq!(path, &first[..]);
        }
        for (t, price) in first.iter().enumerate() {
            let expected = 50.0 * drift.exp().powi(t as i32);
            assert_relative_eq!(*price, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_seeded_runs_are_bit_identical() {
        let sim = PathSimulator::new();
        let a = sim.simulate(&request()).unwrap();
        let b = sim.simulate(&request()).unwrap();
        let bits = |e: &SimulationEnsemble| {
            e.paths().flatten().map(|p| p.to_bits()).collect::<Vec<_>>()
        };
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let req = SimulationRequest::new(100.0, 0.0005, 0.02, 30, 300).with_seed(7);
        let sequential = PathSimulator::new()
            .with_parallel_threshold(usize::MAX)
            .simulate(&req)
            .unwrap();
        let parallel = PathSimulator::new()
            .with_parallel_threshold(1)
            .simulate(&req)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_different_seeds_differ() {
        let sim = PathSimulator::new();
        let a = sim.simulate(&request()).unwrap();
        let b = sim.simulate(&request().with_seed(43)).unwrap();
        assert_ne!(a.terminal_prices(), b.terminal_prices());
    }

    #[test]
    fn test_unseeded_run_reports_replayable_seed() {
        let req = SimulationRequest::new(100.0, 0.0005, 0.02, 10, 8);
        let sim = PathSimulator::new();
        let first = sim.simulate(&req).unwrap();
        let seed = first.seed().expect("simulator always records a seed");

        let replay = sim.simulate(&req.with_seed(seed)).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_prices_positive() {
        let req = SimulationRequest::new(10.0, -0.01, 0.3, 60, 100).with_seed(11);
        let ens = PathSimulator::new().simulate(&req).unwrap();
        assert!(ens.paths().flatten().all(|p| *p > 0.0 && p.is_finite()));
    }

    #[test]
    fn test_extreme_volatility_fails_instead_of_collapsing() {
        // exp(-800 + 40 Z) underflows to zero within a few steps
        let req = SimulationRequest::new(100.0, 0.0, 40.0, 5, 200).with_seed(1);
        for threshold in [1, usize::MAX] {
            let result = PathSimulator::new()
                .with_parallel_threshold(threshold)
                .simulate(&req);
            assert!(matches!(result, Err(SimulationError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_overflowing_drift_fails() {
        let req = SimulationRequest::new(100.0, 1e6, 0.0, 3, 2).with_seed(1);
        let err = PathSimulator::new().simulate(&req).unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }

    #[test]
    fn test_extreme_volatility_fails_in_blocks() {
        let req = SimulationRequest::new(100.0, 0.0, 40.0, 5, 20).with_seed(1);
        let plan = SimulationPlan::new(&req).unwrap();
        assert!(PathSimulator::new().simulate_block(&plan, 0..20).is_err());
    }

    #[test]
    fn test_unaddressable_grid_rejected_before_allocation() {
        let req = SimulationRequest::new(100.0, 0.0, 0.1, 3, 1usize << 62).with_seed(1);
        assert!(matches!(
            SimulationPlan::new(&req),
            Err(SimulationError::InvalidRequest(_))
        ));
        assert!(matches!(
            PathSimulator::new().simulate(&req),
            Err(SimulationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_requests() {
        let sim = PathSimulator::new();
        for req in [
            SimulationRequest { path_count: 0, ..request() },
            SimulationRequest { horizon_steps: 0, ..request() },
            SimulationRequest { last_price: 0.0, ..request() },
            SimulationRequest { last_price: -10.0, ..request() },
        ] {
            assert!(matches!(sim.simulate(&req), Err(SimulationError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_blocks_match_full_run() {
        let sim = PathSimulator::new();
        let plan = SimulationPlan::new(&request()).unwrap();
        let full = sim.run(&plan).unwrap();

        let blocks = vec![
            sim.simulate_block(&plan, 40..64).unwrap(),
            sim.simulate_block(&plan, 0..25).unwrap(),
            sim.simulate_block(&plan, 25..40).unwrap(),
        ];
        assert_eq!(blocks[0].path(50), full.path(50));
        assert!(blocks[0].path(10).is_none());

        let assembled = plan.assemble(blocks).unwrap();
        assert_eq!(assembled, full);
    }

    #[test]
    fn test_assemble_rejects_gaps() {
        let sim = PathSimulator::new();
        let plan = SimulationPlan::new(&request()).unwrap();
        let blocks = vec![
            sim.simulate_block(&plan, 0..20).unwrap(),
            sim.simulate_block(&plan, 30..64).unwrap(),
        ];
        assert!(plan.assemble(blocks).is_err());

        let partial = vec![sim.simulate_block(&plan, 0..20).unwrap()];
        assert!(plan.assemble(partial).is_err());
    }

    #[test]
    fn test_assemble_rejects_foreign_block() {
        let sim = PathSimulator::new();
        let plan = SimulationPlan::new(&request()).unwrap();
        let other = SimulationPlan::new(&request().with_seed(99)).unwrap();
        let blocks = vec![sim.simulate_block(&other, 0..64).unwrap()];
        assert!(plan.assemble(blocks).is_err());
    }

    #[test]
    fn test_block_range_out_of_bounds() {
        let sim = PathSimulator::new();
        let plan = SimulationPlan::new(&request()).unwrap();
        assert!(sim.simulate_block(&plan, 60..70).is_err());
    }
}
