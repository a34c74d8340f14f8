//! Simulation Ensemble
//!
//! A `path_count x (horizon_steps + 1)` grid of simulated prices, stored
//! row-major. Column 0 holds the common starting price. Immutable once built.

use serde::Serialize;

use super::error::SimulationError;

/// Ensemble of simulated price paths
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationEnsemble {
    /// Row-major grid, one row per path
    grid: Vec<f64>,
    path_count: usize,
    horizon_steps: usize,
    last_price: f64,
    /// Base seed the paths were drawn from (None for externally built ensembles)
    seed: Option<u64>,
}

/// Two-point horizontal line at the starting price, for chart overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub start: (usize, f64),
    pub end: (usize, f64),
}

impl SimulationEnsemble {
    /// Wrap a grid produced by the simulator
    pub(crate) fn from_grid(
        grid: Vec<f64>,
        path_count: usize,
        horizon_steps: usize,
        last_price: f64,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let expected = horizon_steps
            .checked_add(1)
            .and_then(|columns| path_count.checked_mul(columns));
        if expected != Some(grid.len()) {
            return Err(SimulationError::invalid_request(format!(
                "grid holds {} prices, expected {} paths x {} columns",
                grid.len(),
                path_count,
                horizon_steps.saturating_add(1)
            )));
        }
        Ok(Self {
            grid,
            path_count,
            horizon_steps,
            last_price,
            seed: Some(seed),
        })
    }

    /// Build an ensemble from paths produced elsewhere
    ///
    /// Every path must have the same non-zero length and start at `last_price`.
    /// Zero paths is accepted; summarizing such an ensemble fails.
    pub fn from_paths(last_price: f64, paths: Vec<Vec<f64>>) -> Result<Self, SimulationError> {
        let columns = paths.first().map(|p| p.len()).unwrap_or(1);
        if columns == 0 {
            return Err(SimulationError::invalid_request("paths must contain at least one price"));
        }

        let mut grid = Vec::with_capacity(paths.len() * columns);
        for (i, path) in paths.iter().enumerate() {
            if path.len() != columns {
                return Err(SimulationError::invalid_request(format!(
                    "path {} has {} prices, expected {}",
                    i,
                    path.len(),
                    columns
                )));
            }
            if path[0] != last_price {
                return Err(SimulationError::invalid_request(format!(
                    "path {} starts at {}, expected {}",
                    i, path[0], last_price
                )));
            }
            grid.extend_from_slice(path);
        }

        Ok(Self {
            grid,
            path_count: paths.len(),
            horizon_steps: columns - 1,
            last_price,
            seed: None,
        })
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn horizon_steps(&self) -> usize {
        self.horizon_steps
    }

    /// Number of columns (horizon steps plus the starting column)
    pub fn columns(&self) -> usize {
        self.horizon_steps + 1
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_empty(&self) -> bool {
        self.path_count == 0
    }

    /// Prices of a single path, column 0 first
    pub fn path(&self, index: usize) -> Option<&[f64]> {
        if index >= self.path_count {
            return None;
        }
        let cols = self.columns();
        Some(&self.grid[index * cols..(index + 1) * cols])
    }

    /// Iterate over every path in row order
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.grid.chunks_exact(self.columns())
    }

    /// Final column: one terminal price per path
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.paths().map(|p| p[self.horizon_steps]).collect()
    }

    /// Copy the grid out as one `Vec` per path
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.paths().map(|p| p.to_vec()).collect()
    }

    /// Horizontal line at the starting price across the whole horizon
    pub fn reference_line(&self) -> ReferenceLine {
        ReferenceLine {
            start: (0, self.last_price),
            end: (self.horizon_steps, self.last_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationEnsemble {
        SimulationEnsemble::from_paths(
            10.0,
            vec![vec![10.0, 11.0, 12.0], vec![10.0, 9.0, 8.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_accessors() {
        let ens = sample();
        assert_eq!(ens.path_count(), 2);
        assert_eq!(ens.horizon_steps(), 2);
        assert_eq!(ens.columns(), 3);
        assert_eq!(ens.path(1), Some(&[10.0, 9.0, 8.0][..]));
        assert!(ens.path(2).is_none());
        assert!(ens.seed().is_none());
    }

    #[test]
    fn test_terminal_prices() {
        assert_eq!(sample().terminal_prices(), vec![12.0, 8.0]);
    }

    #[test]
    fn test_reference_line() {
        let line = sample().reference_line();
        assert_eq!(line.start, (0, 10.0));
        assert_eq!(line.end, (2, 10.0));
    }

    #[test]
    fn test_from_paths_rejects_ragged_rows() {
        let result = SimulationEnsemble::from_paths(10.0, vec![vec![10.0, 11.0], vec![10.0]]);
        assert!(matches!(result, Err(SimulationError::InvalidRequest(_))));
    }

    #[test]
    fn test_from_paths_rejects_wrong_start() {
        let result = SimulationEnsemble::from_paths(10.0, vec![vec![9.0, 11.0]]);
        assert!(matches!(result, Err(SimulationError::InvalidRequest(_))));
    }

    #[test]
    fn test_from_grid_checks_shape() {
        let ens = SimulationEnsemble::from_grid(vec![1.0; 6], 2, 2, 1.0, 5).unwrap();
        assert_eq!(ens.seed(), Some(5));
        assert_eq!(ens.terminal_prices(), vec![1.0, 1.0]);

        assert!(SimulationEnsemble::from_grid(vec![1.0; 5], 2, 2, 1.0, 5).is_err());
        assert!(SimulationEnsemble::from_grid(Vec::new(), 1usize << 62, 3, 1.0, 5).is_err());
        assert!(SimulationEnsemble::from_grid(Vec::new(), 1, usize::MAX, 1.0, 5).is_err());
    }

    #[test]
    fn test_from_paths_allows_empty() {
        let ens = SimulationEnsemble::from_paths(10.0, Vec::new()).unwrap();
        assert!(ens.is_empty());
        assert!(ens.terminal_prices().is_empty());
        assert_eq!(ens.paths().count(), 0);
    }
}
