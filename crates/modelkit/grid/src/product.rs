//! Cartesian product of meta-parameter grids.

use crate::error::{GridError, GridResult};
use crate::grid::grid_for;
use crate::strategy::StrategyRegistry;
use modelkit_types::ParameterSet;
use serde_json::{Map, Value};

/// One complete assignment of meta-parameter values.
pub type Configuration = Map<String, Value>;

/// A meta parameter together with its grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub grid: Vec<Value>,
}

/// A meta parameter left out of the sweep; it keeps its default.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedParameter {
    pub name: String,
    pub reason: GridError,
}

/// Every configuration of a meta-parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    axes: Vec<Axis>,
    excluded: Vec<ExcludedParameter>,
    total: usize,
}

impl Sweep {
    pub fn new(axes: Vec<Axis>, excluded: Vec<ExcludedParameter>) -> GridResult<Self> {
        let mut total = 1usize;
        for axis in &axes {
            total = total
                .checked_mul(axis.grid.len())
                .ok_or_else(|| GridError::SweepOverflow {
                    param: axis.name.clone(),
                })?;
        }
        Ok(Self {
            axes,
            excluded,
            total,
        })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn excluded(&self) -> &[ExcludedParameter] {
        &self.excluded
    }

    /// Number of configurations; an empty sweep still has the single
    /// all-defaults configuration.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Configurations in mixed-radix order, last axis varying fastest.
    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            axes: &self.axes,
            next: 0,
            total: self.total,
        }
    }

    /// The configuration at `index`, if in range.
    pub fn configuration(&self, index: usize) -> Option<Configuration> {
        (index < self.total).then(|| configuration_at(&self.axes, index))
    }
}

fn configuration_at(axes: &[Axis], index: usize) -> Configuration {
    let mut digits = vec![0usize; axes.len()];
    let mut rest = index;
    for (slot, axis) in digits.iter_mut().zip(axes).rev() {
        *slot = rest % axis.grid.len();
        rest /= axis.grid.len();
    }
    axes.iter()
        .zip(digits)
        .map(|(axis, digit)| (axis.name.clone(), axis.grid[digit].clone()))
        .collect()
}

impl<'a> IntoIterator for &'a Sweep {
    type Item = (usize, Configuration);
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(index, configuration)` pairs of a [`Sweep`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    axes: &'a [Axis],
    next: usize,
    total: usize,
}

impl Iterator for Combinations<'_> {
    type Item = (usize, Configuration);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((index, configuration_at(self.axes, index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

/// Grid every meta parameter and combine the grids.
///
/// Parameters whose validator count is not exactly one are excluded and
/// keep their defaults. Any other grid failure is a configuration error.
pub fn enumerate_configurations(
    parameters: &ParameterSet,
    registry: &StrategyRegistry,
) -> GridResult<Sweep> {
    let mut axes = Vec::new();
    let mut excluded = Vec::new();

    for name in parameters.names() {
        match grid_for(parameters, name, registry) {
            Ok(grid) => axes.push(Axis {
                name: name.to_string(),
                grid,
            }),
            Err(reason) if reason.is_validator_count() => {
                tracing::warn!(param = name, error = %reason, "excluding parameter from sweep");
                excluded.push(ExcludedParameter {
                    name: name.to_string(),
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let sweep = Sweep::new(axes, excluded)?;
    tracing::debug!(
        axes = sweep.axes().len(),
        excluded = sweep.excluded().len(),
        total = sweep.total(),
        "enumerated meta-parameter sweep"
    );
    Ok(sweep)
}
