//! System assembly and the simulation loop.

use std::collections::HashSet;

use bms_blocks::{Block, Signal, SignalSource, StepContext};
use bms_core::{IntegratorType, VariableId};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::time::TimeGrid;
use crate::variable::Variable;

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimOptions {
    /// Integrator used by dynamic blocks (default: RK4).
    pub integrator: IntegratorType,
    /// Abort with `InvalidState` on the first NaN/infinite sample instead of
    /// recording it.
    pub reject_non_finite: bool,
}

/// Lifecycle of a [`DynamicSystem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Built, not yet simulated (or reset).
    Configured,
    /// `simulate` ran to the end of the grid.
    Completed,
}

/// Incremental construction of a [`DynamicSystem`].
///
/// # Example
///
/// ```
/// use bms_blocks::{ODE, Saturation, Sinus};
/// use bms_sim::{SystemBuilder, TimeGrid};
///
/// let mut builder = SystemBuilder::new();
/// let sine = builder
///     .signal("sine", Sinus::new(1.0, std::f64::consts::TAU, 0.0, 0.0).unwrap())
///     .unwrap();
/// let amplified = builder.variable("amplified").unwrap();
/// let clipped = builder.variable("clipped").unwrap();
/// builder
///     .block(ODE::new(sine, amplified, &[10.0], &[1.0]).unwrap())
///     .block(Saturation::new(amplified, clipped, -2.0, 2.0).unwrap());
///
/// let mut system = builder.build(TimeGrid::new(1.0, 100).unwrap()).unwrap();
/// system.simulate().unwrap();
/// assert_eq!(system.t().len(), 101);
/// assert!(system.values(clipped).unwrap().iter().all(|y| y.abs() <= 2.0));
/// ```
#[derive(Debug, Default)]
pub struct SystemBuilder {
    variables: Vec<Variable>,
    blocks: Vec<Block>,
    options: SimOptions,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error once the arena outgrows the id range.
    pub fn variable(&mut self, name: impl Into<String>) -> SimResult<VariableId> {
        let id = VariableId::try_from_index(self.variables.len())?;
        self.variables.push(Variable::new(name));
        Ok(id)
    }

    /// Register a variable driven by `signal`, appending its source block at
    /// the current position of the block list.
    pub fn signal(
        &mut self,
        name: impl Into<String>,
        signal: impl Into<Signal>,
    ) -> SimResult<VariableId> {
        let id = self.variable(name)?;
        let source = SignalSource::new(id, signal)?;
        self.blocks.push(Block::Source(source));
        Ok(id)
    }

    /// Append a block to the evaluation list.
    pub fn block(&mut self, block: impl Into<Block>) -> &mut Self {
        self.blocks.push(block.into());
        self
    }

    pub fn options(&mut self, options: SimOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn build(self, grid: TimeGrid) -> SimResult<DynamicSystem> {
        DynamicSystem::with_options(grid, self.variables, self.blocks, self.options)
    }
}

/// Driver owning the time grid, the variables and the ordered block list.
#[derive(Debug, Clone)]
pub struct DynamicSystem {
    grid: TimeGrid,
    variables: Vec<Variable>,
    blocks: Vec<Block>,
    options: SimOptions,
    t: Vec<f64>,
    state: RunState,
}

impl DynamicSystem {
    /// Assemble a system from parts with default options.
    ///
    /// `variables[i]` is addressed by `VariableId::from_index(i)`.
    pub fn new(grid: TimeGrid, variables: Vec<Variable>, blocks: Vec<Block>) -> SimResult<Self> {
        Self::with_options(grid, variables, blocks, SimOptions::default())
    }

    /// Assemble a system, validating its wiring.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a variable already holds samples,
    /// two variables share a name, a block references an unknown variable,
    /// two blocks write the same variable, or a block reads a variable not
    /// produced by an earlier block.
    pub fn with_options(
        grid: TimeGrid,
        variables: Vec<Variable>,
        blocks: Vec<Block>,
        options: SimOptions,
    ) -> SimResult<Self> {
        validate_wiring(&variables, &blocks)?;
        debug!(
            variables = variables.len(),
            blocks = blocks.len(),
            dynamic = blocks.iter().filter(|b| b.is_dynamic()).count(),
            steps = grid.steps(),
            "system built"
        );
        Ok(Self {
            grid,
            variables,
            blocks,
            options,
            t: Vec::new(),
            state: RunState::Configured,
        })
    }

    /// Run the whole horizon.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidState` if the system already completed (call
    /// [`DynamicSystem::reset`] first) or, with `reject_non_finite`, when a
    /// block produces a non-finite sample. A failed run leaves no samples
    /// behind.
    pub fn simulate(&mut self) -> SimResult<()> {
        if self.state == RunState::Completed {
            return Err(SimError::invalid_state(
                "simulate called on a completed system; reset it first",
            ));
        }

        let span = tracing::debug_span!(
            "simulate",
            steps = self.grid.steps(),
            integrator = self.options.integrator.name()
        );
        let _enter = span.enter();

        if let Err(e) = self.run_steps() {
            self.clear_trajectories();
            return Err(e);
        }

        self.state = RunState::Completed;
        info!(
            samples = self.t.len(),
            blocks = self.blocks.len(),
            "simulation completed"
        );
        Ok(())
    }

    fn run_steps(&mut self) -> SimResult<()> {
        let grid = self.grid;
        let n = grid.len();
        let dt = grid.step_size();
        self.t.reserve(n);
        for block in &self.blocks {
            self.variables[block.output().slot()].reserve(n);
        }

        let mut flagged: HashSet<VariableId> = HashSet::new();
        for t in grid.times() {
            let ctx = StepContext::new(t, dt, self.options.integrator);
            for block in self.blocks.iter_mut() {
                let input = block
                    .input()
                    .and_then(|id| self.variables[id.slot()].last());
                let y = block.produce(&ctx, input)?;

                let out = block.output();
                let var = &mut self.variables[out.slot()];
                if self.options.reject_non_finite {
                    var.try_push(y)?;
                } else {
                    if !y.is_finite() && flagged.insert(out) {
                        warn!(
                            variable = var.name(),
                            t = ctx.t,
                            value = y,
                            "non-finite sample recorded"
                        );
                    }
                    var.push(y);
                }
            }
            self.t.push(ctx.t);
        }
        Ok(())
    }

    /// Drop all samples and block state, returning to `Configured`.
    pub fn reset(&mut self) {
        self.clear_trajectories();
        self.state = RunState::Configured;
        debug!("system reset");
    }

    fn clear_trajectories(&mut self) {
        self.t.clear();
        for var in &mut self.variables {
            var.clear();
        }
        for block in &mut self.blocks {
            block.reset();
        }
    }

    /// Time trajectory, index-aligned with every written variable.
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.slot())
    }

    pub fn values(&self, id: VariableId) -> Option<&[f64]> {
        self.variable(id).map(Variable::values)
    }

    pub fn variable_id(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter()
            .position(|v| v.name() == name)
            .and_then(|i| VariableId::try_from_index(i).ok())
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }
}

fn validate_wiring(variables: &[Variable], blocks: &[Block]) -> SimResult<()> {
    if let Some(last) = variables.len().checked_sub(1) {
        VariableId::try_from_index(last)?;
    }

    let mut names = HashSet::new();
    for var in variables {
        if !var.is_empty() {
            return Err(SimError::config(format!(
                "variable '{}' already holds {} samples; systems start from empty trajectories",
                var.name(),
                var.len()
            )));
        }
        if !names.insert(var.name()) {
            return Err(SimError::config(format!(
                "duplicate variable name '{}'",
                var.name()
            )));
        }
    }

    // writer[i] = position of the block producing variable i
    let mut writer: Vec<Option<usize>> = vec![None; variables.len()];
    for (pos, block) in blocks.iter().enumerate() {
        if let Some(input) = block.input() {
            let var = lookup(variables, pos, block, input)?;
            if writer[input.slot()].is_none() {
                return Err(SimError::config(format!(
                    "block {pos} ({}) reads '{}' before any earlier block produces it",
                    block.kind_name(),
                    var.name()
                )));
            }
        }

        let output = block.output();
        let var = lookup(variables, pos, block, output)?;
        if let Some(first) = writer[output.slot()] {
            return Err(SimError::config(format!(
                "variable '{}' is written by blocks {first} and {pos}",
                var.name()
            )));
        }
        writer[output.slot()] = Some(pos);
    }

    for (var, w) in variables.iter().zip(&writer) {
        if w.is_none() {
            warn!(variable = var.name(), "variable is never written");
        }
    }
    Ok(())
}

fn lookup<'a>(
    variables: &'a [Variable],
    pos: usize,
    block: &Block,
    id: VariableId,
) -> SimResult<&'a Variable> {
    variables.get(id.slot()).ok_or_else(|| {
        SimError::config(format!(
            "block {pos} ({}) references unknown variable {id}",
            block.kind_name()
        ))
    })
}
