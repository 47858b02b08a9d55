//! Turn a validated [`Diagram`] into a ready-to-run [`DynamicSystem`].

use std::collections::HashMap;

use bms_blocks::{Block, ODE, Saturation};
use bms_core::VariableId;
use bms_sim::{DynamicSystem, SimError, SimOptions, SystemBuilder, TimeGrid};
use tracing::debug;

use crate::schema::{BlockDef, Diagram};
use crate::validate::validate_diagram;
use crate::{ProjectError, ProjectResult};

/// Build the system described by `diagram`.
///
/// Signals are placed first in the evaluation list, followed by the blocks
/// in file order. Variables get ids in the same order, so
/// `system.variables()` lists signals before block outputs.
pub fn compile_system(diagram: &Diagram) -> ProjectResult<DynamicSystem> {
    validate_diagram(diagram)?;

    let mut builder = SystemBuilder::new();
    let mut ids: HashMap<&str, VariableId> = HashMap::new();

    for signal in &diagram.signals {
        let id = builder.signal(signal.name.as_str(), signal.kind)?;
        ids.insert(signal.name.as_str(), id);
    }

    for def in &diagram.blocks {
        let input = *ids
            .get(def.input())
            .ok_or_else(|| ProjectError::UnknownVariable {
                name: def.input().to_string(),
            })?;
        let output = builder.variable(def.output())?;
        ids.insert(def.output(), output);
        builder.block(compile_block(def, input, output)?);
    }

    builder.options(SimOptions {
        integrator: diagram.integrator,
        reject_non_finite: diagram.reject_non_finite,
    });

    let grid = TimeGrid::new(diagram.total_time, diagram.steps)?;
    let system = builder.build(grid)?;
    debug!(
        diagram = %diagram.name,
        signals = diagram.signals.len(),
        blocks = diagram.blocks.len(),
        "diagram compiled"
    );
    Ok(system)
}

fn compile_block(def: &BlockDef, input: VariableId, output: VariableId) -> ProjectResult<Block> {
    let block: Block = match def {
        BlockDef::ODE {
            numerator,
            denominator,
            ..
        } => ODE::new(input, output, numerator, denominator)
            .map_err(SimError::from)?
            .into(),
        BlockDef::Saturation { low, high, .. } => Saturation::new(input, output, *low, *high)
            .map_err(SimError::from)?
            .into(),
    };
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SignalDef;
    use bms_blocks::{Signal, Sinus};
    use bms_core::IntegratorType;

    fn gain_diagram(gain: f64) -> Diagram {
        Diagram {
            version: 1,
            name: "gain".to_string(),
            total_time: 1.0,
            steps: 100,
            integrator: IntegratorType::RK4,
            reject_non_finite: false,
            signals: vec![SignalDef {
                name: "u".to_string(),
                kind: Signal::Sinus(Sinus::new(1.0, 3.0, 0.0, 0.0).unwrap()),
            }],
            blocks: vec![BlockDef::ODE {
                input: "u".to_string(),
                output: "y".to_string(),
                numerator: vec![gain],
                denominator: vec![1.0],
            }],
        }
    }

    #[test]
    fn compiles_and_runs_gain() {
        let mut system = compile_system(&gain_diagram(3.0)).unwrap();
        system.simulate().unwrap();
        let u = system.variable_by_name("u").unwrap().values();
        let y = system.variable_by_name("y").unwrap().values();
        assert_eq!(u.len(), 101);
        for (a, b) in u.iter().zip(y) {
            assert_eq!(*b, 3.0 * a);
        }
    }

    #[test]
    fn variables_follow_diagram_order() {
        let system = compile_system(&gain_diagram(1.0)).unwrap();
        let names: Vec<&str> = system.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, ["u", "y"]);
    }

    #[test]
    fn bad_block_parameters_surface_as_sim_errors() {
        let mut diagram = gain_diagram(1.0);
        diagram.blocks[0] = BlockDef::ODE {
            input: "u".to_string(),
            output: "y".to_string(),
            numerator: vec![1.0, 0.0, 0.0],
            denominator: vec![1.0, 1.0],
        };
        let err = compile_system(&diagram).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Sim(SimError::Configuration { .. })
        ));
    }

    #[test]
    fn integrator_choice_is_carried() {
        let mut diagram = gain_diagram(1.0);
        diagram.integrator = IntegratorType::ForwardEuler;
        let system = compile_system(&diagram).unwrap();
        assert_eq!(system.options().integrator, IntegratorType::ForwardEuler);
    }
}
