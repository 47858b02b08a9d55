use bms_blocks::Block;
use bms_core::IntegratorType;
use bms_project::{ProjectError, ProjectResult, compile_system};
use bms_sim::DynamicSystem;
use clap::{Parser, Subcommand, ValueEnum};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "bms-cli")]
#[command(about = "Block-diagram dynamic system simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate diagram file syntax and structure
    Validate {
        /// Path to the diagram YAML or JSON file
        diagram_path: PathBuf,
    },
    /// Simulate a diagram and write every variable as CSV
    Run {
        /// Path to the diagram YAML or JSON file
        diagram_path: PathBuf,
        /// Override the integrator declared in the diagram
        #[arg(long, value_enum)]
        integrator: Option<IntegratorArg>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Simulate a diagram and export a single variable
    Export {
        /// Path to the diagram YAML or JSON file
        diagram_path: PathBuf,
        /// Variable name (e.g., Saturated)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IntegratorArg {
    Rk4,
    Euler,
}

impl From<IntegratorArg> for IntegratorType {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Rk4 => IntegratorType::RK4,
            IntegratorArg::Euler => IntegratorType::ForwardEuler,
        }
    }
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { diagram_path } => cmd_validate(&diagram_path),
        Commands::Run {
            diagram_path,
            integrator,
            output,
        } => cmd_run(&diagram_path, integrator, output.as_deref()),
        Commands::Export {
            diagram_path,
            variable,
            output,
        } => cmd_export(&diagram_path, &variable, output.as_deref()),
    }
}

fn cmd_validate(diagram_path: &Path) -> ProjectResult<()> {
    println!("Validating diagram: {}", diagram_path.display());
    let diagram = bms_project::load(diagram_path)?;
    // Block parameters are only checked when the blocks are built.
    let system = compile_system(&diagram)?;
    println!(
        "✓ Diagram is valid ({} signals, {} blocks)",
        diagram.signals.len(),
        diagram.blocks.len()
    );
    for line in block_summary(&system) {
        println!("  {}", line);
    }
    Ok(())
}

/// One line per non-source block: wiring, plus order and DC gain for ODEs.
fn block_summary(system: &DynamicSystem) -> Vec<String> {
    let name = |id| system.variable(id).map_or("?", |v| v.name());
    system
        .blocks()
        .iter()
        .filter_map(|block| {
            let input = name(block.input()?);
            let output = name(block.output());
            let detail = match block {
                Block::ODE(ode) => {
                    let ss = ode.state_space();
                    match ss.dc_gain() {
                        Some(k) => format!("order {}, DC gain {}", ss.order(), k),
                        None => format!("order {}, integrating", ss.order()),
                    }
                }
                Block::Saturation(sat) => format!("[{}, {}]", sat.low(), sat.high()),
                Block::Source(_) => return None,
            };
            Some(format!(
                "{} {} -> {} ({})",
                block.kind_name(),
                input,
                output,
                detail
            ))
        })
        .collect()
}

fn simulate(diagram_path: &Path, integrator: Option<IntegratorArg>) -> ProjectResult<DynamicSystem> {
    let mut diagram = bms_project::load(diagram_path)?;
    if let Some(arg) = integrator {
        diagram.integrator = arg.into();
    }
    let mut system = compile_system(&diagram)?;
    system.simulate()?;
    info!(
        diagram = %diagram.name,
        integrator = system.options().integrator.name(),
        samples = system.t().len(),
        "simulation finished"
    );
    Ok(system)
}

fn cmd_run(
    diagram_path: &Path,
    integrator: Option<IntegratorArg>,
    output: Option<&Path>,
) -> ProjectResult<()> {
    let system = simulate(diagram_path, integrator)?;
    let csv = trajectories_csv(&system);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Wrote {} variables x {} samples to {}",
            system.variables().len(),
            system.t().len(),
            path.display()
        );
        for var in system.variables() {
            let (lo, hi) = range(var.values());
            println!("  {:<16} min={:>12.6} max={:>12.6}", var.name(), lo, hi);
        }
    } else {
        print!("{}", csv);
    }
    Ok(())
}

fn cmd_export(diagram_path: &Path, variable: &str, output: Option<&Path>) -> ProjectResult<()> {
    let system = simulate(diagram_path, None)?;
    let values = system
        .variable_by_name(variable)
        .ok_or_else(|| ProjectError::UnknownVariable {
            name: variable.to_string(),
        })?
        .values();

    let mut csv = String::from("time_s,value\n");
    for (t, val) in system.t().iter().zip(values) {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            values.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}

/// `time_s` followed by one column per variable, in declaration order.
fn trajectories_csv(system: &DynamicSystem) -> String {
    let variables = system.variables();
    let mut csv = String::from("time_s");
    for var in variables {
        csv.push(',');
        csv.push_str(&csv_field(var.name()));
    }
    csv.push('\n');

    for (i, t) in system.t().iter().enumerate() {
        csv.push_str(&t.to_string());
        for var in variables {
            csv.push(',');
            if let Some(v) = var.values().get(i) {
                csv.push_str(&v.to_string());
            }
        }
        csv.push('\n');
    }
    csv
}

/// Quote a header field when it would break the column layout.
fn csv_field(name: &str) -> Cow<'_, str> {
    if name.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(name)
    }
}

fn range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}
