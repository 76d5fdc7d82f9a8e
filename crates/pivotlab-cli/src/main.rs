mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pivotlab_solver::{duality, Algorithm, SolverConfig};

#[derive(Parser)]
#[command(name = "pivotlab")]
#[command(about = "Teaching-grade LP/MIP solving with step traces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model file and print the solution
    Solve {
        /// The model file
        file: PathBuf,
        /// Algorithm: primal, dual, revised, bnb or cut
        #[arg(short, long, default_value = "primal")]
        algorithm: String,
        /// Show ranging analysis for the objective row and right-hand sides
        #[arg(long)]
        analysis: bool,
        /// Print the full step trace
        #[arg(short, long)]
        trace: bool,
        /// Write driver result files into this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Parse a model file and print the model
    Parse {
        /// The model file
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check a model file for errors
    Check {
        /// The model file
        file: PathBuf,
    },
    /// Build the dual model and verify strong duality
    Dual {
        /// The model file
        file: PathBuf,
    },
}

fn read_model(file: &PathBuf) -> pivotlab_solver::Model {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {e}");
            std::process::exit(1);
        }
    };
    match pivotlab_lang::parse_model(&source) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            algorithm,
            analysis,
            trace,
            report_dir,
        } => {
            let model = read_model(&file);
            let algorithm: Algorithm = match algorithm.parse() {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            };
            let mut config = SolverConfig::default();
            if let Some(dir) = report_dir {
                config.result_dir = Some(dir);
            }

            match algorithm.solve(&model, &config) {
                Ok(report) => {
                    render::print_solution(&model, &report);
                    if analysis {
                        render::print_analysis(&model, &config);
                    }
                    if trace {
                        println!();
                        println!("Steps:");
                        for entry in report.trace.entries() {
                            println!("  {entry}");
                        }
                    }
                    if !report.solution.status.is_optimal() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Parse { file, format } => {
            let model = read_model(&file);
            if format == "json" {
                match serde_json::to_string_pretty(&model) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                render::print_model(&model);
            }
        }
        Commands::Check { file } => {
            let model = read_model(&file);
            println!("\u{2713} {} is valid", file.display());
            println!("  sense        {}", model.sense.as_str());
            println!("  variables    {}", model.num_variables());
            println!("  constraints  {}", model.num_constraints());
            println!(
                "  integer      {}",
                model.signs.iter().filter(|s| s.is_integer()).count()
            );
        }
        Commands::Dual { file } => {
            let model = read_model(&file);
            match duality::verify(&model, &SolverConfig::default()) {
                Ok((report, _trace)) => {
                    render::print_model(&report.dual);
                    println!();
                    println!(
                        "Primal optimum: {:.4}  ({})",
                        report.primal_solution.z,
                        report.primal_solution.status.as_str()
                    );
                    println!(
                        "Dual optimum:   {:.4}  ({})",
                        report.dual_solution.z,
                        report.dual_solution.status.as_str()
                    );
                    if report.strong {
                        println!("Strong duality holds.");
                    } else {
                        println!("Weak duality only.");
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
