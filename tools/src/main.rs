//! life-runner: headless Game of Life runner.
//!
//! Usage:
//!   life-runner --width 40 --height 20 --generations 100 --pattern glider
//!   life-runner --config life.json --seed 7 --density 0.25
//!   life-runner --ipc-mode

use anyhow::Result;
use life_core::{
    command::ControlCommand,
    config::LifeConfig,
    controller::{LifeController, RunSummary, StopHandle},
    event::LifeEvent,
    offload::{ErrorReport, PerformanceReport},
    types::{Generation, SimulationId},
};
use std::env;
use std::io::{self, BufRead, Write};

/// Grids wider than this are summarised instead of drawn.
const MAX_DRAW_WIDTH: u32 = 120;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Step {
        #[serde(default = "one")]
        count: u64,
    },
    Command {
        payload: ControlCommand,
    },
    Quit,
}

fn one() -> u64 {
    1
}

#[derive(serde::Serialize)]
struct UiState {
    simulation_id:      SimulationId,
    generation:         Generation,
    running:            bool,
    speed_ms:           u64,
    width:              u32,
    height:             u32,
    living_cells:       Vec<String>,
    executor_available: bool,
    last_performance:   Option<PerformanceReport>,
    last_error:         Option<String>,
    executor_error:     Option<ErrorReport>,
    events:             Vec<LifeEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = string_arg(&args, "--config");
    let pattern = string_arg(&args, "--pattern");

    let base = match config_path {
        Some(path) => LifeConfig::load(path)?,
        None => LifeConfig::default(),
    };
    let config = LifeConfig {
        width:    parse_arg(&args, "--width", base.width),
        height:   parse_arg(&args, "--height", base.height),
        speed_ms: parse_arg(&args, "--speed", base.speed_ms),
        density:  parse_arg(&args, "--density", base.density),
        seed:     parse_arg(&args, "--seed", base.seed),
    }
    .validated();
    let generations = parse_arg(&args, "--generations", 50u64);

    if !ipc_mode {
        println!("Game of Life: life-runner");
        println!("  grid:        {}x{}", config.width, config.height);
        println!("  generations: {generations}");
        println!("  speed:       {}ms", config.speed_ms);
        println!("  seed:        {}", config.seed);
        match pattern {
            Some(name) => println!("  pattern:     {name}"),
            None => println!("  density:     {}", config.density),
        }
        println!();
    }

    let mut controller = LifeController::new(&config)?;
    match pattern {
        Some(name) => controller.apply(ControlCommand::LoadPattern { name: name.to_string() })?,
        None => controller.apply(ControlCommand::Randomize { density: None })?,
    }

    if ipc_mode {
        run_ipc_loop(&mut controller)?;
    } else {
        let summary = controller.run(Some(generations), &StopHandle::new())?;
        print_summary(&controller, &summary);
    }

    controller.shutdown();
    Ok(())
}

fn run_ipc_loop(controller: &mut LifeController) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Step { count } => {
                for _ in 0..count {
                    // The failure is kept as last_error and reported in the state.
                    if controller.step().is_err() {
                        break;
                    }
                }
            }
            IpcCommand::Command { payload } => {
                if let Err(e) = controller.apply(payload) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            }
        }
        let state = build_ui_state(controller);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn build_ui_state(controller: &mut LifeController) -> UiState {
    let wire = controller.grid().to_wire();
    UiState {
        simulation_id:      controller.simulation().id().to_string(),
        generation:         controller.generation(),
        running:            controller.is_running(),
        speed_ms:           controller.speed_ms(),
        width:              controller.grid().width(),
        height:             controller.grid().height(),
        living_cells:       wire.living_cells,
        executor_available: controller.client().is_available(),
        last_performance:   controller.client().last_performance(),
        last_error:         controller.last_error().map(str::to_string),
        executor_error:     controller.client().last_error(),
        events:             controller.drain_events(),
    }
}

fn print_summary(controller: &LifeController, summary: &RunSummary) {
    println!("=== RUN SUMMARY ===");
    println!("  simulation:   {}", summary.simulation_id);
    println!("  generations:  {} -> {}", summary.start_generation, summary.end_generation);
    println!("  living cells: {}", summary.living_cells);
    println!("  stopped:      {:?}", summary.reason);
    if let Some(perf) = controller.client().last_performance() {
        println!("  last step:    {:.3}ms over {} cells", perf.total_time, perf.cells_processed);
    }

    println!();
    let grid = controller.grid();
    if grid.width() > MAX_DRAW_WIDTH {
        println!("  (grid too wide to draw: {}x{})", grid.width(), grid.height());
        return;
    }
    for row in grid.rows() {
        let line: String = row.iter().map(|c| if c.is_alive() { '#' } else { '.' }).collect();
        println!("  {line}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
