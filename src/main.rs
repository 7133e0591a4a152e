use anyhow::{anyhow, Context, Result};
use chromaregion::logger::{finalize_logs, get_log_path, init_logger};
use chromaregion::tuning::{Direction, ParamField, StepSize};
use chromaregion::{log_error, log_info, log_warn, PixelGrid, Recomputer, ToolConfig, TuningState};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "chromaregion.json";

#[derive(Debug, PartialEq)]
enum Command {
    Select(ParamField),
    Adjust(Direction, StepSize),
    Reset,
    Show,
    Save,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| anyhow!("Empty command"))?;

    let command = match verb {
        "select" => {
            let name = words.next().ok_or_else(|| anyhow!("Usage: select <field>"))?;
            Command::Select(name.parse()?)
        }
        "up" => Command::Adjust(Direction::Up, StepSize::Small),
        "down" => Command::Adjust(Direction::Down, StepSize::Small),
        "UP" => Command::Adjust(Direction::Up, StepSize::Large),
        "DOWN" => Command::Adjust(Direction::Down, StepSize::Large),
        "reset" => Command::Reset,
        "show" => Command::Show,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(anyhow!("Unknown command: {}", other)),
    };

    Ok(command)
}

struct Session {
    config: ToolConfig,
    state: TuningState,
    recomputer: Recomputer,
    generation: u64,
}

impl Session {
    fn new(config: ToolConfig) -> Result<Self> {
        let source = image::open(&config.input_image)
            .with_context(|| format!("Failed to open image {}", config.input_image.display()))?;
        let grid = PixelGrid::try_from(&source).context("Unusable input image")?;
        log_info!(
            "Loaded {} ({}x{}, alpha: {})",
            config.input_image.display(),
            grid.width(),
            grid.height(),
            grid.has_alpha()
        );

        let state = TuningState::new(config.defaults);
        let recomputer = Recomputer::new(grid, config.color_range)?;
        let generation = recomputer.submit(*state.params());

        Ok(Self {
            config,
            state,
            recomputer,
            generation,
        })
    }

    fn resubmit(&mut self) {
        self.generation = self.recomputer.submit(*self.state.params());
    }

    fn show(&self, out: &mut impl Write) -> Result<()> {
        for line in self.state.describe() {
            writeln!(out, "{}", line)?;
        }
        if let Some(rendered) = self.recomputer.latest() {
            let report = rendered.report;
            writeln!(
                out,
                "  region: {} px ({} seeds + {} grown)",
                report.region_size, report.seed_count, report.added_count
            )?;
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let rendered = self.recomputer.wait_for(self.generation)?;
        if rendered.report.seed_count == 0 {
            log_warn!("No pixels in color range; writing the input unchanged");
        }
        rendered
            .image
            .to_dynamic_image()
            .save(&self.config.output_image)
            .with_context(|| format!("Failed to write {}", self.config.output_image.display()))?;
        log_info!(
            "Saved {} (region {} px)",
            self.config.output_image.display(),
            rendered.report.region_size
        );
        Ok(())
    }

    /// Returns false when the session should end
    fn handle(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        match command {
            Command::Select(field) => {
                self.state.select(field);
                writeln!(out, "active: {}", field)?;
            }
            Command::Adjust(direction, size) => {
                if self.state.adjust(direction, size) {
                    self.resubmit();
                }
                self.show(out)?;
            }
            Command::Reset => {
                if self.state.reset() {
                    self.resubmit();
                }
                self.show(out)?;
            }
            Command::Show => self.show(out)?,
            Command::Save => {
                self.save()?;
                writeln!(out, "saved {}", self.config.output_image.display())?;
            }
            Command::Help => print_help(out)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn print_help(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  select <h_tol|s_tol|v_tol|shift|s_scale|v_scale>")?;
    writeln!(out, "  up / down      small step on the active field")?;
    writeln!(out, "  UP / DOWN      large step")?;
    writeln!(out, "  reset          restore default parameters")?;
    writeln!(out, "  show           print parameters and region size")?;
    writeln!(out, "  save           write the current result")?;
    writeln!(out, "  quit")?;
    Ok(())
}

fn run() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = ToolConfig::load(&config_path)?;

    init_logger(
        config.log_dir.clone(),
        "chromaregion",
        config.log_retention_count,
        config.stream_logs,
    )?;
    log_info!("Using config {}", config_path.display());
    if let Some(path) = get_log_path() {
        tracing::info!(log = %path.display(), "session log");
    }

    let mut session = Session::new(config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_help(&mut out)?;
    session.show(&mut out)?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match parse_command(&line) {
            Ok(command) => session.handle(command, &mut out).unwrap_or_else(|e| {
                log_error!("{:#}", e);
                let _ = writeln!(out, "error: {:#}", e);
                true
            }),
            Err(e) => {
                writeln!(out, "{}", e)?;
                true
            }
        };
        out.flush()?;

        if !keep_going {
            break;
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = run();
    if let Err(e) = &result {
        log_error!("{:#}", e);
        tracing::error!("{:#}", e);
    }
    let _ = finalize_logs();

    if result.is_err() {
        std::process::exit(1);
    }
}
