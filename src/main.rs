use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use minesweeper_solver::{Board, Puzzle, SolveState, SolverChain, SolverConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(version, about = "Automated minesweeper solver", long_about = None)]
struct Cli {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the solver over board files, or over freshly generated boards
    Simulate {
        /// Board files to play; when empty, `--games` random boards are used
        #[arg(value_name = "FILE")]
        boards: Vec<PathBuf>,

        /// Number of random boards to play when no files are given
        #[arg(short = 'n', long, default_value_t = 10)]
        games: usize,

        #[command(flatten)]
        dims: Dimensions,

        #[command(flatten)]
        solver: SolverArgs,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Write random board files
    Generate {
        #[command(flatten)]
        dims: Dimensions,

        /// Number of boards to write
        #[arg(long, default_value_t = 1)]
        maps: usize,

        /// Output directory, created if missing
        #[arg(short = 'o', long = "out", value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct Dimensions {
    #[arg(long, default_value_t = 8)]
    rows: usize,

    /// Defaults to `--rows`
    #[arg(long)]
    cols: Option<usize>,

    #[arg(long, default_value_t = 10)]
    mines: usize,
}

impl Dimensions {
    fn cols(&self) -> usize {
        self.cols.unwrap_or(self.rows)
    }
}

#[derive(Args, Debug)]
struct SolverArgs {
    /// Largest frontier enumerated exactly
    #[arg(long, default_value_t = SolverConfig::default().max_frontier)]
    max_frontier: usize,

    /// Largest local combination count for the assumption fallback
    #[arg(long, default_value_t = SolverConfig::default().assumption_bound)]
    assumption_bound: u64,

    /// Random completions per rollout candidate
    #[arg(long, default_value_t = SolverConfig::default().rollout_trials)]
    rollout_trials: usize,

    /// Score rollout candidates on a single thread
    #[arg(long)]
    sequential: bool,
}

impl From<&SolverArgs> for SolverConfig {
    fn from(args: &SolverArgs) -> Self {
        SolverConfig::default()
            .with_max_frontier(args.max_frontier)
            .with_assumption_bound(args.assumption_bound)
            .with_rollout_trials(args.rollout_trials)
            .with_parallel_rollouts(!args.sequential)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn simulate(
    boards: Vec<PathBuf>,
    games: usize,
    dims: &Dimensions,
    config: SolverConfig,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    config.validate()?;
    let mut rng = seeded_rng(seed);

    let sources: Vec<Option<PathBuf>> = if boards.is_empty() {
        vec![None; games]
    } else {
        boards.into_iter().map(Some).collect()
    };

    let total = sources.len();
    let mut wins = 0;
    for (idx, source) in sources.into_iter().enumerate() {
        let board = match &source {
            Some(path) => Board::load(path).with_context(|| format!("loading {}", path.display())),
            None => Board::random(dims.rows, dims.cols(), dims.mines, &mut rng).map_err(Into::into),
        };
        let label = source
            .as_ref()
            .map_or_else(|| "random".to_string(), |path| path.display().to_string());

        let board = match board {
            Ok(board) => board,
            Err(err) => {
                println!("Game {}: {label}: error: {err:#}", idx + 1);
                continue;
            }
        };

        let mut chain = SolverChain::seeded(config, rng.gen())?;
        let mut puzzle = Puzzle::new(board);
        let report = chain.solve(&mut puzzle);
        log::debug!("Final board:\n{puzzle}");

        if report.state == SolveState::Won {
            wins += 1;
        }
        println!(
            "Game {}: {label}: {:?} after {} cycles, {} moves",
            idx + 1,
            report.state,
            report.cycles,
            report.moves.len()
        );
    }

    let rate = if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    };
    println!("Won {wins} of {total} games ({rate:.2}%)");
    Ok(())
}

fn generate(dims: &Dimensions, maps: usize, out: PathBuf, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = seeded_rng(seed);
    fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;

    for i in 1..=maps {
        let board = Board::random(dims.rows, dims.cols(), dims.mines, &mut rng)?;
        let (rows, cols) = board.dimensions();
        let path = out.join(format!(
            "{rows}x{cols}_{}mines_map{i}.txt",
            board.mines_count()
        ));
        fs::write(&path, board.to_string())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.cmd {
        Command::Simulate {
            boards,
            games,
            dims,
            solver,
            seed,
        } => simulate(boards, games, &dims, SolverConfig::from(&solver), seed),
        Command::Generate {
            dims,
            maps,
            out,
            seed,
        } => generate(&dims, maps, out, seed),
    }
}
