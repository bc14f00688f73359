use criterion::{criterion_group, criterion_main, Criterion};
use minesweeper_solver::{
    solver::Justification, Board, Puzzle, SolveReport, SolveState, SolverChain, SolverConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Default)]
struct AggregateStats {
    games: Vec<(SolveReport, usize)>,
}

impl AggregateStats {
    fn games_played(&self) -> usize {
        self.games.len()
    }

    fn success_rate(&self) -> f64 {
        if self.games_played() == 0 {
            return 0.0;
        }
        self.games
            .iter()
            .filter(|(report, _)| report.state == SolveState::Won)
            .count() as f64
            / self.games_played() as f64
            * 100.0
    }

    /// Share of safe cells uncovered, averaged over games
    fn average_completion(&self, safe_cells: usize) -> f64 {
        if self.games_played() == 0 {
            return 0.0;
        }
        let total: f64 = self
            .games
            .iter()
            .map(|&(_, revealed)| revealed as f64 / safe_cells as f64 * 100.0)
            .sum();
        total / self.games_played() as f64
    }

    fn average_cycles(&self) -> f64 {
        if self.games_played() == 0 {
            return 0.0;
        }
        self.games.iter().map(|(report, _)| report.cycles).sum::<usize>() as f64
            / self.games_played() as f64
    }

    fn guesses(&self) -> usize {
        self.games
            .iter()
            .flat_map(|(report, _)| &report.moves)
            .filter(|mv| {
                matches!(
                    mv.justification,
                    Justification::LowestProbability | Justification::Rollout
                )
            })
            .count()
    }
}

fn play(board: Board, seed: u64) -> (SolveReport, usize) {
    let mut puzzle = Puzzle::new(board);
    let mut chain = SolverChain::seeded(SolverConfig::default(), seed).unwrap();
    let report = chain.solve(&mut puzzle);
    let revealed = puzzle.revealed_count() - usize::from(puzzle.is_lost());
    (report, revealed)
}

fn benchmark_solver_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("SolverChain");
    group.sample_size(10);

    let test_configs = vec![
        (8, 8, 10, "Beginner"),
        (16, 16, 40, "Intermediate"),
    ];

    for (rows, cols, mines, name) in test_configs {
        let mut rng = StdRng::seed_from_u64(2024);

        group.bench_function(format!("{} {}x{}", name, rows, cols), |b| {
            b.iter_with_setup(
                || Board::random(rows, cols, mines, &mut rng).unwrap(),
                |board| criterion::black_box(play(board, 7)),
            );
        });

        // Effectiveness stats (50 games)
        let mut aggregate = AggregateStats::default();
        for seed in 0..50 {
            let board = Board::random(rows, cols, mines, &mut rng).unwrap();
            aggregate.games.push(play(board, seed));
        }

        println!("\n{} on {}x{} board:", name, rows, cols);
        println!("Success rate: {:.1}%", aggregate.success_rate());
        println!(
            "Average board completion: {:.1}%",
            aggregate.average_completion(rows * cols - mines)
        );
        println!("Average cycles per game: {:.1}", aggregate.average_cycles());
        println!("Total guesses: {}", aggregate.guesses());
        println!("Games played: {}", aggregate.games_played());
    }

    group.finish();
}

criterion_group!(benches, benchmark_solver_chain);
criterion_main!(benches);
