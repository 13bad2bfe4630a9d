//! Basic example of using the Tetonor engine

use tetonor_core::{
    find_conflicts, Difficulty, Game, GameEvent, GameMode, Generator, MemoryRankingStore,
    RankingApi,
};

fn main() {
    // Generate a puzzle
    println!("Generating a Medium difficulty puzzle...\n");
    let mut generator = Generator::with_seed(42);
    let generated = match generator.generate(Difficulty::Medium) {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            return;
        }
    };

    let puzzle = &generated.puzzle;
    println!("Grid:");
    for row in puzzle.grid.chunks(4) {
        let cells: Vec<String> = row
            .iter()
            .map(|c| format!("{:>5}{}", c.value, c.kind.symbol()))
            .collect();
        println!("  {}", cells.join(" "));
    }
    let strip: Vec<String> = puzzle.strip.iter().map(|s| s.value.to_string()).collect();
    println!("Strip: {}\n", strip.join(" "));

    println!(
        "Attempts: {}, clean: {}, conflicts: {:?}\n",
        generated.report.attempts,
        generated.report.clean,
        find_conflicts(&puzzle.strip, &puzzle.grid)
    );

    // Play it by picking each pair's own numbers
    let mut game = Game::with_puzzle(
        Generator::with_seed(43),
        tetonor_core::SystemClock,
        Difficulty::Medium,
        GameMode::Standard,
        generated.puzzle.clone(),
        generated.report,
    );

    let mut pair_ids: Vec<u32> = game.puzzle().strip.iter().map(|s| s.pair_id).collect();
    pair_ids.sort();
    pair_ids.dedup();

    for pair_id in pair_ids {
        let picks: Vec<usize> = game
            .puzzle()
            .strip
            .iter()
            .enumerate()
            .filter(|(_, s)| s.pair_id == pair_id)
            .map(|(i, _)| i)
            .collect();
        for index in picks {
            if let Err(e) = game.handle(GameEvent::StripClicked(index)) {
                eprintln!("Bad move: {}", e);
            }
        }
        for notice in game.flush() {
            println!("{:?}", notice);
        }
    }
    println!("\nFinal score: {}", game.score());

    // Submit it to an in-memory ranking
    println!("\n--- Rankings ---\n");
    let mut api = RankingApi::new(MemoryRankingStore::new());
    let body = serde_json::json!({ "name": "demo", "score": game.score(), "level": "medium" });
    let response = api.handle("POST", "/api/score", Some(&body));
    println!("POST /api/score -> {} {}", response.status, response.body);
    let response = api.handle("GET", "/api/rankings/medium", None);
    println!("GET /api/rankings/medium -> {} {}", response.status, response.body);
}
