use ballgame::simulation::{run_simulations, simulate_matchup, Matchup};

const MAX_SCORE: usize = 256;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn nonzero_cells(buffer: &[u32]) -> Vec<(usize, usize, u32)> {
    buffer
        .iter()
        .enumerate()
        .filter(|(_, &count)| count != 0)
        .map(|(i, &count)| (i / MAX_SCORE, i % MAX_SCORE, count))
        .collect()
}

#[test]
fn single_game_overwrites_a_dirty_buffer_with_one_count() {
    let mut buffer = vec![7u32; MAX_SCORE * MAX_SCORE];

    run_simulations(
        &mut buffer,
        MAX_SCORE,
        fixture("harbor_cats.txt"),
        fixture("river_hawks.txt"),
        1,
        Some(3),
    )
    .expect("simulation succeeds");

    let cells = nonzero_cells(&buffer);
    assert_eq!(cells.len(), 1, "{cells:?}");
    assert_eq!(cells[0].2, 1);

    let mut matchup = Matchup::from_paths(fixture("harbor_cats.txt"), fixture("river_hawks.txt"))
        .expect("fixtures load");
    let expected = simulate_matchup(&mut matchup, 1, 3, MAX_SCORE);
    let expected: Vec<_> = expected.iter_nonzero().collect();
    assert_eq!(cells, expected);
}

#[test]
fn buffer_run_matches_owned_histogram_for_many_games() {
    let mut buffer = vec![1u32; MAX_SCORE * MAX_SCORE];
    run_simulations(
        &mut buffer,
        MAX_SCORE,
        fixture("harbor_cats.txt"),
        fixture("river_hawks.txt"),
        500,
        Some(11),
    )
    .expect("simulation succeeds");

    let mut matchup = Matchup::from_paths(fixture("harbor_cats.txt"), fixture("river_hawks.txt"))
        .expect("fixtures load");
    let expected = simulate_matchup(&mut matchup, 500, 11, MAX_SCORE);
    assert_eq!(buffer.iter().map(|&c| u64::from(c)).sum::<u64>(), 500);
    assert_eq!(buffer.as_slice(), expected.as_slice());
}

#[test]
fn short_buffer_is_rejected_before_any_game() {
    let mut buffer = vec![0u32; 10];
    let err = run_simulations(
        &mut buffer,
        MAX_SCORE,
        fixture("harbor_cats.txt"),
        fixture("river_hawks.txt"),
        1,
        Some(1),
    )
    .expect_err("buffer too small");
    assert_eq!(err.status_code(), -6.0);
}
