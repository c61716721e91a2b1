//! Integration tests for standings computation and sorting criteria.

use beach_tennis_web::{
    compute_standings, GameMatch, Player, SortCriterion, DEFAULT_CRITERIA,
};

fn players(n: usize) -> Vec<Player> {
    (0..n).map(|i| Player::new(format!("P{i}"))).collect()
}

fn completed(m: &mut GameMatch, s1: u32, s2: u32) {
    m.score_1 = s1;
    m.score_2 = s2;
    m.completed = true;
}

#[test]
fn stats_accumulate_wins_games_and_balance() {
    let p = players(8);
    let mut m1 = GameMatch::new([p[0].id, p[1].id], [p[2].id, p[3].id], 1);
    completed(&mut m1, 21, 15);
    let mut m2 = GameMatch::new([p[4].id, p[5].id], [p[6].id, p[7].id], 1);
    completed(&mut m2, 12, 21);

    let stats = compute_standings(&p, &[m1, m2], &DEFAULT_CRITERIA);
    let by_name = |n: &str| stats.iter().find(|s| s.player.name == n).unwrap();

    let winner = by_name("P0");
    assert_eq!(winner.wins, 1);
    assert_eq!(winner.total_games_won, 21);
    assert_eq!(winner.total_games_lost, 15);
    assert_eq!(winner.game_balance, 6);
    assert_eq!(winner.matches_played, 1);

    let loser = by_name("P2");
    assert_eq!(loser.wins, 0);
    assert_eq!(loser.game_balance, -6);

    // Both members of a team get the same result.
    assert_eq!(by_name("P1").wins, 1);
    assert_eq!(by_name("P6").total_games_won, 21);
}

#[test]
fn uncompleted_matches_are_ignored() {
    let p = players(4);
    let scheduled = GameMatch::new([p[0].id, p[1].id], [p[2].id, p[3].id], 1);
    let stats = compute_standings(&p, &[scheduled], &DEFAULT_CRITERIA);
    assert!(stats.iter().all(|s| s.matches_played == 0 && s.wins == 0));
}

#[test]
fn default_order_is_wins_then_balance_then_games_won() {
    let p = players(8);
    // P0/P1 win big, P4/P5 win small; P2/P3 and P6/P7 each lose once.
    let mut m1 = GameMatch::new([p[0].id, p[1].id], [p[2].id, p[3].id], 1);
    completed(&mut m1, 21, 5);
    let mut m2 = GameMatch::new([p[4].id, p[5].id], [p[6].id, p[7].id], 1);
    completed(&mut m2, 21, 19);

    let stats = compute_standings(&p, &[m1, m2], &DEFAULT_CRITERIA);
    // One win each, but P0/P1 have the better balance.
    assert_eq!(stats[0].player.name, "P0");
    assert_eq!(stats[1].player.name, "P1");
    assert_eq!(stats[2].player.name, "P4");
    assert_eq!(stats[3].player.name, "P5");
    // Losers rank below winners; P6/P7 lost by less.
    assert_eq!(stats[4].player.name, "P6");
    assert_eq!(stats[5].player.name, "P7");
    assert_eq!(stats[6].player.name, "P2");
    assert_eq!(stats[7].player.name, "P3");
}

#[test]
fn custom_criteria_change_the_order() {
    let p = players(4);
    let mut m = GameMatch::new([p[0].id, p[1].id], [p[2].id, p[3].id], 1);
    completed(&mut m, 10, 21);

    // Fewest games lost first: the winners conceded 10, the losers 21.
    let stats = compute_standings(&p, &[m], &[SortCriterion::TotalGamesLost]);
    assert_eq!(stats[0].player.name, "P2");
    assert_eq!(stats[1].player.name, "P3");
    assert_eq!(stats[2].player.name, "P0");
    assert_eq!(stats[3].player.name, "P1");
}

#[test]
fn full_ties_keep_roster_order() {
    let p = players(4);
    let stats = compute_standings(&p, &[], &DEFAULT_CRITERIA);
    let names: Vec<_> = stats.iter().map(|s| s.player.name.as_str()).collect();
    assert_eq!(names, ["P0", "P1", "P2", "P3"]);
}
