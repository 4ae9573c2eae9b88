//! End-to-end sessions driven by simulated judges.

use mergerank_core::{Comparison, NextComparison, RankError, RankingSession};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn ranked(session: &RankingSession<u32>) -> Vec<u32> {
    session
        .final_ranking()
        .expect("session finished")
        .into_iter()
        .map(|i| i.record)
        .collect()
}

fn answer(session: &mut RankingSession<u32>, c: &Comparison<u32>) -> Result<(), RankError> {
    // Higher scores first.
    let side = if c.left.record > c.right.record { "l" } else { "r" };
    session.submit_decision(&c.path.to_string(), c.left.position, c.right.position, "SORT", side)
}

#[test]
fn test_five_item_scenario() {
    // A..E with hidden scores; the judge always prefers the higher score.
    let scores = vec![30, 50, 10, 40, 20];
    let mut session = RankingSession::new(scores, vec!["score".to_string()], Some(5)).unwrap();

    let mut paths = Vec::new();
    while let NextComparison::Compare(c) = session.next_comparison() {
        paths.push(c.path.to_string());
        answer(&mut session, &c).unwrap();
    }

    assert_eq!(&paths[..2], ["l", "rr"]);
    assert_eq!(ranked(&session), vec![50, 40, 30, 20, 10]);
}

#[test]
fn test_abandoned_comparisons_are_stolen() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut scores: Vec<u32> = (1..=40).collect();
    scores.shuffle(&mut rng);

    let mut session = RankingSession::new(scores.clone(), Vec::new(), None).unwrap();
    let mut held: Vec<Comparison<u32>> = Vec::new();
    let mut rounds = 0;

    loop {
        rounds += 1;
        assert!(rounds < 100_000, "ranking did not converge");

        match session.next_comparison() {
            NextComparison::Compare(c) => {
                // A third of the judges walk away with their comparison.
                if rng.random_range(0..3) == 0 {
                    continue;
                }
                held.push(c);
            }
            NextComparison::NoWork => panic!("work must never run dry before the end"),
            NextComparison::Finished => break,
        }

        // Judges answer in random order, sometimes late.
        if held.len() > 3 || rng.random_bool(0.5) {
            let idx = rng.random_range(0..held.len());
            let c = held.swap_remove(idx);
            let _ = answer(&mut session, &c);
        }
    }

    let mut expected = scores;
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ranked(&session), expected);
    assert!(session.stats().steals > 0);
}

#[test]
fn test_top_k_with_passes_and_strikes() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut scores: Vec<u32> = (1..=30).collect();
    scores.shuffle(&mut rng);

    // Items below 5 are struck on sight, items above 27 are passed on sight.
    let mut session = RankingSession::new(scores, Vec::new(), Some(6)).unwrap();
    while let NextComparison::Compare(c) = session.next_comparison() {
        let path = c.path.to_string();
        let (l, r) = (c.left.position, c.right.position);
        let result = if c.left.record > 27 {
            session.submit_decision(&path, l, r, "PASS", "l")
        } else if c.right.record > 27 {
            session.submit_decision(&path, l, r, "PASS", "r")
        } else if c.left.record < 5 {
            session.submit_decision(&path, l, r, "SKIP", "l")
        } else if c.right.record < 5 {
            session.submit_decision(&path, l, r, "STRIKE", "r")
        } else {
            answer(&mut session, &c)
        };
        result.unwrap();
    }

    let ranking = ranked(&session);
    assert_eq!(ranking.len(), 6);
    // The three passed items come first, in whatever order they were met.
    let mut passed = ranking[..3].to_vec();
    passed.sort_unstable();
    assert_eq!(passed, vec![28, 29, 30]);
    assert_eq!(&ranking[3..], [27, 26, 25]);
}
