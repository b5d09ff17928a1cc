// Leaderboard flow against in-memory fakes; futures are driven with pollster.

use std::cell::{Cell, RefCell};

use robot_rush::leaderboard::{
    Leaderboard, LeaderboardError, LeaderboardUi, ScoreEntry, ScoreService, Submission,
};

#[derive(Default)]
struct FakeService {
    scores: RefCell<Vec<ScoreEntry>>,
    submitted: RefCell<Vec<(String, i64)>>,
    fail_fetch: bool,
    fail_submit: bool,
}

impl FakeService {
    fn with_scores(scores: &[i64]) -> Self {
        let entries = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoreEntry {
                name: format!("P{i}"),
                score,
                date: Some("2024-01-01".into()),
            })
            .collect();
        Self {
            scores: RefCell::new(entries),
            ..Self::default()
        }
    }
}

impl ScoreService for FakeService {
    async fn fetch_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        if self.fail_fetch {
            return Err(LeaderboardError::Network {
                action: "getting highscores",
                status: 500,
            });
        }
        Ok(self.scores.borrow().clone())
    }

    async fn submit_score(&self, name: &str, score: i64) -> Result<(), LeaderboardError> {
        if self.fail_submit {
            return Err(LeaderboardError::Network {
                action: "submitting score",
                status: 502,
            });
        }
        self.submitted.borrow_mut().push((name.to_string(), score));
        let mut scores = self.scores.borrow_mut();
        scores.push(ScoreEntry {
            name: name.to_string(),
            score,
            date: None,
        });
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(())
    }
}

struct FakeUi {
    answer: Option<String>,
    asked: Cell<usize>,
    shown: RefCell<Vec<Vec<ScoreEntry>>>,
}

impl FakeUi {
    fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            asked: Cell::new(0),
            shown: RefCell::new(Vec::new()),
        }
    }
}

impl LeaderboardUi for &FakeUi {
    fn ask_name(&self) -> Option<String> {
        self.asked.set(self.asked.get() + 1);
        self.answer.clone()
    }

    fn show_scores(&self, scores: &[ScoreEntry]) {
        self.shown.borrow_mut().push(scores.to_vec());
    }
}

const FULL_TABLE: [i64; 10] = [140, 130, 120, 110, 100, 90, 80, 70, 60, 50];

#[test]
fn score_below_the_table_is_not_prompted() {
    let ui = FakeUi::answering(Some("aaa"));
    let board = Leaderboard::new(FakeService::with_scores(&FULL_TABLE), &ui, 10, 10);

    let result = pollster::block_on(board.offer(49)).unwrap();

    assert_eq!(result, Submission::NotQualified);
    assert_eq!(ui.asked.get(), 0);
    assert_eq!(ui.shown.borrow().len(), 1);
}

#[test]
fn score_beating_the_lowest_is_prompted_and_submitted() {
    let ui = FakeUi::answering(Some("  robo  "));
    let service = FakeService::with_scores(&FULL_TABLE);
    let board = Leaderboard::new(service, &ui, 10, 10);

    let result = pollster::block_on(board.offer(51)).unwrap();

    assert_eq!(result, Submission::Submitted("ROBO".into()));
    assert_eq!(ui.asked.get(), 1);
    let shown = ui.shown.borrow();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].iter().any(|e| e.name == "ROBO" && e.score == 51));
}

#[test]
fn short_table_prompts_for_any_score() {
    let ui = FakeUi::answering(Some("zed"));
    let board = Leaderboard::new(FakeService::with_scores(&[300, 200]), &ui, 10, 10);

    let result = pollster::block_on(board.offer(0)).unwrap();

    assert_eq!(result, Submission::Submitted("ZED".into()));
}

#[test]
fn long_names_are_cut_to_ten_characters() {
    let ui = FakeUi::answering(Some("destroyer_of_bots"));
    let board = Leaderboard::new(FakeService::default(), &ui, 10, 10);

    let result = pollster::block_on(board.offer(5)).unwrap();

    assert_eq!(result, Submission::Submitted("DESTROYER_".into()));
}

#[test]
fn cancelled_or_blank_prompt_skips_submission_but_still_refreshes() {
    for answer in [None, Some(""), Some("   ")] {
        let ui = FakeUi::answering(answer);
        let board = Leaderboard::new(FakeService::with_scores(&[10]), &ui, 10, 10);

        let result = pollster::block_on(board.offer(99)).unwrap();

        assert_eq!(result, Submission::Skipped);
        assert_eq!(ui.shown.borrow().len(), 1);
        assert_eq!(ui.shown.borrow()[0].len(), 1);
    }
}

#[test]
fn fetch_failure_is_swallowed() {
    let ui = FakeUi::answering(Some("aaa"));
    let service = FakeService {
        fail_fetch: true,
        ..FakeService::default()
    };
    let board = Leaderboard::new(service, &ui, 10, 10);

    assert!(pollster::block_on(board.offer(10)).is_err());
    assert_eq!(pollster::block_on(board.record(10)), None);
    assert_eq!(ui.asked.get(), 0);
    assert!(ui.shown.borrow().is_empty());
}

#[test]
fn submit_failure_is_swallowed_without_refresh() {
    let ui = FakeUi::answering(Some("aaa"));
    let service = FakeService {
        fail_submit: true,
        ..FakeService::default()
    };
    let board = Leaderboard::new(service, &ui, 10, 10);

    assert_eq!(pollster::block_on(board.record(10)), None);
    assert_eq!(ui.asked.get(), 1);
    assert!(ui.shown.borrow().is_empty());
}
