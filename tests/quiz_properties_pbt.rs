//! Property-based tests for the quiz learning core
//!
//! - Action index mapping is a bijection over 0..15
//! - EMA accuracy stays within [0, 1] for any response sequence
//! - Encoded states always fall inside the Q-table
//! - Focused selection never leaves the requested subject

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use quiz_adaptive_backend::quiz::action::{self, ACTION_COUNT};
use quiz_adaptive_backend::quiz::config::QuizConfig;
use quiz_adaptive_backend::quiz::encoder::{EncodingMode, StateEncoder};
use quiz_adaptive_backend::quiz::metrics::MetricsTracker;
use quiz_adaptive_backend::quiz::policy::EpsilonGreedyPolicy;
use quiz_adaptive_backend::quiz::q_table::QTable;
use quiz_adaptive_backend::quiz::{
    AccuracyMap, AttemptMap, Difficulty, QuizAction, QuizState, SkillKey, Subject,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_subject() -> impl Strategy<Value = Subject> {
    (0usize..Subject::ALL.len()).prop_map(|i| Subject::ALL[i])
}

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    (0usize..Difficulty::ALL.len()).prop_map(|i| Difficulty::ALL[i])
}

fn arb_action() -> impl Strategy<Value = QuizAction> {
    (arb_subject(), arb_difficulty()).prop_map(|(s, d)| QuizAction::new(s, d))
}

fn arb_f64_0_1() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_history() -> impl Strategy<Value = (AccuracyMap, AttemptMap)> {
    proptest::collection::vec((arb_action(), arb_f64_0_1(), 0u32..50), 0..30).prop_map(
        |entries| {
            let mut accuracies = AccuracyMap::new();
            let mut attempts = AttemptMap::new();
            for (action, accuracy, count) in entries {
                accuracies.insert(action.key(), accuracy);
                attempts.insert(action.key(), count);
            }
            (accuracies, attempts)
        },
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_action_index_round_trips(index in 0usize..ACTION_COUNT) {
        let action = action::from_index(index).unwrap();
        prop_assert_eq!(action::to_index(&action), index);
    }

    #[test]
    fn prop_action_index_is_within_its_subject(action in arb_action()) {
        let index = action::to_index(&action);
        prop_assert!(action::subject_actions(action.subject).contains(&index));
    }

    #[test]
    fn prop_out_of_range_index_has_no_action(index in ACTION_COUNT..usize::MAX) {
        prop_assert!(action::from_index(index).is_none());
    }

    #[test]
    fn prop_accuracy_stays_bounded(
        action in arb_action(),
        responses in proptest::collection::vec(any::<bool>(), 1..200),
    ) {
        let tracker = MetricsTracker::default();
        let mut accuracies = AccuracyMap::new();
        let mut attempts = AttemptMap::new();

        for (i, correct) in responses.iter().enumerate() {
            let perf = tracker.update(&mut accuracies, &mut attempts, &action, *correct);
            prop_assert!((0.0..=1.0).contains(&perf.accuracy));
            prop_assert_eq!(perf.attempts as usize, i + 1);
        }
        prop_assert_eq!(attempts.len(), 1);
    }

    #[test]
    fn prop_encoded_state_fits_table(
        (accuracies, attempts) in arb_history(),
        difficulty in arb_difficulty(),
        focus in proptest::option::of(arb_subject()),
    ) {
        let config = QuizConfig::default();
        let encoder = StateEncoder::new(config.thresholds.clone());
        let table = QTable::zeros(config.state_rows(), config.state_cols(), config.action_space());
        let state = QuizState::new(&accuracies, &attempts, difficulty);

        let index = encoder.encode(&state, EncodingMode::from(focus));
        prop_assert!(index.row < 243);
        prop_assert_eq!(index.col, difficulty.level());
        prop_assert!(table.contains(index));
    }

    #[test]
    fn prop_focused_selection_stays_in_subject(
        subject in arb_subject(),
        epsilon in arb_f64_0_1(),
        seed in any::<u64>(),
        boosted in 0usize..ACTION_COUNT,
    ) {
        let config = QuizConfig::default();
        let policy = EpsilonGreedyPolicy::new(config.exploration.clone());
        let (rows, cols, actions) = config.table_shape();
        let mut table = QTable::zeros(rows, cols, actions);
        let state = quiz_adaptive_backend::quiz::StateIndex { row: 0, col: 0 };
        table.set(state, boosted, 1.0);

        let mut rng = StdRng::seed_from_u64(seed);
        let selection = policy.select(&mut rng, &table, state, Some(subject), epsilon);
        prop_assert_eq!(selection.action.subject, subject);
    }

    #[test]
    fn prop_bellman_update_moves_toward_target(
        reward in -2.0f64..4.0,
        current in -5.0f64..5.0,
        next_max in -5.0f64..5.0,
    ) {
        let config = QuizConfig::default();
        let (rows, cols, actions) = config.table_shape();
        let mut table = QTable::zeros(rows, cols, actions);
        let here = quiz_adaptive_backend::quiz::StateIndex { row: 1, col: 0 };
        let there = quiz_adaptive_backend::quiz::StateIndex { row: 2, col: 1 };
        table.set(here, 0, current);
        for a in 0..ACTION_COUNT {
            table.set(there, a, next_max);
        }

        let updated = table.bellman_update(&config.learning, here, 0, reward, there);
        let target = reward + config.learning.discount_factor * next_max;
        let expected = current + config.learning.learning_rate * (target - current);
        prop_assert!((updated - expected).abs() < 1e-9);
        prop_assert!((table.get(here, 0) - updated).abs() < 1e-12);
    }
}

#[test]
fn skill_keys_parse_back_from_display() {
    for subject in Subject::ALL {
        for difficulty in Difficulty::ALL {
            let key = SkillKey::new(subject, difficulty);
            assert_eq!(key.to_string().parse::<SkillKey>().unwrap(), key);
        }
    }
}
