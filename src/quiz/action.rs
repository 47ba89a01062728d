use crate::quiz::types::{Difficulty, QuizAction, Subject};

pub const ACTION_COUNT: usize = Subject::ALL.len() * Difficulty::ALL.len();

pub fn to_index(action: &QuizAction) -> usize {
    action.subject.index() * Difficulty::ALL.len() + action.difficulty.level()
}

/// Inverse of [`to_index`]; `None` outside the action space.
pub fn from_index(index: usize) -> Option<QuizAction> {
    let subject = Subject::from_index(index / Difficulty::ALL.len())?;
    let difficulty = Difficulty::from_level(index % Difficulty::ALL.len())?;
    Some(QuizAction::new(subject, difficulty))
}

/// Action indices belonging to one subject, in ascending order.
pub fn subject_actions(subject: Subject) -> std::ops::Range<usize> {
    let start = subject.index() * Difficulty::ALL.len();
    start..start + Difficulty::ALL.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_layout_is_subject_major() {
        assert_eq!(to_index(&QuizAction::new(Subject::Biology, Difficulty::Easy)), 0);
        assert_eq!(to_index(&QuizAction::new(Subject::Biology, Difficulty::Hard)), 2);
        assert_eq!(to_index(&QuizAction::new(Subject::Physics, Difficulty::Easy)), 3);
        assert_eq!(
            to_index(&QuizAction::new(Subject::English, Difficulty::Hard)),
            ACTION_COUNT - 1
        );
    }

    #[test]
    fn every_index_maps_back() {
        for index in 0..ACTION_COUNT {
            let action = from_index(index).expect("index in range");
            assert_eq!(to_index(&action), index);
        }
        assert_eq!(from_index(ACTION_COUNT), None);
    }

    #[test]
    fn subject_actions_cover_three_difficulties() {
        let range = subject_actions(Subject::Chemistry);
        assert_eq!(range, 6..9);
        for index in range {
            assert_eq!(from_index(index).unwrap().subject, Subject::Chemistry);
        }
    }
}
