use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::quiz::error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Biology,
    Physics,
    Chemistry,
    Logical,
    English,
}

impl Subject {
    /// Canonical order; the state encoder folds subjects in this order.
    pub const ALL: [Subject; 5] = [
        Self::Biology,
        Self::Physics,
        Self::Chemistry,
        Self::Logical,
        Self::English,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biology => "biology",
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Logical => "logical",
            Self::English => "english",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Biology => 0,
            Self::Physics => 1,
            Self::Chemistry => 2,
            Self::Logical => 3,
            Self::English => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "biology" => Ok(Self::Biology),
            "physics" => Ok(Self::Physics),
            "chemistry" => Ok(Self::Chemistry),
            "logical" => Ok(Self::Logical),
            "english" => Ok(Self::English),
            _ => Err(QuizError::InvalidDomainValue {
                kind: "subject",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Ordered easy < medium < hard.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn level(&self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    pub fn from_level(level: usize) -> Option<Self> {
        Self::ALL.get(level).copied()
    }

    pub fn is_lowest(&self) -> bool {
        self.level() == 0
    }

    pub fn is_highest(&self) -> bool {
        self.level() == Self::ALL.len() - 1
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 1.0,
            Self::Medium => 1.5,
            Self::Hard => 2.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuizError::InvalidDomainValue {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

/// Composite (subject, difficulty) key of the accuracy and attempt maps.
///
/// Serialized as `"subject:difficulty"` so the maps stay plain JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillKey {
    pub subject: Subject,
    pub difficulty: Difficulty,
}

impl SkillKey {
    pub fn new(subject: Subject, difficulty: Difficulty) -> Self {
        Self {
            subject,
            difficulty,
        }
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject, self.difficulty)
    }
}

impl FromStr for SkillKey {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subject, difficulty) = s.split_once(':').ok_or_else(|| {
            QuizError::InvalidDomainValue {
                kind: "skill key",
                value: s.to_string(),
            }
        })?;
        Ok(Self::new(subject.parse()?, difficulty.parse()?))
    }
}

impl Serialize for SkillKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SkillKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub type AccuracyMap = BTreeMap<SkillKey, f64>;
pub type AttemptMap = BTreeMap<SkillKey, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizAction {
    pub subject: Subject,
    pub difficulty: Difficulty,
}

impl QuizAction {
    pub fn new(subject: Subject, difficulty: Difficulty) -> Self {
        Self {
            subject,
            difficulty,
        }
    }

    pub fn key(&self) -> SkillKey {
        SkillKey::new(self.subject, self.difficulty)
    }
}

/// Borrowed view of a learner's history used for encoding and reward.
#[derive(Debug, Clone, Copy)]
pub struct QuizState<'a> {
    pub accuracies: &'a AccuracyMap,
    pub attempts: &'a AttemptMap,
    pub current_difficulty: Difficulty,
}

impl<'a> QuizState<'a> {
    pub fn new(
        accuracies: &'a AccuracyMap,
        attempts: &'a AttemptMap,
        current_difficulty: Difficulty,
    ) -> Self {
        Self {
            accuracies,
            attempts,
            current_difficulty,
        }
    }

    pub fn accuracy(&self, key: SkillKey) -> f64 {
        self.accuracies.get(&key).copied().unwrap_or(0.0)
    }

    pub fn attempts_for(&self, key: SkillKey) -> u32 {
        self.attempts.get(&key).copied().unwrap_or(0)
    }
}

/// Row/column index into the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateIndex {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillPerformance {
    pub accuracy: f64,
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_key_round_trips_through_json_map() {
        let mut map = AccuracyMap::new();
        map.insert(SkillKey::new(Subject::Physics, Difficulty::Hard), 0.25);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"physics:hard":0.25}"#);

        let parsed: AccuracyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(matches!(
            "astronomy".parse::<Subject>(),
            Err(QuizError::InvalidDomainValue { kind: "subject", .. })
        ));
        assert!(matches!(
            "extreme".parse::<Difficulty>(),
            Err(QuizError::InvalidDomainValue { kind: "difficulty", .. })
        ));
        assert!("physics".parse::<SkillKey>().is_err());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Biology ".parse::<Subject>().unwrap(), Subject::Biology);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_bounds() {
        assert!(Difficulty::Easy.is_lowest());
        assert!(Difficulty::Hard.is_highest());
        assert!(!Difficulty::Medium.is_lowest() && !Difficulty::Medium.is_highest());
    }

    #[test]
    fn indices_match_canonical_order() {
        for (i, subject) in Subject::ALL.iter().enumerate() {
            assert_eq!(subject.index(), i);
            assert_eq!(Subject::from_index(i), Some(*subject));
        }
        for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
            assert_eq!(difficulty.level(), i);
        }
        assert_eq!(Subject::from_index(5), None);
    }
}
