//! User feedback marks, watch intents, and the deletion-score heuristic.
//!
//! Marks are an append-only log; summaries are always re-derived from it and
//! never stored. Intents are one evolving record per (user, item).

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

/// Scores at or above this are high-priority deletion candidates.
pub const HIGH_PRIORITY_THRESHOLD: i32 = 15;
/// Scores at or above this (and below high priority) need review.
pub const REVIEW_NEEDED_THRESHOLD: i32 = 8;

pub const MAX_NOTE_LENGTH: usize = 2_000;
pub const MIN_INTENT_PRIORITY: i32 = -10;
pub const MAX_INTENT_PRIORITY: i32 = 10;

/// Channels a mark can be recorded through.
pub const VALID_MARK_SOURCES: &[&str] = &["web", "discord", "api"];

// ---------------------------------------------------------------------------
// Mark and intent types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkType {
    FinishedWatching,
    NotInterested,
    KeepForever,
    RewatchCandidate,
    PoorQuality,
    WrongVersion,
}

impl MarkType {
    pub const ALL: &'static [MarkType] = &[
        Self::FinishedWatching,
        Self::NotInterested,
        Self::KeepForever,
        Self::RewatchCandidate,
        Self::PoorQuality,
        Self::WrongVersion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinishedWatching => "FINISHED_WATCHING",
            Self::NotInterested => "NOT_INTERESTED",
            Self::KeepForever => "KEEP_FOREVER",
            Self::RewatchCandidate => "REWATCH_CANDIDATE",
            Self::PoorQuality => "POOR_QUALITY",
            Self::WrongVersion => "WRONG_VERSION",
        }
    }

    /// Contribution to the deletion score. `None` for `KEEP_FOREVER`, which
    /// overrides the score entirely.
    pub fn weight(self) -> Option<i32> {
        match self {
            Self::NotInterested => Some(5),
            Self::PoorQuality => Some(4),
            Self::WrongVersion => Some(3),
            Self::RewatchCandidate => Some(-3),
            Self::FinishedWatching => Some(0),
            Self::KeepForever => None,
        }
    }
}

impl FromStr for MarkType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid mark type '{s}'. Must be one of: {}",
                    Self::ALL
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    PlanToWatch,
    Watching,
    Completed,
    Dropped,
    OnHold,
}

impl IntentType {
    pub const ALL: &'static [IntentType] = &[
        Self::PlanToWatch,
        Self::Watching,
        Self::Completed,
        Self::Dropped,
        Self::OnHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlanToWatch => "PLAN_TO_WATCH",
            Self::Watching => "WATCHING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::OnHold => "ON_HOLD",
        }
    }

    /// The user still means to watch the item.
    pub fn is_active(self) -> bool {
        matches!(self, Self::PlanToWatch | Self::Watching | Self::OnHold)
    }
}

impl FromStr for IntentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid intent type '{s}'. Must be one of: {}",
                    Self::ALL
                        .iter()
                        .map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weighted deletion score, or the sentinel set by any `KEEP_FOREVER` mark.
///
/// Serializes as a number, or the string `"NEVER_DELETE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionScore {
    Score(i32),
    NeverDelete,
}

impl DeletionScore {
    /// Sort key: higher means delete sooner. Never-delete sorts below every score.
    fn priority(self) -> i64 {
        match self {
            Self::Score(s) => i64::from(s),
            Self::NeverDelete => i64::MIN,
        }
    }
}

impl Serialize for DeletionScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Score(score) => serializer.serialize_i32(*score),
            Self::NeverDelete => serializer.serialize_str("NEVER_DELETE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    HighPriority,
    ReviewNeeded,
    Keep,
}

impl FeedbackTier {
    pub fn for_score(score: DeletionScore) -> Self {
        match score {
            DeletionScore::NeverDelete => Self::Keep,
            DeletionScore::Score(s) if s >= HIGH_PRIORITY_THRESHOLD => Self::HighPriority,
            DeletionScore::Score(s) if s >= REVIEW_NEEDED_THRESHOLD => Self::ReviewNeeded,
            DeletionScore::Score(_) => Self::Keep,
        }
    }
}

/// Derived per-item view of the mark log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFeedbackSummary {
    pub media_item_key: String,
    /// Count per mark type; every type is present, zero when unused.
    pub mark_counts: BTreeMap<MarkType, u32>,
    pub total_marks: u32,
    pub deletion_score: DeletionScore,
    pub tier: FeedbackTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_intent_count: Option<u32>,
}

impl MediaFeedbackSummary {
    /// Attach the number of users who still intend to watch the item.
    pub fn with_intents(mut self, intents: impl IntoIterator<Item = IntentType>) -> Self {
        let active = intents.into_iter().filter(|i| i.is_active()).count();
        self.active_intent_count = Some(active as u32);
        self
    }
}

/// Aggregate every mark left on one item.
pub fn summarize(
    media_item_key: &str,
    marks: impl IntoIterator<Item = MarkType>,
) -> MediaFeedbackSummary {
    let mut mark_counts: BTreeMap<MarkType, u32> =
        MarkType::ALL.iter().map(|m| (*m, 0)).collect();
    let mut total_marks = 0;
    for mark in marks {
        *mark_counts.entry(mark).or_default() += 1;
        total_marks += 1;
    }

    let deletion_score = if mark_counts[&MarkType::KeepForever] > 0 {
        DeletionScore::NeverDelete
    } else {
        DeletionScore::Score(
            mark_counts
                .iter()
                .filter_map(|(mark, count)| Some(mark.weight()? * *count as i32))
                .sum(),
        )
    };

    MediaFeedbackSummary {
        media_item_key: media_item_key.to_string(),
        mark_counts,
        total_marks,
        deletion_score,
        tier: FeedbackTier::for_score(deletion_score),
        active_intent_count: None,
    }
}

/// Group a mark log by item and summarize each, highest deletion priority
/// first. Ties are ordered by item key.
pub fn summarize_all<K: AsRef<str>>(
    marks: impl IntoIterator<Item = (K, MarkType)>,
) -> Vec<MediaFeedbackSummary> {
    let mut by_item: BTreeMap<String, Vec<MarkType>> = BTreeMap::new();
    for (key, mark) in marks {
        by_item.entry(key.as_ref().to_string()).or_default().push(mark);
    }

    let mut summaries: Vec<_> = by_item
        .into_iter()
        .map(|(key, marks)| summarize(&key, marks))
        .collect();
    summaries.sort_by(|a, b| {
        b.deletion_score
            .priority()
            .cmp(&a.deletion_score.priority())
            .then_with(|| a.media_item_key.cmp(&b.media_item_key))
    });
    summaries
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

pub fn validate_note(note: Option<&str>) -> Result<(), CoreError> {
    match note {
        Some(n) if n.chars().count() > MAX_NOTE_LENGTH => Err(CoreError::Validation(format!(
            "Note must be at most {MAX_NOTE_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_marked_via(source: &str) -> Result<(), CoreError> {
    if VALID_MARK_SOURCES.contains(&source) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid mark source '{source}'. Must be one of: {}",
            VALID_MARK_SOURCES.join(", ")
        )))
    }
}

pub fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if (MIN_INTENT_PRIORITY..=MAX_INTENT_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {MIN_INTENT_PRIORITY} and {MAX_INTENT_PRIORITY}"
        )))
    }
}

/// Season and episode progress, when given, must be non-negative.
pub fn validate_progress(
    current_season: Option<i32>,
    current_episode: Option<i32>,
) -> Result<(), CoreError> {
    if current_season.is_some_and(|s| s < 0) {
        return Err(CoreError::Validation(
            "current_season must be non-negative".to_string(),
        ));
    }
    if current_episode.is_some_and(|e| e < 0) {
        return Err(CoreError::Validation(
            "current_episode must be non-negative".to_string(),
        ));
    }
    Ok(())
}
