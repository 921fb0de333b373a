use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{CompanionError, Result};
use crate::core::message::Sender;
use crate::core::store::{keys, PersistenceStore};
use crate::core::tier::Tier;

/// Default number of entries kept before the oldest ones are evicted
pub const DEFAULT_DIARY_CAPACITY: usize = 50;

/// Keywords that make a message worth remembering
pub const SPECIAL_MOMENT_KEYWORDS: &[&str] = &[
    "yêu",
    "mãi mãi",
    "kỷ niệm",
    "đặc biệt",
    "hẹn hò",
    "forever",
    "anniversary",
    "special",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaryCategory {
    SpecialEvent,
    Birthday,
    Milestone,
    Manual,
    KeywordTriggered,
}

impl std::fmt::Display for DiaryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiaryCategory::SpecialEvent => write!(f, "special_event"),
            DiaryCategory::Birthday => write!(f, "birthday"),
            DiaryCategory::Milestone => write!(f, "milestone"),
            DiaryCategory::Manual => write!(f, "manual"),
            DiaryCategory::KeywordTriggered => write!(f, "keyword_triggered"),
        }
    }
}

/// Immutable record of a notable moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub content: String,
    pub category: DiaryCategory,
}

impl DiaryEntry {
    pub fn new(
        category: DiaryCategory,
        title: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            title: title.into(),
            content: content.into(),
            category,
        }
    }
}

/// Why a message was judged diary-worthy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiaryTrigger {
    Keyword(&'static str),
    FirstOfDay,
    MessageCount(u64),
    TierMilestone(Tier),
}

impl DiaryTrigger {
    pub fn category(&self) -> DiaryCategory {
        match self {
            DiaryTrigger::Keyword(_) => DiaryCategory::KeywordTriggered,
            DiaryTrigger::FirstOfDay
            | DiaryTrigger::MessageCount(_)
            | DiaryTrigger::TierMilestone(_) => DiaryCategory::Milestone,
        }
    }
}

/// Title and content for an automatic entry.
///
/// Pure template lookup keyed by (trigger, sender, tier); `excerpt` is the
/// already shortened message text.
pub fn compose(
    trigger: DiaryTrigger,
    sender: Sender,
    tier: Tier,
    character_name: &str,
    excerpt: &str,
) -> (String, String) {
    match trigger {
        DiaryTrigger::Keyword(keyword) => {
            let title = match tier {
                Tier::New | Tier::Friend => "A warm little moment",
                Tier::CloseFriend => "Words from the heart",
                Tier::Lover | Tier::Soulmate => "A moment to treasure",
            };
            let content = match sender {
                Sender::User => format!(
                    "You told {} something special (\"{}\"): \"{}\"",
                    character_name, keyword, excerpt
                ),
                Sender::Companion => format!(
                    "{} said something special (\"{}\"): \"{}\"",
                    character_name, keyword, excerpt
                ),
            };
            (title.to_string(), content)
        }
        DiaryTrigger::FirstOfDay => {
            let content = match sender {
                Sender::User => format!(
                    "Today's conversation with {} began with: \"{}\"",
                    character_name, excerpt
                ),
                Sender::Companion => format!(
                    "{} reached out first today: \"{}\"",
                    character_name, excerpt
                ),
            };
            ("First message of the day".to_string(), content)
        }
        DiaryTrigger::MessageCount(count) => (
            format!("{} messages together", count),
            format!(
                "You and {} have now exchanged {} messages. Latest: \"{}\"",
                character_name, count, excerpt
            ),
        ),
        DiaryTrigger::TierMilestone(reached) => {
            let content = match reached {
                Tier::New => format!("You met {} for the first time.", character_name),
                Tier::Friend => format!("You and {} became friends.", character_name),
                Tier::CloseFriend => {
                    format!("{} now counts you as a close friend.", character_name)
                }
                Tier::Lover => format!("You and {} are now lovers.", character_name),
                Tier::Soulmate => format!("{} has found a soulmate in you.", character_name),
            };
            (
                format!("{} {}", reached.emoji(), reached.label()),
                content,
            )
        }
    }
}

/// First special-moment keyword contained in already normalised text
pub fn special_moment_keyword(normalized_text: &str) -> Option<&'static str> {
    SPECIAL_MOMENT_KEYWORDS
        .iter()
        .copied()
        .find(|k| normalized_text.contains(k))
}

/// Persisted, capacity-bounded diary.
///
/// Entries are stored oldest first; once the capacity is exceeded the oldest
/// entries are dropped.
#[derive(Debug, Clone)]
pub struct Diary {
    entries: Vec<DiaryEntry>,
    capacity: usize,
}

impl Diary {
    pub fn load<S: PersistenceStore>(store: &S, capacity: usize) -> Result<Self> {
        let entries: Vec<DiaryEntry> = store.load(keys::DIARY)?.unwrap_or_default();
        let mut diary = Diary {
            entries,
            capacity: capacity.max(1),
        };
        diary.evict();
        Ok(diary)
    }

    /// Append an entry and persist; returns the evicted entries
    pub fn record<S: PersistenceStore>(
        &mut self,
        entry: DiaryEntry,
        store: &mut S,
    ) -> Result<Vec<DiaryEntry>> {
        info!(category = %entry.category, title = %entry.title, "diary entry recorded");
        self.entries.push(entry);
        let evicted = self.evict();
        store.save(keys::DIARY, &self.entries)?;
        Ok(evicted)
    }

    pub fn delete<S: PersistenceStore>(&mut self, id: &str, store: &mut S) -> Result<DiaryEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CompanionError::NotFound(id.to_string()))?;
        let removed = self.entries.remove(idx);
        store.save(keys::DIARY, &self.entries)?;
        Ok(removed)
    }

    pub fn clear<S: PersistenceStore>(&mut self, store: &mut S) -> Result<()> {
        self.entries.clear();
        store.remove(keys::DIARY)
    }

    /// Entries for display, newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &DiaryEntry> {
        self.entries.iter().rev()
    }

    pub fn get(&self, id: &str) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict(&mut self) -> Vec<DiaryEntry> {
        if self.entries.len() <= self.capacity {
            return Vec::new();
        }
        let overflow = self.entries.len() - self.capacity;
        debug!(overflow, "evicting oldest diary entries");
        self.entries.drain(..overflow).collect()
    }
}
