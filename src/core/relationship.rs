use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::core::calendar::occasions_on;
use crate::core::classifier::normalize;
use crate::core::diary::{self, DiaryCategory, DiaryEntry, DiaryTrigger};
use crate::core::error::Result;
use crate::core::message::{Message, Sender};
use crate::core::profile::CharacterProfile;
use crate::core::store::{keys, PersistenceStore};
use crate::core::tier::{Tier, MAX_SCORE};

/// A diary milestone every this many messages
pub const DEFAULT_MILESTONE_INTERVAL: u64 = 50;

pub const DEFAULT_REMINDER_AFTER_HOURS: i64 = 24;

const EXCERPT_CHARS: usize = 80;

/// Relationship with the active character. The tier is always derived from
/// `score`, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipState {
    #[serde(deserialize_with = "clamped_score")]
    pub score: u8,

    /// Tier at the time of the last check, used to detect transitions
    #[serde(default = "first_tier")]
    pub previous_tier: Tier,

    /// Tiers whose milestone already fired
    #[serde(default)]
    pub milestones_reached: BTreeSet<Tier>,

    #[serde(default)]
    pub message_count: u64,

    /// Calendar date of the last evaluated message
    #[serde(default)]
    pub last_message_date: Option<NaiveDate>,

    #[serde(default)]
    pub last_user_message_at: Option<DateTime<Utc>>,
}

impl Default for RelationshipState {
    fn default() -> Self {
        RelationshipState {
            score: 0,
            previous_tier: Tier::New,
            milestones_reached: BTreeSet::from([Tier::New]),
            message_count: 0,
            last_message_date: None,
            last_user_message_at: None,
        }
    }
}

impl RelationshipState {
    pub fn tier(&self) -> Tier {
        Tier::from_score(self.score)
    }
}

fn read_state<S: PersistenceStore>(store: &S) -> Result<RelationshipState> {
    let mut state: RelationshipState = store.load(keys::RELATIONSHIP)?.unwrap_or_default();
    // previous_tier must agree with a possibly clamped score
    state.previous_tier = state.tier();
    state.milestones_reached.insert(Tier::New);
    Ok(state)
}

fn first_tier() -> Tier {
    Tier::New
}

fn clamped_score<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    let clamped = if raw.is_nan() {
        0
    } else {
        raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
    };
    if f64::from(clamped) != raw {
        warn!(raw, clamped, "stored intimacy score out of range, clamping");
    }
    Ok(clamped)
}

/// Facts about one `apply_delta` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreChange {
    pub old_score: u8,
    pub new_score: u8,
    pub tier_changed: bool,
    pub from_tier: Tier,
    pub to_tier: Tier,
}

impl ScoreChange {
    /// Delta that actually landed after clamping
    pub fn applied(&self) -> i32 {
        i32::from(self.new_score) - i32::from(self.old_score)
    }

    pub fn is_level_up(&self) -> bool {
        self.tier_changed && self.to_tier > self.from_tier
    }
}

/// First arrival at a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub tier: Tier,
}

/// A special date that fired for the first time today
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialDateEvent {
    pub event_id: String,
    pub name: String,
    pub category: DiaryCategory,
    pub message: String,
}

/// Single source of truth for the intimacy score and everything derived from it.
pub struct RelationshipTracker<S: PersistenceStore> {
    store: S,
    state: RelationshipState,
    milestone_interval: u64,
    reminder_after: Option<Duration>,
    utc_offset: FixedOffset,
}

impl<S: PersistenceStore> RelationshipTracker<S> {
    /// Load the persisted state, or start fresh at score 0
    pub fn load(store: S) -> Result<Self> {
        let state = read_state(&store)?;
        debug!(score = state.score, tier = %state.tier(), "relationship loaded");

        Ok(RelationshipTracker {
            store,
            state,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            reminder_after: Some(Duration::hours(DEFAULT_REMINDER_AFTER_HOURS)),
            utc_offset: Utc.fix(),
        })
    }

    /// Re-read the persisted state, picking up writes from other handles on the same store
    pub fn reload(&mut self) -> Result<()> {
        self.state = read_state(&self.store)?;
        Ok(())
    }

    /// 0 disables the message-count milestone
    pub fn with_milestone_interval(mut self, interval: u64) -> Self {
        self.milestone_interval = interval;
        self
    }

    /// `None` disables inactivity reminders
    pub fn with_reminder_after(mut self, after: Option<Duration>) -> Self {
        self.reminder_after = after;
        self
    }

    /// Offset used to turn message timestamps into calendar dates
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn state(&self) -> &RelationshipState {
        &self.state
    }

    pub fn score(&self) -> u8 {
        self.state.score
    }

    pub fn tier(&self) -> Tier {
        self.state.tier()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Calendar date of `at` in the tracker's timezone
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset).date_naive()
    }

    /// Apply a score delta, clamp to `[0, 100]`, recompute the tier and persist.
    pub fn apply_delta(&mut self, delta: i32) -> Result<ScoreChange> {
        let old_score = self.state.score;
        let new_score = i32::from(old_score)
            .saturating_add(delta)
            .clamp(0, i32::from(MAX_SCORE)) as u8;
        let from_tier = self.state.previous_tier;
        let to_tier = Tier::from_score(new_score);

        self.state.score = new_score;
        self.state.previous_tier = to_tier;
        self.save_state()?;

        let change = ScoreChange {
            old_score,
            new_score,
            tier_changed: from_tier != to_tier,
            from_tier,
            to_tier,
        };

        debug!(delta, old_score, new_score, tier = %to_tier, "intimacy updated");
        if change.tier_changed {
            info!(from = %from_tier, to = %to_tier, "relationship tier changed");
        }

        Ok(change)
    }

    /// Mark `tier` as reached. Returns the milestone only on the first arrival.
    pub fn check_milestone(&mut self, tier: Tier) -> Result<Option<Milestone>> {
        if !self.state.milestones_reached.insert(tier) {
            return Ok(None);
        }
        self.save_state()?;
        info!(tier = %tier, "milestone reached");
        Ok(Some(Milestone { tier }))
    }

    /// Decide whether `message` deserves a diary entry.
    ///
    /// Every call advances the bookkeeping (message counter, first-of-day
    /// sentinel); the entry, if any, comes from the first matching rule:
    /// special keyword, first message of the day, message-count interval,
    /// then a first-arrival tier milestone.
    pub fn evaluate_for_diary(
        &mut self,
        message: &Message,
        milestone: Option<&Milestone>,
        character: Option<&CharacterProfile>,
    ) -> Result<Option<DiaryEntry>> {
        let Some(character) = character else {
            return Ok(None);
        };

        let today = self.local_date(message.timestamp);
        let first_of_day = self.state.last_message_date != Some(today);
        if first_of_day {
            self.state.last_message_date = Some(today);
        }

        self.state.message_count += 1;
        let count = self.state.message_count;
        let count_hit = self.milestone_interval > 0 && count % self.milestone_interval == 0;

        if message.sender == Sender::User {
            self.state.last_user_message_at = Some(message.timestamp);
        }
        self.save_state()?;

        let normalized = normalize(&message.content);
        let trigger = diary::special_moment_keyword(&normalized)
            .map(DiaryTrigger::Keyword)
            .or_else(|| first_of_day.then_some(DiaryTrigger::FirstOfDay))
            .or_else(|| count_hit.then_some(DiaryTrigger::MessageCount(count)))
            .or_else(|| milestone.map(|m| DiaryTrigger::TierMilestone(m.tier)));

        let Some(trigger) = trigger else {
            return Ok(None);
        };

        debug!(?trigger, count, "message is diary-worthy");

        let (title, content) = diary::compose(
            trigger,
            message.sender,
            self.tier(),
            &character.name,
            &message.preview(EXCERPT_CHARS),
        );

        Ok(Some(DiaryEntry::new(
            trigger.category(),
            title,
            content,
            message.timestamp,
        )))
    }

    /// Next special date on `today` that has not been shown yet today.
    ///
    /// Safe to poll repeatedly: each event id fires at most once per date.
    pub fn check_special_date(
        &mut self,
        today: NaiveDate,
        character: &CharacterProfile,
    ) -> Result<Option<SpecialDateEvent>> {
        for occasion in occasions_on(today, character) {
            let key = keys::event_shown(occasion.event_id);
            let last_shown: Option<NaiveDate> = self.store.load(&key)?;
            if last_shown == Some(today) {
                continue;
            }

            self.store.save(&key, &today)?;
            info!(event = occasion.event_id, %today, "special date");

            let message = occasion.greeting(character, self.tier());
            return Ok(Some(SpecialDateEvent {
                event_id: occasion.event_id.to_string(),
                category: occasion.diary_category(),
                name: occasion.name,
                message,
            }));
        }

        Ok(None)
    }

    /// Companion reminder once the user has been silent for too long.
    ///
    /// Fires at most once per silence: a new user message re-arms it.
    pub fn check_inactivity(
        &mut self,
        now: DateTime<Utc>,
        character: &CharacterProfile,
    ) -> Result<Option<Message>> {
        let (Some(after), Some(last)) = (self.reminder_after, self.state.last_user_message_at)
        else {
            return Ok(None);
        };

        if now - last < after {
            return Ok(None);
        }

        let sent: Option<DateTime<Utc>> = self.store.load(keys::REMINDER_SENT_AT)?;
        if matches!(sent, Some(at) if at >= last) {
            return Ok(None);
        }

        self.store.save(keys::REMINDER_SENT_AT, &now)?;
        info!(silent_hours = (now - last).num_hours(), "inactivity reminder");

        Ok(Some(Message::new(
            Sender::Companion,
            reminder_text(self.tier(), &character.name),
            now,
        )))
    }

    /// Forget everything about the relationship (character deleted or recreated)
    pub fn reset(&mut self) -> Result<()> {
        self.state = RelationshipState::default();
        for key in self.store.keys_with_prefix(keys::EVENT_SHOWN_PREFIX)? {
            self.store.remove(&key)?;
        }
        self.store.remove(keys::REMINDER_SENT_AT)?;
        self.save_state()?;
        info!("relationship reset");
        Ok(())
    }

    fn save_state(&mut self) -> Result<()> {
        self.store.save(keys::RELATIONSHIP, &self.state)
    }
}

fn reminder_text(tier: Tier, name: &str) -> String {
    match tier {
        Tier::New => format!("{}: Dạo này bạn bận lắm hả? Rảnh thì ghé nói chuyện nhé 🙂", name),
        Tier::Friend => format!("{}: Lâu rồi không thấy bạn, có chuyện gì vui kể mình nghe với!", name),
        Tier::CloseFriend => format!("{}: Ê, mất tích đâu rồi? Mình nhớ bạn đó nha 😤", name),
        Tier::Lover => format!("{}: Anh ơi, cả ngày nay em chờ tin nhắn của anh mãi 🥺", name),
        Tier::Soulmate => format!("{}: Không có anh bên cạnh, em thấy thiếu thiếu gì đó... nhớ anh nhiều 💞", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use chrono::TimeZone;

    fn tracker() -> RelationshipTracker<MemoryStore> {
        RelationshipTracker::load(MemoryStore::new()).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn user_at(text: &str, when: DateTime<Utc>) -> Message {
        Message::new(Sender::User, text, when)
    }

    #[test]
    fn test_starts_at_zero() {
        let tracker = tracker();
        assert_eq!(tracker.score(), 0);
        assert_eq!(tracker.tier(), Tier::New);
        assert!(tracker.state().milestones_reached.contains(&Tier::New));
    }

    #[test]
    fn test_clamp_upper() {
        let mut tracker = tracker();
        tracker.apply_delta(98).unwrap();
        let change = tracker.apply_delta(5).unwrap();
        assert_eq!(change.new_score, 100);
        assert_eq!(change.applied(), 2);
    }

    #[test]
    fn test_clamp_lower() {
        let mut tracker = tracker();
        tracker.apply_delta(3).unwrap();
        let change = tracker.apply_delta(-10).unwrap();
        assert_eq!(change.new_score, 0);
    }

    #[test]
    fn test_score_always_in_range() {
        let mut tracker = tracker();
        let deltas = [50, 70, -200, 8, -2, 1000, -1, i32::MAX, i32::MIN, 13];
        for delta in deltas {
            let change = tracker.apply_delta(delta).unwrap();
            assert!(change.new_score <= MAX_SCORE);
            assert_eq!(tracker.tier(), Tier::from_score(tracker.score()));
        }
    }

    #[test]
    fn test_transition_detection() {
        let mut tracker = tracker();
        tracker.apply_delta(25).unwrap();

        let change = tracker.apply_delta(10).unwrap();
        assert!(change.tier_changed);
        assert_eq!(change.from_tier, Tier::Friend);
        assert_eq!(change.to_tier, Tier::CloseFriend);
        assert!(change.is_level_up());

        let change = tracker.apply_delta(-3).unwrap();
        assert_eq!(change.new_score, 32);
        assert!(!change.tier_changed);
    }

    #[test]
    fn test_milestone_idempotent() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.check_milestone(Tier::Lover).unwrap(),
            Some(Milestone { tier: Tier::Lover })
        );
        assert_eq!(tracker.check_milestone(Tier::Lover).unwrap(), None);
    }

    #[test]
    fn test_milestone_oscillation() {
        let mut tracker = tracker();
        tracker.apply_delta(48).unwrap();

        let mut fired = 0;
        for delta in [3, -2, 2, -2, 2, -2, 2] {
            let change = tracker.apply_delta(delta).unwrap();
            if change.is_level_up() && tracker.check_milestone(change.to_tier).unwrap().is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_reload_picks_up_external_write() {
        let mut tracker = tracker();
        tracker.apply_delta(5).unwrap();

        let mut written = tracker.state().clone();
        written.score = 31;
        written.last_user_message_at = Some(at(2026, 5, 1, 9));
        tracker.store_mut().save(keys::RELATIONSHIP, &written).unwrap();

        tracker.reload().unwrap();
        assert_eq!(tracker.score(), 31);
        assert_eq!(tracker.tier(), Tier::CloseFriend);
        assert_eq!(tracker.state().last_user_message_at, Some(at(2026, 5, 1, 9)));
    }

    #[test]
    fn test_state_persists() {
        let mut tracker = tracker();
        tracker.apply_delta(42).unwrap();
        tracker.check_milestone(Tier::CloseFriend).unwrap();

        let reloaded = RelationshipTracker::load(tracker.into_store()).unwrap();
        assert_eq!(reloaded.score(), 42);
        assert!(reloaded.state().milestones_reached.contains(&Tier::CloseFriend));
    }

    #[test]
    fn test_corrupted_score_is_clamped() {
        let mut store = MemoryStore::new();
        store
            .save_raw(
                keys::RELATIONSHIP,
                r#"{"score": 250, "previous_tier": "new", "milestones_reached": []}"#,
            )
            .unwrap();
        let tracker = RelationshipTracker::load(store).unwrap();
        assert_eq!(tracker.score(), 100);
        assert_eq!(tracker.state().previous_tier, Tier::Soulmate);

        let mut store = MemoryStore::new();
        store
            .save_raw(
                keys::RELATIONSHIP,
                r#"{"score": -7, "previous_tier": "lover", "milestones_reached": ["new"]}"#,
            )
            .unwrap();
        let mut tracker = RelationshipTracker::load(store).unwrap();
        assert_eq!(tracker.score(), 0);
        assert!(!tracker.apply_delta(1).unwrap().tier_changed);
    }

    #[test]
    fn test_missing_character_is_noop() {
        let mut tracker = tracker();
        let entry = tracker
            .evaluate_for_diary(&Message::user("anh yêu em mãi mãi"), None, None)
            .unwrap();
        assert!(entry.is_none());
        assert_eq!(tracker.state().message_count, 0);
    }

    #[test]
    fn test_keyword_entry() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");
        // consume the first-of-day slot
        tracker
            .evaluate_for_diary(&user_at("chào", at(2026, 5, 1, 8)), None, Some(&character))
            .unwrap();

        let entry = tracker
            .evaluate_for_diary(
                &user_at("Mình sẽ nhớ kỷ niệm này", at(2026, 5, 1, 9)),
                None,
                Some(&character),
            )
            .unwrap()
            .unwrap();
        assert_eq!(entry.category, DiaryCategory::KeywordTriggered);
    }

    #[test]
    fn test_first_message_of_day_once() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");

        let first = tracker
            .evaluate_for_diary(&user_at("chào buổi sáng", at(2026, 5, 1, 7)), None, Some(&character))
            .unwrap()
            .unwrap();
        assert_eq!(first.category, DiaryCategory::Milestone);
        assert_eq!(first.title, "First message of the day");

        let second = tracker
            .evaluate_for_diary(&user_at("ăn sáng chưa", at(2026, 5, 1, 23)), None, Some(&character))
            .unwrap();
        assert!(second.is_none());

        let next_day = tracker
            .evaluate_for_diary(&user_at("ngủ ngon", at(2026, 5, 2, 0)), None, Some(&character))
            .unwrap()
            .unwrap();
        assert_eq!(next_day.title, "First message of the day");
    }

    #[test]
    fn test_calendar_date_uses_offset() {
        let character = CharacterProfile::new("Linh");
        let mut tracker = tracker().with_utc_offset(FixedOffset::east_opt(7 * 3600).unwrap());

        // 18:00 UTC on May 1 is already May 2 in UTC+7
        tracker
            .evaluate_for_diary(&user_at("tối rồi", at(2026, 5, 1, 18)), None, Some(&character))
            .unwrap();
        let entry = tracker
            .evaluate_for_diary(&user_at("sáng rồi", at(2026, 5, 2, 1)), None, Some(&character))
            .unwrap();
        assert!(entry.is_none());
    }

    #[test]
    fn test_message_count_interval() {
        let mut tracker = tracker().with_milestone_interval(3);
        let character = CharacterProfile::new("Linh");
        let when = at(2026, 6, 1, 10);

        let results: Vec<_> = (0..3)
            .map(|_| {
                tracker
                    .evaluate_for_diary(&user_at("ừ", when), None, Some(&character))
                    .unwrap()
            })
            .collect();

        assert!(results[0].is_some()); // first of day
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().unwrap().title, "3 messages together");
    }

    #[test]
    fn test_tier_milestone_entry() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");
        let when = at(2026, 6, 1, 10);
        tracker
            .evaluate_for_diary(&user_at("hello", when), None, Some(&character))
            .unwrap();

        let milestone = Milestone { tier: Tier::Friend };
        let entry = tracker
            .evaluate_for_diary(&user_at("hi again", when), Some(&milestone), Some(&character))
            .unwrap()
            .unwrap();
        assert_eq!(entry.category, DiaryCategory::Milestone);
        assert!(entry.title.contains(Tier::Friend.label()));
    }

    #[test]
    fn test_one_entry_per_call() {
        let mut tracker = tracker().with_milestone_interval(1);
        let character = CharacterProfile::new("Linh");
        let milestone = Milestone { tier: Tier::Lover };

        // keyword, first of day, interval and milestone all apply; keyword wins
        let entry = tracker
            .evaluate_for_diary(
                &user_at("yêu nhau mãi mãi", at(2026, 6, 1, 10)),
                Some(&milestone),
                Some(&character),
            )
            .unwrap()
            .unwrap();
        assert_eq!(entry.category, DiaryCategory::KeywordTriggered);
    }

    #[test]
    fn test_special_date_once_per_day() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");
        let valentine = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();

        let event = tracker.check_special_date(valentine, &character).unwrap().unwrap();
        assert_eq!(event.event_id, "valentine");
        assert_eq!(event.category, DiaryCategory::SpecialEvent);

        assert!(tracker.check_special_date(valentine, &character).unwrap().is_none());
        assert!(tracker.check_special_date(valentine, &character).unwrap().is_none());

        let next_year = NaiveDate::from_ymd_opt(2027, 2, 14).unwrap();
        assert!(tracker.check_special_date(next_year, &character).unwrap().is_some());
    }

    #[test]
    fn test_special_date_survives_restart() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");
        let christmas = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        tracker.check_special_date(christmas, &character).unwrap();

        let mut reloaded = RelationshipTracker::load(tracker.into_store()).unwrap();
        assert!(reloaded.check_special_date(christmas, &character).unwrap().is_none());
    }

    #[test]
    fn test_coinciding_events_fire_in_turn() {
        let mut tracker = tracker();
        let birthday = NaiveDate::from_ymd_opt(2001, 12, 25).unwrap();
        let character = CharacterProfile::new("Noel").with_birthday(birthday);
        let christmas = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();

        let first = tracker.check_special_date(christmas, &character).unwrap().unwrap();
        let second = tracker.check_special_date(christmas, &character).unwrap().unwrap();
        assert_eq!(first.category, DiaryCategory::Birthday);
        assert_eq!(second.event_id, "christmas");
        assert!(tracker.check_special_date(christmas, &character).unwrap().is_none());
    }

    #[test]
    fn test_inactivity_reminder() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");

        // nothing to remind about before any user message
        assert!(tracker.check_inactivity(at(2026, 6, 1, 0), &character).unwrap().is_none());

        tracker
            .evaluate_for_diary(&user_at("bye", at(2026, 6, 1, 8)), None, Some(&character))
            .unwrap();

        assert!(tracker.check_inactivity(at(2026, 6, 1, 20), &character).unwrap().is_none());

        let reminder = tracker.check_inactivity(at(2026, 6, 2, 9), &character).unwrap().unwrap();
        assert_eq!(reminder.sender, Sender::Companion);
        assert!(reminder.content.starts_with("Linh"));

        // only once per silence
        assert!(tracker.check_inactivity(at(2026, 6, 3, 9), &character).unwrap().is_none());

        // re-armed by a new user message
        tracker
            .evaluate_for_diary(&user_at("back", at(2026, 6, 3, 10)), None, Some(&character))
            .unwrap();
        assert!(tracker.check_inactivity(at(2026, 6, 4, 11), &character).unwrap().is_some());
    }

    #[test]
    fn test_reminder_disabled() {
        let mut tracker = tracker().with_reminder_after(None);
        let character = CharacterProfile::new("Linh");
        tracker
            .evaluate_for_diary(&user_at("bye", at(2026, 6, 1, 8)), None, Some(&character))
            .unwrap();
        assert!(tracker.check_inactivity(at(2026, 7, 1, 8), &character).unwrap().is_none());
    }

    #[test]
    fn test_reset() {
        let mut tracker = tracker();
        let character = CharacterProfile::new("Linh");
        tracker.apply_delta(60).unwrap();
        tracker.check_milestone(Tier::Lover).unwrap();
        let valentine = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        tracker.check_special_date(valentine, &character).unwrap();

        tracker.reset().unwrap();
        assert_eq!(tracker.score(), 0);
        assert_eq!(tracker.state(), &RelationshipState::default());
        assert!(tracker.check_special_date(valentine, &character).unwrap().is_some());
    }
}
