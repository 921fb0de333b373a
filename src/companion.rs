use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RelationshipConfig;
use crate::core::{
    CharacterProfile, ChatHistory, CompanionError, Diary, DiaryCategory, DiaryEntry, Emotion,
    Message, MessageClassifier, Milestone, PersistenceStore, RelationshipTracker, Result,
    ScoreChange, Sender, SpecialDateEvent, Tier,
};
use crate::core::store::keys;
use crate::transport::ChatTransport;

/// Shown when the chat backend fails, so the turn is never silently dropped
pub const FALLBACK_REPLY: &str =
    "Xin lỗi nha, mình đang hơi rối một chút... bạn nhắn lại sau ít phút được không? 🥺";

/// Everything the presentation layer needs to render one message
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub message: Message,
    pub delta: i32,
    pub emotion: Emotion,
    pub change: Option<ScoreChange>,
    pub milestone: Option<Milestone>,
    pub diary_entry: Option<DiaryEntry>,
    /// Companion line injected on a first-arrival level-up
    pub scripted_message: Option<Message>,
}

impl TurnOutcome {
    fn untracked(message: Message) -> Self {
        let emotion = crate::core::detect_emotion(&message.content);
        TurnOutcome {
            message,
            delta: 0,
            emotion,
            change: None,
            milestone: None,
            diary_entry: None,
            scripted_message: None,
        }
    }

    pub fn tier_changed(&self) -> bool {
        self.change.map_or(false, |c| c.tier_changed)
    }
}

/// One user → companion exchange
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub user: TurnOutcome,
    pub reply: TurnOutcome,
    /// True when the reply is the fallback apology
    pub fallback: bool,
}

/// Clock-driven events produced by `tick`
#[derive(Debug, Clone, Serialize)]
pub enum CompanionEvent {
    SpecialDate {
        event: SpecialDateEvent,
        diary_entry: DiaryEntry,
        message: Message,
    },
    Reminder {
        message: Message,
    },
}

/// The application session: one tracker, one diary, one history, one character.
pub struct Companion<S: PersistenceStore> {
    tracker: RelationshipTracker<S>,
    classifier: MessageClassifier,
    diary: Diary,
    history: ChatHistory,
    character: Option<CharacterProfile>,
    prompt_history_lines: usize,
}

impl<S: PersistenceStore> Companion<S> {
    pub fn open(store: S, config: &RelationshipConfig) -> Result<Self> {
        let diary = Diary::load(&store, config.diary_capacity)?;
        let history = ChatHistory::load(&store, config.history_capacity)?;
        let character: Option<CharacterProfile> = store.load(keys::CHARACTER)?;

        let tracker = RelationshipTracker::load(store)?
            .with_milestone_interval(config.milestone_interval)
            .with_reminder_after(config.reminder_after())
            .with_utc_offset(config.utc_offset());

        Ok(Companion {
            tracker,
            classifier: MessageClassifier::new()
                .with_companion_scoring(config.score_companion_messages),
            diary,
            history,
            character,
            prompt_history_lines: config.prompt_history_lines,
        })
    }

    pub fn character(&self) -> Option<&CharacterProfile> {
        self.character.as_ref()
    }

    pub fn tracker(&self) -> &RelationshipTracker<S> {
        &self.tracker
    }

    pub fn diary(&self) -> &Diary {
        &self.diary
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Re-read character, relationship, diary and history from the store.
    ///
    /// Call before writing when another handle on the same database (a `chat`
    /// next to a running `watch`) may have written since this session opened.
    pub fn reload(&mut self) -> Result<()> {
        self.tracker.reload()?;
        let store = self.tracker.store();
        self.character = store.load(keys::CHARACTER)?;
        self.diary = Diary::load(store, self.diary.capacity())?;
        self.history = ChatHistory::load(store, self.history.capacity())?;
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.tracker.into_store()
    }

    /// Start a new relationship with `profile`; any previous one is discarded
    pub fn create_character(&mut self, profile: CharacterProfile) -> Result<()> {
        self.clear_relationship()?;
        self.tracker.store_mut().save(keys::CHARACTER, &profile)?;
        info!(name = %profile.name, "character created");
        self.character = Some(profile);
        Ok(())
    }

    /// Edit the persona without touching the relationship
    pub fn update_character(&mut self, profile: CharacterProfile) -> Result<()> {
        if self.character.is_none() {
            return Err(CompanionError::NoCharacter);
        }
        self.tracker.store_mut().save(keys::CHARACTER, &profile)?;
        self.character = Some(profile);
        Ok(())
    }

    pub fn delete_character(&mut self) -> Result<()> {
        self.clear_relationship()?;
        self.tracker.store_mut().remove(keys::CHARACTER)?;
        if let Some(old) = self.character.take() {
            info!(name = %old.name, "character deleted");
        }
        Ok(())
    }

    fn clear_relationship(&mut self) -> Result<()> {
        self.tracker.reset()?;
        let store = self.tracker.store_mut();
        self.diary.clear(store)?;
        self.history.clear(store)?;
        Ok(())
    }

    pub fn record_user_message(&mut self, message: Message) -> Result<TurnOutcome> {
        debug_assert_eq!(message.sender, Sender::User);
        self.record(message)
    }

    pub fn record_companion_message(&mut self, message: Message) -> Result<TurnOutcome> {
        debug_assert_eq!(message.sender, Sender::Companion);
        self.record(message)
    }

    /// Classify, score, check milestones, maybe write the diary, log the message.
    fn record(&mut self, message: Message) -> Result<TurnOutcome> {
        let Some(character) = self.character.clone() else {
            debug!("no character, skipping relationship processing");
            return Ok(TurnOutcome::untracked(message));
        };

        let classification = self.classifier.classify(&message);

        let change = if classification.delta != 0 {
            Some(self.tracker.apply_delta(classification.delta)?)
        } else {
            None
        };

        let milestone = match change {
            Some(c) if c.is_level_up() => self.tracker.check_milestone(c.to_tier)?,
            _ => None,
        };

        let diary_entry =
            self.tracker
                .evaluate_for_diary(&message, milestone.as_ref(), Some(&character))?;
        if let Some(entry) = &diary_entry {
            self.diary.record(entry.clone(), self.tracker.store_mut())?;
        }

        self.history.push(message.clone(), self.tracker.store_mut())?;

        let scripted_message = milestone.map(|m| {
            Message::new(
                Sender::Companion,
                level_up_message(m.tier, &character.name),
                message.timestamp,
            )
        });
        if let Some(scripted) = &scripted_message {
            self.history.push(scripted.clone(), self.tracker.store_mut())?;
        }

        Ok(TurnOutcome {
            message,
            delta: classification.delta,
            emotion: classification.emotion,
            change,
            milestone,
            diary_entry,
            scripted_message,
        })
    }

    /// Send `text` to the companion and record both sides of the exchange.
    ///
    /// A failing transport yields the fallback apology instead of an error.
    pub async fn chat<T>(&mut self, transport: &T, text: &str) -> Result<ChatTurn>
    where
        T: ChatTransport + Sync + ?Sized,
    {
        self.send(transport, Message::new(Sender::User, text, Utc::now()))
            .await
    }

    /// Like `chat`, for a user message that may carry an attachment
    pub async fn send<T>(&mut self, transport: &T, message: Message) -> Result<ChatTurn>
    where
        T: ChatTransport + Sync + ?Sized,
    {
        self.reload()?;
        let character = self.character.clone().ok_or(CompanionError::NoCharacter)?;

        let prompt_text = match &message.attachment {
            Some(attachment) => format!(
                "{} ({} attached: {})",
                message.content, attachment.kind, attachment.file_name
            ),
            None => message.content.clone(),
        };

        let context = self.history.recent(self.prompt_history_lines).to_vec();
        let user = self.record_user_message(message)?;

        let prompt =
            transport.build_prompt(&character, &context, self.tracker.tier(), &prompt_text);
        let (reply_text, fallback) = match transport.complete(&prompt).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                warn!(error = %e, "chat completion failed, using fallback reply");
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        // other handles may have written while the completion was pending
        self.reload()?;
        let reply = self.record_companion_message(Message::new(
            Sender::Companion,
            reply_text,
            Utc::now(),
        ))?;

        Ok(ChatTurn {
            user,
            reply,
            fallback,
        })
    }

    /// Scheduled checks: special dates first, then the inactivity reminder
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<Vec<CompanionEvent>> {
        let mut events = self.check_special_dates(now)?;
        events.extend(self.check_reminder(now)?);
        Ok(events)
    }

    pub fn check_special_dates(&mut self, now: DateTime<Utc>) -> Result<Vec<CompanionEvent>> {
        self.reload()?;
        let Some(character) = self.character.clone() else {
            return Ok(Vec::new());
        };

        let today = self.tracker.local_date(now);
        let mut events = Vec::new();

        while let Some(event) = self.tracker.check_special_date(today, &character)? {
            let diary_entry = DiaryEntry::new(event.category, &event.name, &event.message, now);
            self.diary.record(diary_entry.clone(), self.tracker.store_mut())?;

            let message = Message::new(Sender::Companion, &event.message, now);
            self.history.push(message.clone(), self.tracker.store_mut())?;

            events.push(CompanionEvent::SpecialDate {
                event,
                diary_entry,
                message,
            });
        }

        Ok(events)
    }

    pub fn check_reminder(&mut self, now: DateTime<Utc>) -> Result<Vec<CompanionEvent>> {
        self.reload()?;
        let Some(character) = self.character.clone() else {
            return Ok(Vec::new());
        };

        match self.tracker.check_inactivity(now, &character)? {
            Some(message) => {
                self.history.push(message.clone(), self.tracker.store_mut())?;
                Ok(vec![CompanionEvent::Reminder { message }])
            }
            None => Ok(Vec::new()),
        }
    }

    /// User-written diary entry
    pub fn add_diary_entry(&mut self, title: &str, content: &str) -> Result<DiaryEntry> {
        let entry = DiaryEntry::new(DiaryCategory::Manual, title, content, Utc::now());
        self.diary.record(entry.clone(), self.tracker.store_mut())?;
        Ok(entry)
    }

    pub fn delete_diary_entry(&mut self, id: &str) -> Result<DiaryEntry> {
        self.diary.delete(id, self.tracker.store_mut())
    }
}

/// Companion line for the first arrival at a tier
pub fn level_up_message(tier: Tier, name: &str) -> String {
    match tier {
        Tier::New => format!("{}: Rất vui được làm quen với bạn!", name),
        Tier::Friend => format!(
            "{}: Nói chuyện với bạn vui ghê á, từ giờ mình là bạn bè nha! 🤝",
            name
        ),
        Tier::CloseFriend => format!(
            "{}: Bạn biết không, giờ bạn là người mình tin tưởng nhất đó. Bạn thân nha! 💛",
            name
        ),
        Tier::Lover => format!(
            "{}: Ừm... thật ra em thích anh lâu rồi. Mình yêu nhau nhé? 💕",
            name
        ),
        Tier::Soulmate => format!(
            "{}: Gặp được anh là điều tuyệt vời nhất đời em. Mãi bên nhau nhé 💞",
            name
        ),
    }
}

/// Terminal rendering helpers
pub struct CompanionFormatter;

impl CompanionFormatter {
    pub fn format_status<S: PersistenceStore>(companion: &Companion<S>) -> String {
        let Some(character) = companion.character() else {
            return "No character yet. Create one with `aicompanion character create`.".to_string();
        };

        let state = companion.tracker().state();
        let tier = state.tier();
        let (min, max) = tier.range();

        format!(
            "{} {}\n\
             Relationship: {} {} ({})\n\
             Intimacy: {} {}/100 (tier range {}-{})\n\
             Messages: {}\n\
             Diary entries: {}",
            tier.emoji(),
            character.name,
            tier.emoji(),
            tier.label(),
            tier,
            Self::format_intimacy_bar(state.score),
            state.score,
            min,
            max,
            state.message_count,
            companion.diary().len(),
        )
    }

    pub fn format_intimacy_bar(score: u8) -> String {
        let hearts = usize::from(score.min(100) / 10);
        format!("{}{}", "❤️".repeat(hearts), "🤍".repeat(10 - hearts))
    }

    pub fn format_diary_entry(entry: &DiaryEntry) -> String {
        format!(
            "[{}] {} ({})\n  {}\n  id: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.title,
            entry.category,
            entry.content,
            entry.id
        )
    }
}
