pub mod calendar;
pub mod classifier;
pub mod diary;
pub mod error;
pub mod history;
pub mod message;
pub mod profile;
pub mod relationship;
pub mod store;
pub mod tier;

pub use classifier::{detect_emotion, Classification, Emotion, MessageClassifier};
pub use diary::{Diary, DiaryCategory, DiaryEntry};
pub use error::{CompanionError, Result};
pub use history::ChatHistory;
pub use message::{Attachment, AttachmentKind, Message, Sender};
pub use profile::CharacterProfile;
pub use relationship::{Milestone, RelationshipState, RelationshipTracker, ScoreChange, SpecialDateEvent};
pub use store::{MemoryStore, PersistenceStore, SqliteStore};
pub use tier::Tier;
