use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::core::message::{Message, Sender};

/// Participation credit for any non-empty user message
pub const BASE_DELTA: i32 = 1;

/// Fixed delta when a negative keyword is present
pub const NEGATIVE_DELTA: i32 = -2;

/// Fixed delta for a whole-message declaration of love
pub const DECLARATION_BONUS: i32 = 8;

/// Positive keywords in priority order (first match wins, weights never stack).
/// Ordered by descending weight so the first match is also the heaviest.
const POSITIVE_KEYWORDS: &[(&str, i32)] = &[
    ("yêu", 5),
    ("love", 5),
    ("thương", 4),
    ("nhớ", 3),
    ("thích", 3),
    ("miss you", 3),
    ("cảm ơn", 2),
    ("hạnh phúc", 2),
    ("thank", 2),
    ("tuyệt", 2),
    ("vui", 1),
    ("hay quá", 1),
    ("đẹp", 1),
    ("haha", 1),
    ("great", 1),
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "ghét",
    "chán",
    "bực",
    "chia tay",
    "giận",
    "phiền",
    "i hate",
    "hate you",
    "boring",
    "annoying",
    "leave me alone",
];

/// Whole-message declarations, compared after normalisation
const DECLARATIONS: &[&str] = &[
    "anh yêu em",
    "em yêu anh",
    "tớ yêu cậu",
    "mình yêu bạn",
    "i love you",
    "love you",
];

/// Detected emotion of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Love,
    Neutral,
}

impl Emotion {
    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Surprised => "😮",
            Emotion::Love => "🥰",
            Emotion::Neutral => "🙂",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Emotion::Happy => write!(f, "happy"),
            Emotion::Sad => write!(f, "sad"),
            Emotion::Angry => write!(f, "angry"),
            Emotion::Surprised => write!(f, "surprised"),
            Emotion::Love => write!(f, "love"),
            Emotion::Neutral => write!(f, "neutral"),
        }
    }
}

/// Emotion keyword tables. The declaration order is also the tie-break order.
const EMOTION_KEYWORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Love,
        &["yêu", "thương", "love", "nhớ", "miss you", "❤", "💕", "😘", "🥰"],
    ),
    (
        Emotion::Happy,
        &["vui", "hạnh phúc", "haha", "hihi", "cười", "tuyệt", "happy", "great", "😊", "😄"],
    ),
    (
        Emotion::Sad,
        &["buồn", "khóc", "cô đơn", "mệt", "sad", "lonely", "😢", "😭"],
    ),
    (
        Emotion::Angry,
        &["giận", "bực", "ghét", "tức", "angry", "hate", "😠", "😡"],
    ),
    (
        Emotion::Surprised,
        &["bất ngờ", "ngạc nhiên", "thật sao", "wow", "omg", "😮", "😲"],
    ),
];

/// Result of classifying one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub delta: i32,
    pub emotion: Emotion,
}

/// Deterministic keyword classifier for intimacy deltas and emotions
#[derive(Debug, Clone, Default)]
pub struct MessageClassifier {
    score_companion_messages: bool,
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also score messages written by the companion
    pub fn with_companion_scoring(mut self, enabled: bool) -> Self {
        self.score_companion_messages = enabled;
        self
    }

    pub fn classify(&self, message: &Message) -> Classification {
        let is_user = message.sender == Sender::User;
        Classification {
            delta: self.score_intimacy(&message.content, is_user),
            emotion: detect_emotion(&message.content),
        }
    }

    /// Intimacy delta for one message.
    ///
    /// Precedence: declaration phrase, then any negative keyword, then the
    /// base credit plus the single highest-priority positive keyword.
    pub fn score_intimacy(&self, text: &str, is_user_message: bool) -> i32 {
        if !is_user_message && !self.score_companion_messages {
            return 0;
        }

        let text = normalize(text);
        if text.trim().is_empty() {
            return 0;
        }

        let bare = strip_trailing(&text);
        if DECLARATIONS.iter().any(|d| bare == *d) {
            debug!(delta = DECLARATION_BONUS, "declaration matched");
            return DECLARATION_BONUS;
        }

        if let Some(keyword) = NEGATIVE_KEYWORDS.iter().find(|k| text.contains(*k)) {
            debug!(keyword, delta = NEGATIVE_DELTA, "negative keyword matched");
            return NEGATIVE_DELTA;
        }

        let bonus = POSITIVE_KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(keyword, weight)| {
                debug!(keyword, weight, "positive keyword matched");
                *weight
            })
            .unwrap_or(0);

        BASE_DELTA + bonus
    }
}

/// Emotion with the most keyword hits; ties go to the earlier category.
pub fn detect_emotion(text: &str) -> Emotion {
    let text = normalize(text);
    if text.trim().is_empty() {
        return Emotion::Neutral;
    }

    let mut best = Emotion::Neutral;
    let mut best_hits = 0usize;

    for (emotion, keywords) in EMOTION_KEYWORDS {
        let hits: usize = keywords.iter().map(|k| text.matches(k).count()).sum();
        if hits > best_hits {
            best = *emotion;
            best_hits = hits;
        }
    }

    best
}

/// NFC-normalise and lower-case so composed and decomposed Vietnamese match alike
pub(crate) fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

fn strip_trailing(text: &str) -> &str {
    text.trim().trim_end_matches(|c: char| {
        c.is_whitespace()
            || c.is_ascii_punctuation()
            || matches!(c, '…' | '❤' | '\u{fe0f}' | '💕' | '😘' | '🥰')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> i32 {
        MessageClassifier::new().score_intimacy(text, true)
    }

    #[test]
    fn test_empty_message_scores_zero() {
        assert_eq!(user(""), 0);
        assert_eq!(user("   \n"), 0);
        assert_eq!(detect_emotion(""), Emotion::Neutral);
    }

    #[test]
    fn test_base_credit() {
        assert_eq!(user("hôm nay trời mưa"), BASE_DELTA);
    }

    #[test]
    fn test_single_keyword() {
        assert_eq!(user("tôi nhớ bạn"), 4);
        assert_eq!(user("Cảm ơn nhé"), 3);
    }

    #[test]
    fn test_no_stacking() {
        // "yêu", "thương" and "nhớ" all match, only the first applies
        assert_eq!(user("yêu thương và nhớ nhung"), BASE_DELTA + 5);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(user("TÔI NHỚ BẠN"), 4);
        assert_eq!(user("Thank You"), 3);
    }

    #[test]
    fn test_decomposed_input_matches() {
        let decomposed: String = "tôi nhớ bạn".nfd().collect();
        assert_ne!(decomposed, "tôi nhớ bạn");
        assert_eq!(user(&decomposed), 4);
    }

    #[test]
    fn test_negative_precedence() {
        assert_eq!(user("Em ghét anh nhưng em yêu anh"), NEGATIVE_DELTA);
        assert_eq!(user("chán quá"), NEGATIVE_DELTA);
    }

    #[test]
    fn test_declaration_short_circuit() {
        assert_eq!(user("anh yêu em"), DECLARATION_BONUS);
        assert_eq!(user("Anh yêu em!!!"), DECLARATION_BONUS);
        assert_eq!(user("I love you ❤️"), DECLARATION_BONUS);
    }

    #[test]
    fn test_companion_messages_not_scored_by_default() {
        let classifier = MessageClassifier::new();
        assert_eq!(classifier.score_intimacy("em nhớ anh", false), 0);

        let classifier = MessageClassifier::new().with_companion_scoring(true);
        assert_eq!(classifier.score_intimacy("em nhớ anh", false), 4);
    }

    #[test]
    fn test_deterministic() {
        let classifier = MessageClassifier::new();
        let text = "hôm nay vui quá, cảm ơn anh";
        assert_eq!(
            classifier.score_intimacy(text, true),
            classifier.score_intimacy(text, true)
        );
    }

    #[test]
    fn test_detect_emotion() {
        assert_eq!(detect_emotion("hôm nay vui quá haha"), Emotion::Happy);
        assert_eq!(detect_emotion("em buồn và cô đơn"), Emotion::Sad);
        assert_eq!(detect_emotion("tức thật, bực mình"), Emotion::Angry);
        assert_eq!(detect_emotion("Wow, thật sao?"), Emotion::Surprised);
        assert_eq!(detect_emotion("anh yêu em"), Emotion::Love);
        assert_eq!(detect_emotion("đi ăn cơm chưa"), Emotion::Neutral);
    }

    #[test]
    fn test_emotion_most_hits_wins() {
        // one love hit, two sad hits
        assert_eq!(detect_emotion("nhớ anh, buồn lắm, muốn khóc"), Emotion::Sad);
    }

    #[test]
    fn test_emotion_tie_break() {
        // one love hit and one happy hit: love is declared first
        assert_eq!(detect_emotion("yêu và vui"), Emotion::Love);
        // one sad hit and one angry hit
        assert_eq!(detect_emotion("buồn và giận"), Emotion::Sad);
    }

    #[test]
    fn test_classify_message() {
        let classifier = MessageClassifier::new();
        let result = classifier.classify(&Message::user("tôi nhớ bạn"));
        assert_eq!(result.delta, 4);
        assert_eq!(result.emotion, Emotion::Love);

        let result = classifier.classify(&Message::companion("em vui lắm"));
        assert_eq!(result.delta, 0);
        assert_eq!(result.emotion, Emotion::Happy);
    }
}
