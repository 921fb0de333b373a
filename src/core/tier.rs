use serde::{Deserialize, Serialize};

/// Highest possible intimacy score
pub const MAX_SCORE: u8 = 100;

/// Relationship tier, a named bucket of the intimacy score.
///
/// Variants are declared in ascending threshold order, so the derived
/// `Ord` matches the score ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    New,
    Friend,
    CloseFriend,
    Lover,
    Soulmate,
}

/// Lower bound of every tier. The first entry starts at 0 and the bounds are
/// strictly increasing, which makes the table total over `[0, MAX_SCORE]`.
const THRESHOLDS: [(u8, Tier); 5] = [
    (0, Tier::New),
    (10, Tier::Friend),
    (30, Tier::CloseFriend),
    (50, Tier::Lover),
    (80, Tier::Soulmate),
];

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::New,
        Tier::Friend,
        Tier::CloseFriend,
        Tier::Lover,
        Tier::Soulmate,
    ];

    /// Tier for a score. Scores above `MAX_SCORE` map to the top tier.
    pub fn from_score(score: u8) -> Tier {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(min, _)| score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::New)
    }

    /// Inclusive score range covered by this tier
    pub fn range(&self) -> (u8, u8) {
        let idx = THRESHOLDS
            .iter()
            .position(|(_, t)| t == self)
            .unwrap_or(0);
        let min = THRESHOLDS[idx].0;
        let max = THRESHOLDS
            .get(idx + 1)
            .map(|(next, _)| next - 1)
            .unwrap_or(MAX_SCORE);
        (min, max)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::New => "Mới quen",
            Tier::Friend => "Bạn bè",
            Tier::CloseFriend => "Bạn thân",
            Tier::Lover => "Người yêu",
            Tier::Soulmate => "Tri kỷ",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Tier::New => "🌱",
            Tier::Friend => "🤝",
            Tier::CloseFriend => "💛",
            Tier::Lover => "💕",
            Tier::Soulmate => "💞",
        }
    }

    /// Tone descriptor spliced into the chat prompt
    pub fn tone(&self) -> &'static str {
        match self {
            Tier::New => {
                "You have only just met the user. Be polite, a little shy and curious; keep some distance."
            }
            Tier::Friend => {
                "You are friends with the user. Be warm, relaxed and playful, and share small things about your day."
            }
            Tier::CloseFriend => {
                "You are close friends. Be caring and open, remember details the user shares, tease gently."
            }
            Tier::Lover => {
                "You are in a romantic relationship with the user. Be affectionate and tender, use sweet pet names."
            }
            Tier::Soulmate => {
                "You and the user are soulmates. Be deeply affectionate and devoted, speak with complete trust and intimacy."
            }
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::New => write!(f, "new"),
            Tier::Friend => write!(f, "friend"),
            Tier::CloseFriend => write!(f, "close_friend"),
            Tier::Lover => write!(f, "lover"),
            Tier::Soulmate => write!(f, "soulmate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Tier::from_score(0), Tier::New);
        assert_eq!(Tier::from_score(9), Tier::New);
        assert_eq!(Tier::from_score(10), Tier::Friend);
        assert_eq!(Tier::from_score(29), Tier::Friend);
        assert_eq!(Tier::from_score(30), Tier::CloseFriend);
        assert_eq!(Tier::from_score(49), Tier::CloseFriend);
        assert_eq!(Tier::from_score(50), Tier::Lover);
        assert_eq!(Tier::from_score(79), Tier::Lover);
        assert_eq!(Tier::from_score(80), Tier::Soulmate);
        assert_eq!(Tier::from_score(100), Tier::Soulmate);
    }

    #[test]
    fn test_table_is_total_and_disjoint() {
        for score in 0..=MAX_SCORE {
            let owners: Vec<Tier> = Tier::ALL
                .iter()
                .copied()
                .filter(|t| {
                    let (min, max) = t.range();
                    score >= min && score <= max
                })
                .collect();
            assert_eq!(owners, vec![Tier::from_score(score)], "score {}", score);
        }
    }

    #[test]
    fn test_deterministic() {
        for score in 0..=MAX_SCORE {
            assert_eq!(Tier::from_score(score), Tier::from_score(score));
        }
    }

    #[test]
    fn test_monotonic() {
        let mut last = Tier::New;
        for score in 0..=MAX_SCORE {
            let tier = Tier::from_score(score);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_ranges() {
        assert_eq!(Tier::New.range(), (0, 9));
        assert_eq!(Tier::Lover.range(), (50, 79));
        assert_eq!(Tier::Soulmate.range(), (80, 100));
    }
}
