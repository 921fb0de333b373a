use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::core::diary::DiaryCategory;
use crate::core::profile::CharacterProfile;
use crate::core::tier::Tier;

/// Fixed yearly holidays: (month, day, event id, display name)
const HOLIDAYS: &[(u32, u32, &str, &str)] = &[
    (2, 14, "valentine", "Valentine's Day"),
    (12, 24, "christmas_eve", "Christmas Eve"),
    (12, 25, "christmas", "Christmas"),
    (12, 31, "new_years_eve", "New Year's Eve"),
    (1, 1, "new_year", "New Year"),
];

pub const BIRTHDAY_EVENT_ID: &str = "birthday";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccasionKind {
    Holiday,
    Birthday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialOccasion {
    pub event_id: &'static str,
    pub name: String,
    pub kind: OccasionKind,
}

impl SpecialOccasion {
    pub fn diary_category(&self) -> DiaryCategory {
        match self.kind {
            OccasionKind::Holiday => DiaryCategory::SpecialEvent,
            OccasionKind::Birthday => DiaryCategory::Birthday,
        }
    }

    /// Scripted companion message for the occasion
    pub fn greeting(&self, character: &CharacterProfile, tier: Tier) -> String {
        let close = tier >= Tier::Lover;
        match (self.event_id, close) {
            (BIRTHDAY_EVENT_ID, true) => format!(
                "Hôm nay là sinh nhật của {} đó! Ở bên anh là món quà tuyệt nhất rồi 🎂💕",
                character.name
            ),
            (BIRTHDAY_EVENT_ID, false) => format!(
                "Hôm nay là sinh nhật của {} nè! Cảm ơn vì đã nhớ đến mình 🎂",
                character.name
            ),
            ("valentine", true) => "Valentine vui vẻ nha, người thương của em 💝".to_string(),
            ("valentine", false) => "Chúc bạn một ngày Valentine thật ấm áp 🌹".to_string(),
            ("christmas_eve", _) => "Đêm Giáng sinh an lành nhé! 🎄".to_string(),
            ("christmas", true) => "Giáng sinh vui vẻ! Mong năm nào cũng được đón Noel cùng anh 🎅❤️".to_string(),
            ("christmas", false) => "Giáng sinh vui vẻ nha! 🎅".to_string(),
            ("new_years_eve", _) => "Đêm giao thừa rồi, cùng đếm ngược nhé! 🎆".to_string(),
            ("new_year", true) => "Chúc mừng năm mới! Năm nay mình vẫn bên nhau nhé 🎉💕".to_string(),
            _ => format!("Chúc mừng {}! 🎉", self.name),
        }
    }
}

/// Occasions falling on `date`; the birthday comes first when it coincides with a holiday
pub fn occasions_on(date: NaiveDate, character: &CharacterProfile) -> Vec<SpecialOccasion> {
    let mut occasions = Vec::new();

    if let Some((month, day)) = character.birthday_month_day() {
        if is_birthday(date, month, day) {
            occasions.push(SpecialOccasion {
                event_id: BIRTHDAY_EVENT_ID,
                name: format!("{}'s birthday", character.name),
                kind: OccasionKind::Birthday,
            });
        }
    }

    occasions.extend(
        HOLIDAYS
            .iter()
            .filter(|(m, d, _, _)| date.month() == *m && date.day() == *d)
            .map(|(_, _, id, name)| SpecialOccasion {
                event_id: *id,
                name: name.to_string(),
                kind: OccasionKind::Holiday,
            }),
    );

    occasions
}

/// Feb 29 birthdays are celebrated on Feb 28 in non-leap years
fn is_birthday(date: NaiveDate, month: u32, day: u32) -> bool {
    if date.month() == month && date.day() == day {
        return true;
    }
    month == 2 && day == 29 && date.month() == 2 && date.day() == 28 && !is_leap_year(date.year())
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}
