//! Cell lock policy.
//!
//! A log cell is locked when its date is a Sunday, when its text marks a
//! leave day, or when an owner has coloured its text red in the sheet.

use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

use crate::sheet::TextColor;

/// Label written into leave cells by the auto-fill pass.
pub const LEAVE_LABEL: &str = "Leave";
/// Label written into blank Sunday cells by the auto-fill pass.
pub const SUNDAY_LABEL: &str = "Sunday";

/// True iff the trimmed, lowercased text is exactly `leave`.
pub fn is_leave(text: &str) -> bool {
    text.trim().to_lowercase() == "leave"
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// Owner lock marker: strong red text (red >= 0.8, green and blue < 0.3).
pub fn is_owner_red(color: &TextColor) -> bool {
    color.red >= 0.8 && color.green < 0.3 && color.blue < 0.3
}

/// Why a cell is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockReason {
    #[default]
    None,
    SundayOrLeave,
    OwnerRedLock,
}

impl LockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockReason::None => "",
            LockReason::SundayOrLeave => "Sunday/Leave",
            LockReason::OwnerRedLock => "Locked by owner (red text)",
        }
    }
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock decision for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStatus {
    pub locked: bool,
    pub reason: LockReason,
}

impl LockStatus {
    /// Combine the three lock signals for one cell.
    ///
    /// `red` is whether the cell's effective text colour passes
    /// [`is_owner_red`]. The red `Sunday` label the auto-fill pass writes on a
    /// Sunday column counts as a standard lock, not an owner lock.
    pub fn evaluate(text: &str, date: NaiveDate, red: bool) -> Self {
        let sunday = is_sunday(date);
        let standard = is_leave(text) || sunday;
        let auto_label = sunday && text.trim() == SUNDAY_LABEL;
        let owner = red && !auto_label;

        let reason = if owner {
            LockReason::OwnerRedLock
        } else if standard {
            LockReason::SundayOrLeave
        } else {
            LockReason::None
        };

        LockStatus {
            locked: standard || red,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const THURSDAY: (i32, u32, u32) = (2025, 8, 7);
    const SUNDAY: (i32, u32, u32) = (2025, 8, 10);

    #[test]
    fn leave_detection() {
        assert!(is_leave("leave"));
        assert!(is_leave("  LEAVE \n"));
        assert!(is_leave("Leave"));
        assert!(!is_leave("on leave"));
        assert!(!is_leave("leaves"));
        assert!(!is_leave(""));
    }

    #[test]
    fn sunday_detection() {
        assert!(is_sunday(ymd(2025, 8, 10)));
        assert!(!is_sunday(ymd(2025, 8, 11)));
        assert!(!is_sunday(ymd(2025, 8, 9)));
    }

    #[test]
    fn red_threshold() {
        assert!(is_owner_red(&TextColor::RED));
        assert!(is_owner_red(&TextColor::new(0.8, 0.29, 0.0)));
        assert!(!is_owner_red(&TextColor::new(0.79, 0.0, 0.0)));
        assert!(!is_owner_red(&TextColor::new(1.0, 0.3, 0.0)));
        assert!(!is_owner_red(&TextColor::new(1.0, 0.0, 0.5)));
        assert!(!is_owner_red(&TextColor::default()));
    }

    #[test]
    fn plain_weekday_is_unlocked() {
        let (y, m, d) = THURSDAY;
        let status = LockStatus::evaluate("Fixed server", ymd(y, m, d), false);
        assert!(!status.locked);
        assert_eq!(status.reason, LockReason::None);
        assert_eq!(status.reason.as_str(), "");
    }

    #[test]
    fn leave_and_sunday_are_standard_locks() {
        let (y, m, d) = THURSDAY;
        let leave = LockStatus::evaluate("leave", ymd(y, m, d), false);
        assert!(leave.locked);
        assert_eq!(leave.reason.to_string(), "Sunday/Leave");

        let (y, m, d) = SUNDAY;
        let sunday = LockStatus::evaluate("", ymd(y, m, d), false);
        assert!(sunday.locked);
        assert_eq!(sunday.reason, LockReason::SundayOrLeave);
    }

    #[test]
    fn owner_reason_wins_over_leave() {
        let (y, m, d) = THURSDAY;
        let status = LockStatus::evaluate("Leave", ymd(y, m, d), true);
        assert!(status.locked);
        assert_eq!(status.reason.to_string(), "Locked by owner (red text)");
    }

    #[test]
    fn red_alone_locks() {
        let (y, m, d) = THURSDAY;
        let status = LockStatus::evaluate("Deployed", ymd(y, m, d), true);
        assert!(status.locked);
        assert_eq!(status.reason, LockReason::OwnerRedLock);
    }

    #[test]
    fn auto_filled_sunday_label_is_not_an_owner_lock() {
        let (y, m, d) = SUNDAY;
        let status = LockStatus::evaluate("Sunday", ymd(y, m, d), true);
        assert!(status.locked);
        assert_eq!(status.reason, LockReason::SundayOrLeave);

        // Any other red text on a Sunday is still the owner's
        let status = LockStatus::evaluate("Overtime", ymd(y, m, d), true);
        assert_eq!(status.reason, LockReason::OwnerRedLock);
    }
}
