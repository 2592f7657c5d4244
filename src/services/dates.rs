// src/services/dates.rs

//! Effective-date inference from the first lines of a menu.
//!
//! Each line is tried against an ordered table of [`DateRule`]s. A rule that
//! matches yields a candidate; the candidate is kept only if it forms a real
//! calendar date within the acceptance window around `today`. Rejected
//! candidates do not stop the scan: the next rule, then the next line, is
//! tried.
//!
//! `today` is always passed in, never read from the clock here.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

use crate::models::InferredDate;

/// Years below this are counted from the Minguo epoch.
const MINGUO_CUTOFF: i32 = 1000;
/// Offset from a Minguo year to the Gregorian year.
const MINGUO_OFFSET: i32 = 1911;
/// Default acceptance window, in days either side of today.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

const WEEKDAY: &str = r"(?:星期|週|周|禮拜)[一二三四五六日天]";

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// One date pattern.
///
/// Patterns capture `date` (the span reported back), `y`, `m`, `d` and
/// optionally `wd`. `m` may be a number or an English month name.
#[derive(Debug)]
pub struct DateRule {
    pub name: &'static str,
    regex: Regex,
    /// False when the pattern carries no year and today's year is used
    has_year: bool,
}

/// Raw fields pulled out of a line before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    year: i32,
    month: u32,
    day: u32,
    matched: String,
    weekday: Option<String>,
}

impl DateRule {
    fn new(name: &'static str, pattern: &str, has_year: bool) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(regex) => Some(Self {
                name,
                regex,
                has_year,
            }),
            Err(e) => {
                log::error!("Date rule '{}' has an invalid pattern: {}", name, e);
                None
            }
        }
    }

    /// Extract a candidate from the first match in `line`.
    fn candidate(&self, line: &str, today: NaiveDate) -> Option<Candidate> {
        let caps = self.regex.captures(line)?;

        let year = if self.has_year {
            normalize_year(caps.name("y")?.as_str().parse().ok()?)
        } else {
            today.year()
        };
        let month_text = caps.name("m")?.as_str();
        let month = month_text
            .parse()
            .ok()
            .or_else(|| month_from_name(month_text))?;
        let day = caps.name("d")?.as_str().parse().ok()?;

        Some(Candidate {
            year,
            month,
            day,
            matched: caps.name("date")?.as_str().trim().to_string(),
            weekday: caps.name("wd").map(|m| m.as_str().to_string()),
        })
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix = name.chars().take(3).collect::<String>().to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// Convert a Minguo (ROC) year to Gregorian. Years of 1000 and up pass through.
pub fn normalize_year(year: i32) -> i32 {
    if year < MINGUO_CUTOFF {
        year + MINGUO_OFFSET
    } else {
        year
    }
}

fn build_rules() -> Vec<DateRule> {
    let weekday = format!(r"(?:\s*[（(]?\s*(?P<wd>{WEEKDAY})[)）]?)");

    [
        DateRule::new(
            "cjk_full",
            &format!(
                r"(?P<date>(?P<y>\d{{4}})\s*年\s*(?P<m>\d{{1,2}})\s*月\s*(?P<d>\d{{1,2}})\s*日{weekday}?)"
            ),
            true,
        ),
        DateRule::new(
            "numeric_ymd",
            &format!(r"(?P<date>(?P<y>\d{{4}})[/\-](?P<m>\d{{1,2}})[/\-](?P<d>\d{{1,2}}){weekday}?)"),
            true,
        ),
        DateRule::new(
            "cjk_month_day_weekday",
            &format!(r"(?P<date>(?P<m>\d{{1,2}})\s*月\s*(?P<d>\d{{1,2}})\s*日{weekday})"),
            false,
        ),
        DateRule::new(
            "minguo_ymd",
            &format!(
                r"(?:^|\D)(?P<date>(?P<y>\d{{2,3}})(?:\s*年\s*|[/\-.])(?P<m>\d{{1,2}})(?:\s*月\s*|[/\-.])(?P<d>\d{{1,2}})(?:\s*日)?{weekday}?)"
            ),
            true,
        ),
        DateRule::new(
            "bare_month_day",
            r"(?:^|[^\d/\-])(?P<date>(?P<m>\d{1,2})-(?P<d>\d{1,2}))(?:[^\d/\-]|$)",
            false,
        ),
        DateRule::new(
            "month_name_day_year",
            r"(?i)\b(?P<date>(?P<m>January|February|March|April|May|June|July|August|September|October|November|December)\s+(?P<d>\d{1,2})(?:st|nd|rd|th)?,?\s+(?P<y>\d{4}))\b",
            true,
        ),
        DateRule::new(
            "day_month_abbr_year",
            r"(?i)\b(?P<date>(?P<d>\d{1,2})\s+(?P<m>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?,?\s+(?P<y>\d{4}))\b",
            true,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

static DATE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(build_rules);

/// The ordered date rule table.
pub fn date_rules() -> &'static [DateRule] {
    &DATE_RULES
}

/// Scans leading lines for the menu's effective date.
#[derive(Debug, Clone, Copy)]
pub struct DateInferencer {
    today: NaiveDate,
    window_days: i64,
}

impl DateInferencer {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_window(today, DEFAULT_WINDOW_DAYS)
    }

    pub fn with_window(today: NaiveDate, window_days: i64) -> Self {
        Self { today, window_days }
    }

    /// Return the first accepted date in `lines`, or `None`.
    ///
    /// Callers pass only the leading lines they want scanned.
    pub fn infer<S: AsRef<str>>(&self, lines: &[S]) -> Option<InferredDate> {
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            for rule in date_rules() {
                let Some(candidate) = rule.candidate(line, self.today) else {
                    continue;
                };
                log::debug!("Rule '{}' matched {:?}", rule.name, candidate.matched);
                if let Some(found) = self.accept(candidate) {
                    log::info!("Inferred date {} from {:?}", found.date, found.matched);
                    return Some(found);
                }
            }
        }
        log::info!("No date found in leading lines; falling back to today");
        None
    }

    /// Keep a candidate only if it is a real date inside the window.
    fn accept(&self, candidate: Candidate) -> Option<InferredDate> {
        let date = NaiveDate::from_ymd_opt(candidate.year, candidate.month, candidate.day)?;
        let distance = (date - self.today).num_days().abs();
        if distance > self.window_days {
            log::debug!("Rejected {} ({} days from {})", date, distance, self.today);
            return None;
        }
        Some(InferredDate {
            date,
            matched: candidate.matched,
            weekday: candidate.weekday,
        })
    }
}

/// Convenience wrapper using the default window.
pub fn infer_date<S: AsRef<str>>(lines: &[S], today: NaiveDate) -> Option<InferredDate> {
    DateInferencer::new(today).infer(lines)
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}

/// Render a date as `2024年7月9日 星期二`.
///
/// A weekday written in the source text takes precedence over the computed
/// one, so the label reads the way the menu does.
pub fn format_date_label(date: NaiveDate, source_weekday: Option<&str>) -> String {
    let weekday = source_weekday.unwrap_or_else(|| weekday_label(date.weekday()));
    format!(
        "{}年{}月{}日 {}",
        date.year(),
        date.month(),
        date.day(),
        weekday
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2024, 7, 15)
    }

    #[test]
    fn all_rules_compile_in_order() {
        let names: Vec<_> = date_rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "cjk_full",
                "numeric_ymd",
                "cjk_month_day_weekday",
                "minguo_ymd",
                "bare_month_day",
                "month_name_day_year",
                "day_month_abbr_year",
            ]
        );
    }

    #[test]
    fn full_cjk_date_with_weekday() {
        let found = infer_date(&["2024年7月9日 星期二"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 9));
        assert_eq!(found.weekday.as_deref(), Some("星期二"));
        assert_eq!(found.matched, "2024年7月9日 星期二");
    }

    #[test]
    fn full_cjk_date_relative_to_real_clock() {
        let now = chrono::Local::now().date_naive();
        let target = now - Duration::days(6);
        let line = format!(
            "{}年{}月{}日 星期二 午餐",
            target.year(),
            target.month(),
            target.day()
        );
        let found = infer_date(&[line], now).unwrap();
        assert_eq!(found.date, target);
        assert_eq!(found.weekday.as_deref(), Some("星期二"));
    }

    #[test]
    fn slash_date_with_short_weekday() {
        let found = infer_date(&["菜單 2024/7/12 (週五)"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 12));
        assert_eq!(found.weekday.as_deref(), Some("週五"));
    }

    #[test]
    fn dash_date_without_weekday() {
        let found = infer_date(&["2024-07-20"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 20));
        assert!(found.weekday.is_none());
    }

    #[test]
    fn month_day_with_weekday_uses_todays_year() {
        let found = infer_date(&["7月9日星期二 菜單"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 9));
        assert_eq!(found.weekday.as_deref(), Some("星期二"));
    }

    #[test]
    fn month_day_without_weekday_is_not_the_weekday_rule() {
        // Falls through to no rule at all: no dash, no year.
        assert!(infer_date(&["7月9日 午餐"], today()).is_none());
    }

    #[test]
    fn minguo_year_is_offset_by_1911() {
        let found = infer_date(&["113年7月9日"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 9));
        assert_eq!(found.matched, "113年7月9日");
    }

    #[test]
    fn minguo_year_with_slashes() {
        let found = infer_date(&["中央廚房 113/07/16 菜單"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 16));
    }

    #[test]
    fn normalize_year_only_touches_small_years() {
        assert_eq!(normalize_year(113), 2024);
        assert_eq!(normalize_year(99), 2010);
        assert_eq!(normalize_year(2024), 2024);
    }

    #[test]
    fn bare_month_day_pair() {
        let found = infer_date(&["週菜單 07-18"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 18));
        assert_eq!(found.matched, "07-18");
    }

    #[test]
    fn tail_of_stale_full_date_is_not_a_month_day_pair() {
        let today = ymd(2024, 7, 15);
        assert!(infer_date(&["2023-07-20"], today).is_none());
        assert!(infer_date(&["菜單 07-20-2023"], today).is_none());
    }

    #[test]
    fn western_month_name_first() {
        let found = infer_date(&["Menu for July 9, 2024"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 9));
    }

    #[test]
    fn western_day_month_abbreviation() {
        let found = infer_date(&["Week of 9 Jul 2024"], today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 9));
    }

    #[test]
    fn ninety_days_ago_is_rejected() {
        let old = today() - Duration::days(90);
        let line = format!("{}年{}月{}日", old.year(), old.month(), old.day());
        assert!(infer_date(&[line], today()).is_none());
    }

    #[test]
    fn window_is_inclusive_both_ways() {
        let inferencer = DateInferencer::new(today());
        assert!(inferencer.infer(&["2024/8/14"]).is_some());
        assert!(inferencer.infer(&["2024/6/15"]).is_some());
        assert!(inferencer.infer(&["2024/8/15"]).is_none());
    }

    #[test]
    fn rejected_candidate_continues_to_later_lines() {
        let lines = ["2023年1月1日 舊版", "", "2024年7月10日 星期三"];
        let found = infer_date(&lines, today()).unwrap();
        assert_eq!(found.date, ymd(2024, 7, 10));
    }

    #[test]
    fn impossible_date_is_rejected() {
        assert!(infer_date(&["2024年2月30日"], ymd(2024, 2, 20)).is_none());
    }

    #[test]
    fn no_dates_at_all() {
        assert!(infer_date(&["午餐", "白飯 紅燒肉"], today()).is_none());
    }

    #[test]
    fn label_uses_computed_weekday() {
        assert_eq!(format_date_label(ymd(2024, 7, 9), None), "2024年7月9日 星期二");
    }

    #[test]
    fn label_prefers_source_weekday() {
        assert_eq!(
            format_date_label(ymd(2024, 7, 9), Some("週二")),
            "2024年7月9日 週二"
        );
    }
}
