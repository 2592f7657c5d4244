// src/services/format.rs

//! Menu text formatting.
//!
//! Three passes, run in this order by [`format_text`]:
//!
//! 1. [`normalize_whitespace`]: line endings, odd whitespace, blank runs.
//! 2. [`mark_titles`]: wrap probable section titles in `**`.
//! 3. [`preserve_tables`]: normalize column gaps without reflowing rows.
//!
//! Every pass is idempotent and so is the composition. Lengths used by the
//! title heuristics ignore emphasis markers and collapse spacing, so neither
//! the title pass nor the table pass changes a later title decision.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::FormattedText;

/// Markup wrapped around detected titles.
pub const EMPHASIS: &str = "**";

/// Upper bound for a short title followed by a blank or longer line.
const SHORT_TITLE_CHARS: usize = 20;
/// Upper bound for a title that opens a block after a blank line.
const LEAD_TITLE_CHARS: usize = 25;
/// Minimum share of ideographs for a line to count as "mostly ideographic".
const IDEOGRAPH_RATIO: f32 = 0.8;

/// One structural title pattern.
pub struct TitleRule {
    pub name: &'static str,
    pattern: Option<Regex>,
    max_chars: usize,
    check: fn(&str) -> bool,
}

impl TitleRule {
    fn new(
        name: &'static str,
        pattern: Option<&str>,
        max_chars: usize,
        check: fn(&str) -> bool,
    ) -> Option<Self> {
        let pattern = match pattern.map(Regex::new).transpose() {
            Ok(p) => p,
            Err(e) => {
                log::error!("Title rule '{}' has an invalid pattern: {}", name, e);
                return None;
            }
        };
        Some(Self {
            name,
            pattern,
            max_chars,
            check,
        })
    }

    /// Test the trimmed line content.
    pub fn matches(&self, content: &str) -> bool {
        visible_len(content) <= self.max_chars
            && self.pattern.as_ref().is_none_or(|p| p.is_match(content))
            && (self.check)(content)
    }
}

fn any_line(_: &str) -> bool {
    true
}

fn build_title_rules() -> Vec<TitleRule> {
    [
        TitleRule::new(
            "date_prefixed",
            Some(r"^(?:\d{2,4}\s*[年/\-.]\s*\d{1,2}|\d{1,2}\s*月\s*\d{1,2}\s*日)"),
            40,
            any_line,
        ),
        TitleRule::new(
            "meal_keyword",
            Some(r"^(?:早餐|午餐|晚餐|早點心|午點心|點心|早點|午點|宵夜|下午茶)"),
            SHORT_TITLE_CHARS,
            any_line,
        ),
        TitleRule::new(
            "section_keyword",
            Some(r"^(?:本週菜單|週菜單|菜單|主食|主菜|副菜|配菜|湯品|水果|飲品|備註|附註|營養成分|熱量)"),
            SHORT_TITLE_CHARS,
            any_line,
        ),
        TitleRule::new("mostly_ideographic", None, 10, is_mostly_ideographic),
        TitleRule::new("uppercase_western", None, 30, is_uppercase_western),
        TitleRule::new(
            "enumerated",
            Some(
                r"^(?:\d{1,2}\s*[.、)）]|[（(]\s*(?:\d{1,2}|[一二三四五六七八九十]{1,3})\s*[)）]|[一二三四五六七八九十]{1,3}\s*[、.．]|[A-Z][.)])\s*[^\d\s]",
            ),
            40,
            any_line,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

static TITLE_RULES: LazyLock<Vec<TitleRule>> = LazyLock::new(build_title_rules);

/// The ordered title rule table.
pub fn title_rules() -> &'static [TitleRule] {
    &TITLE_RULES
}

/// CJK unified ideographs, extension A and compatibility ideographs.
pub fn is_ideograph(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

fn has_ideograph(s: &str) -> bool {
    s.chars().any(is_ideograph)
}

fn is_mostly_ideographic(s: &str) -> bool {
    let mut total = 0usize;
    let mut ideographs = 0usize;
    for c in s.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_ideograph(c) {
            ideographs += 1;
        }
    }
    total > 0 && ideographs as f32 / total as f32 >= IDEOGRAPH_RATIO
}

fn is_uppercase_western(s: &str) -> bool {
    let uppercase = s.chars().filter(|c| c.is_ascii_uppercase()).count();
    uppercase >= 2 && !s.chars().any(char::is_lowercase)
}

/// Character count with emphasis removed and spacing collapsed.
fn visible_len(s: &str) -> usize {
    s.replace(EMPHASIS, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .count()
}

fn has_consecutive_digits(s: &str) -> bool {
    let mut previous_digit = false;
    for c in s.chars() {
        let digit = c.is_ascii_digit();
        if digit && previous_digit {
            return true;
        }
        previous_digit = digit;
    }
    false
}

fn is_blank(line: Option<&str>) -> bool {
    line.is_none_or(|l| l.trim().is_empty())
}

fn split_indent(line: &str) -> (&str, &str) {
    let content = line.trim_start();
    (&line[..line.len() - content.len()], content)
}

/// Clean up whitespace without touching column gaps.
///
/// Line endings become `\n`, tabs become a two-space column gap, other
/// whitespace becomes a plain space, trailing whitespace is dropped, runs of
/// blank lines collapse to one, and leading/trailing blank lines go away.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '\t' => line.push_str("  "),
                c if c.is_whitespace() => line.push(' '),
                c if c.is_control() => {}
                c => line.push(c),
            }
        }
        let line = line.trim_end().to_string();

        let previous_blank = lines.last().is_some_and(|l| l.is_empty());
        if line.is_empty() && (lines.is_empty() || previous_blank) {
            continue;
        }
        lines.push(line);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Decide whether `lines[index]` is a title.
pub fn is_title(lines: &[&str], index: usize) -> bool {
    let Some(line) = lines.get(index) else {
        return false;
    };
    let content = line.trim();
    // Ruled rows belong to a table, not a heading.
    if content.is_empty() || content.contains(EMPHASIS) || has_rule_drawing(content) {
        return false;
    }

    if let Some(rule) = title_rules().iter().find(|r| r.matches(content)) {
        log::trace!("Title rule '{}' matched {:?}", rule.name, content);
        return true;
    }

    let len = visible_len(content);
    if !has_ideograph(content) {
        return false;
    }

    let next = lines.get(index + 1).copied();
    let next_blank_or_longer = is_blank(next) || next.is_some_and(|n| visible_len(n) > len);
    if len <= SHORT_TITLE_CHARS && next_blank_or_longer {
        return true;
    }

    let previous = index.checked_sub(1).and_then(|i| lines.get(i)).copied();
    is_blank(previous) && len <= LEAD_TITLE_CHARS && !has_consecutive_digits(content)
}

/// Wrap title lines in emphasis markers, keeping their indentation.
pub fn mark_titles(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if is_title(&lines, i) {
                let (indent, content) = split_indent(line);
                format!("{indent}{EMPHASIS}{content}{EMPHASIS}")
            } else {
                (*line).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_rule_drawing(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\u{2500}'..='\u{257F}' | '|' | '｜'))
}

/// Normalize the gaps of a possible two-column row to exactly two spaces.
///
/// Rows with rule-drawing characters, or with three or more columns, are
/// returned unchanged so their alignment survives.
pub fn preserve_table_row(line: &str) -> String {
    let (indent, content) = split_indent(line);
    if !content.contains("  ") || has_rule_drawing(content) {
        return line.to_string();
    }

    let fields: Vec<&str> = content
        .split("  ")
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() >= 3 {
        return line.to_string();
    }

    format!("{indent}{}", fields.join("  "))
}

/// Apply [`preserve_table_row`] to every line.
pub fn preserve_tables(text: &str) -> String {
    text.split('\n')
        .map(preserve_table_row)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run all formatting passes.
pub fn format_text(text: &str) -> FormattedText {
    let normalized = normalize_whitespace(text);
    let titled = mark_titles(&normalized);
    FormattedText::new(preserve_tables(&titled))
}
