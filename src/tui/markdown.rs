//! Markdown Rendering
//!
//! Turns a chat turn into styled lines that fit the transcript width.
//! Covers what answers actually use: headings, bullet and numbered lists,
//! block quotes, rules, fenced code, and inline `**bold**`, `*italic*` and
//! `` `code` ``. Anything else is shown as typed.

use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::ops::Range;

type StyledChar = (char, Style);

/// Render `content` into lines at most `width` cells wide.
pub fn render_markdown(content: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code = false;

    for raw in content.lines() {
        let trimmed = raw.trim_start();

        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            let body: Vec<StyledChar> = raw.chars().map(|c| (c, Theme::code())).collect();
            push_wrapped(&mut lines, String::new(), Theme::code(), &body, width);
            continue;
        }

        if is_rule(trimmed) {
            let rule = "─".repeat(width.clamp(1, 40));
            lines.push(Line::from(Span::styled(rule, Theme::text_dim())));
            continue;
        }

        let indent = &raw[..raw.len() - trimmed.len()];

        if let Some(text) = heading_text(trimmed) {
            push_wrapped(&mut lines, String::new(), Theme::heading(), &inline(text, Theme::heading()), width);
        } else if let Some(text) = ["- ", "* ", "+ "].iter().find_map(|m| trimmed.strip_prefix(*m)) {
            let prefix = format!("{}• ", indent);
            push_wrapped(&mut lines, prefix, Theme::assistant_message(), &inline(text, Theme::text()), width);
        } else if let Some((number, text)) = ordered_item(trimmed) {
            let prefix = format!("{}{}. ", indent, number);
            push_wrapped(&mut lines, prefix, Theme::text_secondary(), &inline(text, Theme::text()), width);
        } else if let Some(text) = trimmed.strip_prefix('>') {
            let text = text.trim_start();
            push_wrapped(&mut lines, "│ ".to_string(), Theme::text_dim(), &inline(text, Theme::quote()), width);
        } else {
            push_wrapped(&mut lines, String::new(), Theme::text(), &inline(raw, Theme::text()), width);
        }
    }

    lines
}

fn is_rule(trimmed: &str) -> bool {
    let line = trimmed.trim_end();
    line.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&marker| line.chars().all(|c| c == marker))
}

fn heading_text(trimmed: &str) -> Option<&str> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) {
        trimmed[level..].strip_prefix(' ').map(str::trim_start)
    } else {
        None
    }
}

fn ordered_item(trimmed: &str) -> Option<(&str, &str)> {
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    trimmed[digits..]
        .strip_prefix(". ")
        .map(|text| (&trimmed[..digits], text))
}

/// Resolve inline markers into styled characters. A marker only opens when
/// its closing counterpart appears later on the line.
fn inline(text: &str, base: Style) -> Vec<StyledChar> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let (mut bold, mut italic, mut code) = (false, false, false);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if code {
            if c == '`' {
                code = false;
            } else {
                out.push((c, Theme::code()));
            }
            i += 1;
            continue;
        }

        if c == '`' && chars[i + 1..].contains(&'`') {
            code = true;
            i += 1;
            continue;
        }

        if c == '*' && chars.get(i + 1) == Some(&'*') {
            if bold || contains_pair(&chars[i + 2..], '*') {
                bold = !bold;
                i += 2;
                continue;
            }
        } else if c == '*' {
            let next_solid = chars.get(i + 1).is_some_and(|n| !n.is_whitespace());
            let prev_solid = i > 0 && !chars[i - 1].is_whitespace();
            if (italic && prev_solid) || (!italic && next_solid && chars[i + 1..].contains(&'*')) {
                italic = !italic;
                i += 1;
                continue;
            }
        }

        let mut style = base;
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        out.push((c, style));
        i += 1;
    }

    out
}

fn contains_pair(chars: &[char], marker: char) -> bool {
    chars.windows(2).any(|w| w[0] == marker && w[1] == marker)
}

/// Wrap `body` to the space left after `prefix`; continuation lines are
/// indented to line up under the first.
fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    prefix: String,
    prefix_style: Style,
    body: &[StyledChar],
    width: usize,
) {
    let prefix_width: usize = prefix.chars().map(char_width).sum();
    let body_width = width.saturating_sub(prefix_width).max(1);
    let plain: Vec<char> = body.iter().map(|(c, _)| *c).collect();

    for (n, range) in wrap_ranges(&plain, body_width).into_iter().enumerate() {
        let mut spans = Vec::new();
        if n == 0 {
            if !prefix.is_empty() {
                spans.push(Span::styled(prefix.clone(), prefix_style));
            }
        } else if prefix_width > 0 {
            spans.push(Span::raw(" ".repeat(prefix_width)));
        }
        spans.extend(group_spans(&body[range]));
        lines.push(Line::from(spans));
    }
}

/// Merge runs of equally styled characters into spans.
fn group_spans(chars: &[StyledChar]) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;

    for &(c, style) in chars {
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(c);
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }
    spans
}

/// Terminal cell width of a character. Hangul, CJK and most emoji take two
/// cells.
pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

/// Greedy word wrap by display width, as char index ranges. Breaks after the
/// last whitespace that fits, or mid-word when one word is wider than
/// `width`. Trailing whitespace is dropped from each range; an empty line
/// yields one empty range.
pub fn wrap_ranges(chars: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let trim_end = |start: usize, mut end: usize| {
        while end > start && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        start..end
    };

    let mut out = Vec::new();
    let mut start = 0;
    let mut current_width = 0;
    let mut last_break: Option<usize> = None;

    for (i, &c) in chars.iter().enumerate() {
        let w = char_width(c);
        if current_width + w > width && i > start {
            match last_break {
                Some(at) if at > start => {
                    out.push(trim_end(start, at));
                    start = at;
                    current_width = chars[at..i].iter().map(|&c| char_width(c)).sum();
                }
                _ => {
                    out.push(trim_end(start, i));
                    start = i;
                    current_width = 0;
                }
            }
            last_break = None;
        }

        current_width += w;
        if c.is_whitespace() {
            last_break = Some(i + 1);
        }
    }

    if start < chars.len() || out.is_empty() {
        out.push(start..chars.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn wrap(text: &str, width: usize) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        wrap_ranges(&chars, width)
            .into_iter()
            .map(|r| chars[r].iter().collect())
            .collect()
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('한'), 2);
        assert_eq!(char_width('漢'), 2);
        assert_eq!(char_width('📁'), 2);
    }

    #[test]
    fn test_wrap_breaks_at_whitespace() {
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("short", 10), vec!["short"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_long_word_and_wide_chars() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        // each Hangul syllable takes two cells
        assert_eq!(wrap("가나다라", 5), vec!["가나", "다라"]);
    }

    #[test]
    fn test_heading_drops_hashes_and_is_bold() {
        let lines = render_markdown("## 요약", 40);
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "요약");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_inline_bold_and_code() {
        let lines = render_markdown("합계는 **42** 이고 `sum()` 사용", 80);
        assert_eq!(text_of(&lines[0]), "합계는 42 이고 sum() 사용");

        let bold = lines[0].spans.iter().find(|s| s.content == "42").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let code = lines[0].spans.iter().find(|s| s.content == "sum()").unwrap();
        assert_eq!(code.style, Theme::code());
    }

    #[test]
    fn test_lone_markers_stay_literal() {
        let lines = render_markdown("2 * 3 = 6, a `tick and **half", 80);
        assert_eq!(text_of(&lines[0]), "2 * 3 = 6, a `tick and **half");
    }

    #[test]
    fn test_lists_and_quote() {
        let lines = render_markdown("- 하나\n* 둘\n3. 셋\n> 인용", 40);
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["• 하나", "• 둘", "3. 셋", "│ 인용"]);
    }

    #[test]
    fn test_list_continuation_lines_up() {
        let lines = render_markdown("- aaaa bbbb", 8);
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["• aaaa", "  bbbb"]);
    }

    #[test]
    fn test_code_fence_is_verbatim() {
        let lines = render_markdown("```rust\nlet x = **y**;\n```\nafter", 40);
        assert_eq!(lines.len(), 2);
        assert_eq!(text_of(&lines[0]), "let x = **y**;");
        assert_eq!(lines[0].spans[0].style, Theme::code());
        assert_eq!(text_of(&lines[1]), "after");
    }

    #[test]
    fn test_rule_and_blank_lines() {
        let lines = render_markdown("a\n\n---\nb", 10);
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["a".to_string(), String::new(), "─".repeat(10), "b".to_string()]);
    }
}
