//! reStructuredText pages.
//!
//! Line based: section titles, explicit markup blocks and inline roles are
//! recognised; everything else is treated as prose.

use super::{PageBuilder, SKIPPED_DIRECTIVES};
use regex::Regex;
use std::sync::OnceLock;

/// Directives whose argument is prose rather than a path or language name
const TITLED_DIRECTIVES: &[&str] = &["admonition", "topic", "rubric", "sidebar"];

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.\.\s+([\w:.+-]+) ?::\s*(.*)$").expect("static regex"))
}

fn interpreted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?::[A-Za-z0-9_.+:-]+:)?`([^`]*)`(?::[A-Za-z0-9_.+:-]+:)?_{0,2}")
            .expect("static regex")
    })
}

/// Feed a reStructuredText page into `page`
pub(crate) fn parse(text: &str, page: &mut PageBuilder) {
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        // Overlined title
        if is_adornment(line) && i + 2 < lines.len() {
            let title = lines[i + 1].trim();
            if !title.is_empty()
                && is_adornment(lines[i + 2])
                && lines[i + 2].trim().chars().next() == line.trim().chars().next()
            {
                page.heading(title, None);
                i += 3;
                continue;
            }
        }

        // Underlined title
        if indent_of(line) == 0 && i + 1 < lines.len() && !is_adornment(line) {
            let underline = lines[i + 1];
            if is_adornment(underline) && underline.trim().chars().count() >= line.trim().chars().count() {
                page.heading(line.trim(), None);
                i += 2;
                continue;
            }
        }

        // Transitions and stray adornments
        if is_adornment(line) {
            i += 1;
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed == ".." || trimmed.starts_with(".. ") {
            i = explicit_markup(&lines, i, page);
            continue;
        }

        page.text(&clean_inline(line));
        i += 1;
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// A line of one repeated punctuation character
fn is_adornment(line: &str) -> bool {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    trimmed.chars().count() >= 2 && first.is_ascii_punctuation() && chars.all(|c| c == first)
}

/// Lines belonging to the block opened at `start`: blank or indented deeper
fn block_end(lines: &[&str], start: usize) -> usize {
    let base = indent_of(lines[start]);
    let mut end = start + 1;
    while end < lines.len() && (lines[end].trim().is_empty() || indent_of(lines[end]) > base) {
        end += 1;
    }
    end
}

/// Handle a `..` block (directive, target, footnote or comment); returns the next line
fn explicit_markup(lines: &[&str], start: usize, page: &mut PageBuilder) -> usize {
    let end = block_end(lines, start);
    let head = lines[start].trim();
    let body = &lines[start + 1..end];

    if let Some(caps) = directive_regex().captures(head) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let argument = caps.get(2).map_or("", |m| m.as_str());
        directive(name, argument, body, page);
    } else if let Some(rest) = head.strip_prefix(".. [") {
        // footnote or citation: keep the text after the label
        if let Some((_, text)) = rest.split_once(']') {
            page.text(&clean_inline(text));
        }
        for line in body {
            page.text(&clean_inline(line));
        }
    }
    // targets, substitution definitions and comments contribute nothing

    end
}

fn directive(name: &str, argument: &str, body: &[&str], page: &mut PageBuilder) {
    if name == "toctree" {
        for line in body {
            if let Some(caption) = line.trim().strip_prefix(":caption:") {
                page.caption(caption);
            }
        }
        return;
    }
    if SKIPPED_DIRECTIVES.contains(&name) {
        return;
    }

    if TITLED_DIRECTIVES.contains(&name) {
        page.text(&clean_inline(argument));
    }
    for line in body.iter().skip_while(|l| is_option_line(l)) {
        page.text(&clean_inline(line));
    }
}

fn is_option_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(':') && line[1..].contains(':')
}

/// Replace roles, interpreted text and hyperlink references by their text
fn clean_inline(line: &str) -> String {
    interpreted_regex()
        .replace_all(line, |caps: &regex::Captures| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            match inner.rfind(" <") {
                Some(pos) if inner.ends_with('>') => inner[..pos].to_string(),
                _ => inner.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourcePage;

    fn parse_str(text: &str) -> SourcePage {
        let mut page = PageBuilder::new();
        parse(text, &mut page);
        page.finish("page".into(), "page.rst".into())
    }

    #[test]
    fn test_underlined_and_overlined_titles() {
        let page = parse_str(
            "=============\nCommand reference\n=============\n\nIntro text.\n\n/RMG/Manager\n------------\n\nManager commands.\n",
        );
        assert_eq!(page.title, "Command reference");
        assert_eq!(page.sections[1].title, "/RMG/Manager");
        assert_eq!(page.sections[1].anchor.as_deref(), Some("rmg-manager"));
        assert!(page.words.contains(&"Intro".to_string()));
        assert!(!page.words.iter().any(|w| w.starts_with("===")));
    }

    #[test]
    fn test_short_underline_is_text() {
        let page = parse_str("A long heading line\n---\n");
        assert!(page.sections.is_empty());
        assert!(page.words.contains(&"heading".to_string()));
    }

    #[test]
    fn test_comments_skipped() {
        let page = parse_str("Title\n=====\n\n.. this is a comment\n   still hidden\n\nshown\n");
        assert!(!page.words.iter().any(|w| w == "comment" || w == "hidden"));
        assert!(page.words.contains(&"shown".to_string()));
    }

    #[test]
    fn test_directives() {
        let page = parse_str(
            "Title\n=====\n\n.. note::\n   :class: tip\n\n   Read the manual.\n\n.. toctree::\n   :caption: Sections\n\n   confinement\n\n.. image:: plot.png\n",
        );
        assert!(page.words.contains(&"manual".to_string()));
        assert!(!page.words.iter().any(|w| w == "note" || w == "class" || w == "tip"));
        assert!(!page.words.iter().any(|w| w == "confinement" || w == "plot"));
        assert_eq!(page.sections.last().unwrap().title, "Sections");
    }

    #[test]
    fn test_directive_with_space_before_colons() {
        let page = parse_str("Title\n=====\n\n.. note ::\n\n    Guidance note words\n\n.. image :: plot.png\n");
        assert!(page.words.contains(&"Guidance".to_string()));
        assert!(page.words.contains(&"note".to_string()));
        assert!(!page.words.iter().any(|w| w == "plot"));
    }

    #[test]
    fn test_roles_keep_text() {
        assert_eq!(clean_inline("Use :ref:`vertex confinement <conf>` here"), "Use vertex confinement here");
        assert_eq!(clean_inline("The ``remage`` binary"), "The remage binary");
        assert_eq!(clean_inline("See `the docs <https://x.y>`_."), "See the docs.");
        assert_eq!(clean_inline(":math:`E = mc^2`"), "E = mc^2");
    }

    #[test]
    fn test_targets_and_footnotes() {
        let page = parse_str("Title\n=====\n\n.. _target-label:\n\n.. [1] Footnote words\n");
        assert!(!page.words.iter().any(|w| w == "target" || w == "label"));
        assert!(page.words.contains(&"Footnote".to_string()));
    }
}
