//! Markdown (CommonMark + MyST conventions) pages.

use super::{rst, PageBuilder, SKIPPED_DIRECTIVES};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

fn label_regex() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| Regex::new(r"^\s*\([^()\s]+\)=\s*$").expect("static regex"))
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options
}

/// Feed a Markdown page into `page`
pub(crate) fn parse(text: &str, page: &mut PageBuilder) {
    let cleaned = strip_labels(text);
    let mut walker = Walker::default();

    for event in Parser::new_ext(&cleaned, options()) {
        walker.event(event, page);
    }
    walker.flush(page);
}

/// Drop MyST target lines such as `(confinement-label)=` outside code fences
fn strip_labels(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut fence: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        let run: String = trimmed
            .chars()
            .take_while(|&c| c == '`' || c == '~')
            .collect();

        match &fence {
            Some(open) if run.len() >= open.len() && run.starts_with(&open[..1]) => {
                if trimmed[run.len()..].trim().is_empty() {
                    fence = None;
                }
            }
            None if run.len() >= 3 && run.chars().all(|c| c == run.as_bytes()[0] as char) => {
                fence = Some(run.clone());
            }
            None if label_regex().is_match(line) => continue,
            _ => {}
        }

        out.push_str(line);
        out.push('\n');
    }
    out
}

struct Heading {
    id: Option<String>,
    text: String,
}

struct CodeBlock {
    info: String,
    body: String,
}

/// Event state: at most one of heading/code is open at a time
#[derive(Default)]
struct Walker {
    pending: String,
    heading: Option<Heading>,
    code: Option<CodeBlock>,
    hidden: usize,
}

impl Walker {
    fn event(&mut self, event: Event<'_>, page: &mut PageBuilder) {
        match event {
            Event::Start(Tag::Heading { id, .. }) => {
                self.flush(page);
                self.heading = Some(Heading {
                    id: id.map(|id| id.to_string()),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = self.heading.take() {
                    page.heading(&heading.text, heading.id.as_deref());
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush(page);
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    info,
                    body: String::new(),
                });
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = self.code.take() {
                    code_block(&block.info, &block.body, page);
                }
            }
            Event::Start(Tag::Image { .. }) | Event::Start(Tag::MetadataBlock(_)) => {
                self.hidden += 1;
            }
            Event::End(TagEnd::Image) | Event::End(TagEnd::MetadataBlock(_)) => {
                self.hidden = self.hidden.saturating_sub(1);
            }
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                if let Some(heading) = self.heading.as_mut() {
                    heading.text.push_str(&code);
                } else if self.hidden == 0 {
                    self.flush(page);
                    page.text(&code);
                }
            }
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::Start(_) | Event::End(_) => {
                if self.heading.is_none() {
                    self.flush(page);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.hidden > 0 {
            return;
        }
        if let Some(block) = self.code.as_mut() {
            block.body.push_str(text);
        } else if let Some(heading) = self.heading.as_mut() {
            heading.text.push_str(text);
        } else {
            self.pending.push_str(text);
        }
    }

    fn flush(&mut self, page: &mut PageBuilder) {
        if !self.pending.is_empty() {
            page.text(&self.pending);
            self.pending.clear();
        }
    }
}

/// Name of a MyST directive fence such as "{note}" or "{toctree}"
fn directive_name(info: &str) -> Option<&str> {
    let first = info.split_whitespace().next()?;
    first.strip_prefix('{')?.strip_suffix('}')
}

fn code_block(info: &str, body: &str, page: &mut PageBuilder) {
    match directive_name(info) {
        None => page.text(body),
        Some("toctree") => {
            for line in body.lines() {
                if let Some(caption) = line.trim().strip_prefix(":caption:") {
                    page.caption(caption);
                }
            }
        }
        Some("eval-rst") => rst::parse(body, page),
        Some(name) if SKIPPED_DIRECTIVES.contains(&name) => {}
        Some(_) => {
            let content = body
                .lines()
                .skip_while(|line| is_option_line(line))
                .collect::<Vec<_>>()
                .join("\n");
            page.text(&content);
        }
    }
}

fn is_option_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(':') && line[1..].contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> crate::source::SourcePage {
        let mut page = PageBuilder::new();
        parse(text, &mut page);
        page.finish("page".into(), "page.md".into())
    }

    #[test]
    fn test_headings_and_words() {
        let page = parse_str(
            "# Vertex confinement\n\nVertices are sampled *uniformly*.\n\n## Bounding sphere\n\nText.\n",
        );
        assert_eq!(page.title, "Vertex confinement");
        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.sections[1].anchor.as_deref(), Some("bounding-sphere"));
        assert_eq!(page.title_words, vec!["Vertex", "confinement", "Bounding", "sphere"]);
        assert!(page.words.contains(&"uniformly".to_string()));
        assert!(page.words.contains(&"Text".to_string()));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let page = parse_str("# Intro\n\n## The `/RMG/Geometry` commands\n");
        assert_eq!(page.sections[1].title, "The /RMG/Geometry commands");
        assert_eq!(page.sections[1].anchor.as_deref(), Some("the-rmg-geometry-commands"));
    }

    #[test]
    fn test_explicit_heading_id() {
        let page = parse_str("# Intro\n\n## Results {#custom-id}\n");
        assert_eq!(page.sections[1].anchor.as_deref(), Some("custom-id"));
        assert_eq!(page.sections[1].title, "Results");
    }

    #[test]
    fn test_front_matter_and_html_skipped() {
        let page = parse_str(
            "---\nsecretkey: hidden\n---\n\n# Title\n\n<div>markup</div>\n\n<!-- comment -->\n\nvisible\n",
        );
        assert!(!page.words.iter().any(|w| w == "secretkey" || w == "hidden"));
        assert!(!page.words.iter().any(|w| w == "markup" || w == "comment"));
        assert!(page.words.contains(&"visible".to_string()));
    }

    #[test]
    fn test_myst_labels_dropped() {
        let page = parse_str("(confinement-label)=\n# Vertex confinement\n\nbody\n");
        assert_eq!(page.title, "Vertex confinement");
        assert!(!page.words.iter().any(|w| w == "label"));
    }

    #[test]
    fn test_label_inside_fence_kept() {
        let page = parse_str("# T\n\n```\n(kept)=\n```\n");
        assert!(page.words.contains(&"kept".to_string()));
    }

    #[test]
    fn test_code_and_directives() {
        let page = parse_str(
            "# T\n\n```console\n$ remage macro.mac\n```\n\n```{figure} plot.png\n:width: 80%\n\nDistance histogram\n```\n\n```{toctree}\n:caption: Sections\n\nconfinement\n```\n",
        );
        assert!(page.words.contains(&"remage".to_string()));
        assert!(page.words.contains(&"histogram".to_string()));
        assert!(!page.words.iter().any(|w| w == "width" || w == "confinement"));
        assert_eq!(page.sections.last().unwrap().title, "Sections");
        assert_eq!(page.sections.last().unwrap().anchor, None);
    }

    #[test]
    fn test_image_alt_text_skipped() {
        let page = parse_str("# T\n\n![alttext](img.png) caption\n");
        assert!(!page.words.iter().any(|w| w == "alttext"));
        assert!(page.words.contains(&"caption".to_string()));
    }

    #[test]
    fn test_eval_rst_block() {
        let page = parse_str("# T\n\n```{eval-rst}\nSee :ref:`the manual <manual>`.\n```\n");
        assert!(page.words.contains(&"manual".to_string()));
        assert!(!page.words.iter().any(|w| w == "ref"));
    }
}
