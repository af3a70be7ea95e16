//! Block-level markdown reader
//!
//! Covers the subset course exports actually use: headings, paragraphs,
//! ordered and unordered lists, blockquotes, fenced code blocks, and pipe
//! tables. A literal `[TOC]` line expands to a list of the document's own
//! headings. That generated list is part of the rendered document itself and
//! has nothing to do with the binder's PDF-level table of contents.

use std::sync::LazyLock;

use regex::Regex;

use super::Block;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid regex"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("valid regex"));
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|?[\s:|-]+\|?\s*$").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

/// The block a run of lines is currently accumulating into. Only one is
/// active at a time, so blocks always flush in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collecting {
    Nothing,
    Paragraph,
    Bullets,
    Numbered,
    Quote,
    Table,
}

/// Parse markdown source into renderable blocks.
pub fn parse(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines_buf: Vec<String> = Vec::new();
    let mut rows_buf: Vec<Vec<String>> = Vec::new();
    let mut code: Vec<String> = Vec::new();
    let mut collecting = Collecting::Nothing;
    let mut in_code = false;
    let mut toc_positions = Vec::new();

    fn flush(
        blocks: &mut Vec<Block>,
        collecting: &mut Collecting,
        lines_buf: &mut Vec<String>,
        rows_buf: &mut Vec<Vec<String>>,
    ) {
        match collecting {
            Collecting::Nothing => {}
            Collecting::Paragraph => {
                blocks.push(Block::Paragraph(std::mem::take(lines_buf).join(" ")));
            }
            Collecting::Bullets => blocks.push(Block::Bullets(std::mem::take(lines_buf))),
            Collecting::Numbered => blocks.push(Block::Numbered(std::mem::take(lines_buf))),
            Collecting::Quote => blocks.push(Block::Quote(std::mem::take(lines_buf))),
            Collecting::Table => blocks.push(Block::Table(std::mem::take(rows_buf))),
        }
        lines_buf.clear();
        rows_buf.clear();
        *collecting = Collecting::Nothing;
    }

    // Switch the active collector, flushing the previous one on a change
    macro_rules! collect_into {
        ($kind:expr) => {
            if collecting != $kind {
                flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);
                collecting = $kind;
            }
        };
    }

    for raw_line in source.lines() {
        let line = raw_line.trim_end();

        if in_code {
            if line.trim_start().starts_with("```") {
                in_code = false;
                if !code.is_empty() {
                    blocks.push(Block::Code(std::mem::take(&mut code)));
                }
            } else {
                code.push(raw_line.to_string());
            }
            continue;
        }

        if line.trim_start().starts_with("```") {
            flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);
            in_code = true;
            continue;
        }

        if line.trim().is_empty() {
            flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);
            continue;
        }

        if line.trim() == "[TOC]" {
            flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);
            toc_positions.push(blocks.len());
            blocks.push(Block::Bullets(Vec::new()));
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);
            blocks.push(Block::Heading {
                level: caps[1].len() as u8,
                text: strip_inline(&caps[2]),
            });
            continue;
        }

        if is_table_row(line) {
            collect_into!(Collecting::Table);
            if !TABLE_SEPARATOR.is_match(line) {
                rows_buf.push(split_table_row(line));
            }
            continue;
        }

        if let Some(caps) = BULLET.captures(line) {
            collect_into!(Collecting::Bullets);
            lines_buf.push(strip_inline(&caps[1]));
            continue;
        }
        if let Some(caps) = NUMBERED.captures(line) {
            collect_into!(Collecting::Numbered);
            lines_buf.push(strip_inline(&caps[1]));
            continue;
        }
        if let Some(rest) = line.trim_start().strip_prefix('>') {
            collect_into!(Collecting::Quote);
            lines_buf.push(strip_inline(rest.trim_start()));
            continue;
        }

        collect_into!(Collecting::Paragraph);
        lines_buf.push(strip_inline(line.trim()));
    }

    if in_code && !code.is_empty() {
        blocks.push(Block::Code(std::mem::take(&mut code)));
    }
    flush(&mut blocks, &mut collecting, &mut lines_buf, &mut rows_buf);

    // Expand [TOC] markers now that every heading is known
    if !toc_positions.is_empty() {
        let headings: Vec<String> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        for &position in &toc_positions {
            blocks[position] = Block::Bullets(headings.clone());
        }
    }

    blocks
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.len() > 1
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| strip_inline(cell.trim()))
        .collect()
}

/// Drop inline markup, keeping the text: emphasis markers, inline code ticks,
/// link and image syntax.
pub fn strip_inline(text: &str) -> String {
    let text = LINK.replace_all(text, "$1");
    text.replace("**", "")
        .replace("__", "")
        .replace(['*', '`'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headings_and_paragraphs() {
        let blocks = parse("# Title\n\nFirst paragraph\nstill first.\n\nSecond.");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "Title".into() },
                Block::Paragraph("First paragraph still first.".into()),
                Block::Paragraph("Second.".into()),
            ]
        );
    }

    #[test]
    fn test_parse_lists() {
        let blocks = parse("- one\n- two\n\n1. first\n2. second");
        assert_eq!(
            blocks,
            vec![
                Block::Bullets(vec!["one".into(), "two".into()]),
                Block::Numbered(vec!["first".into(), "second".into()]),
            ]
        );
    }

    #[test]
    fn test_list_then_text_keeps_document_order() {
        let blocks = parse("- item\nplain text after");
        assert_eq!(
            blocks,
            vec![
                Block::Bullets(vec!["item".into()]),
                Block::Paragraph("plain text after".into()),
            ]
        );
    }

    #[test]
    fn test_fenced_code_is_not_interpreted() {
        let blocks = parse("```\n# not a heading\n- not a bullet\n```");
        assert_eq!(
            blocks,
            vec![Block::Code(vec!["# not a heading".into(), "- not a bullet".into()])]
        );
    }

    #[test]
    fn test_unclosed_fence_still_flushes() {
        let blocks = parse("```\nlet x = 1;");
        assert_eq!(blocks, vec![Block::Code(vec!["let x = 1;".into()])]);
    }

    #[test]
    fn test_pipe_table() {
        let blocks = parse("| Name | Qty |\n|------|-----|\n| apples | 2 |");
        assert_eq!(
            blocks,
            vec![Block::Table(vec![
                vec!["Name".into(), "Qty".into()],
                vec!["apples".into(), "2".into()],
            ])]
        );
    }

    #[test]
    fn test_blockquote() {
        let blocks = parse("> quoted wisdom\n> more wisdom");
        assert_eq!(
            blocks,
            vec![Block::Quote(vec!["quoted wisdom".into(), "more wisdom".into()])]
        );
    }

    #[test]
    fn test_toc_marker_expands_to_headings() {
        let blocks = parse("[TOC]\n\n# One\n\ntext\n\n## Two");
        assert_eq!(blocks[0], Block::Bullets(vec!["One".into(), "Two".into()]));
    }

    #[test]
    fn test_strip_inline() {
        assert_eq!(strip_inline("**bold** and *em* and `code`"), "bold and em and code");
        assert_eq!(strip_inline("[link text](https://x.test)"), "link text");
        assert_eq!(strip_inline("![alt](img.png)"), "alt");
    }
}
