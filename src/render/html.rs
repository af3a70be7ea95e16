//! Block extraction from HTML exports
//!
//! Course platforms ship lesson bodies as small HTML fragments or full pages.
//! There is no layout engine here: tags are reduced to the same block
//! structure the markdown reader produces, scripts and styles are dropped, and
//! a handful of common entities are decoded.

use super::Block;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    Preformatted,
    /// Inside <script> or <style>: content is discarded.
    Skipped,
}

/// Parse HTML source into renderable blocks.
pub fn parse(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut pre_text = String::new();
    let mut heading_level: Option<u8> = None;
    let mut list_items: Vec<String> = Vec::new();
    let mut in_list_item = false;
    let mut ordered = false;
    let mut mode = Mode::Normal;

    let mut chars = source.char_indices();

    while let Some((i, ch)) = chars.next() {
        if ch != '<' {
            match mode {
                Mode::Normal => text.push(ch),
                Mode::Preformatted => pre_text.push(ch),
                Mode::Skipped => {}
            }
            continue;
        }

        // Read the tag up to '>'
        let mut end = None;
        for (j, c) in chars.by_ref() {
            if c == '>' {
                end = Some(j);
                break;
            }
        }
        let Some(end) = end else { break };
        let tag_body = &source[i + 1..end];
        let closing = tag_body.starts_with('/');
        let name: String = tag_body
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match (mode, name.as_str(), closing) {
            (Mode::Skipped, "script" | "style", true) => mode = Mode::Normal,
            (Mode::Skipped, _, _) => {}
            (Mode::Preformatted, "pre", true) => {
                mode = Mode::Normal;
                let lines: Vec<String> = decode_entities(&pre_text)
                    .lines()
                    .map(str::to_string)
                    .collect();
                pre_text.clear();
                if !lines.iter().all(|l| l.trim().is_empty()) {
                    blocks.push(Block::Code(lines));
                }
            }
            (Mode::Preformatted, _, _) => {
                // other tags inside <pre> are dropped, their text kept
            }
            (Mode::Normal, "script" | "style", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                mode = Mode::Skipped;
            }
            (Mode::Normal, "pre", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                mode = Mode::Preformatted;
            }
            (Mode::Normal, "h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                heading_level = name[1..].parse::<u8>().ok();
            }
            (Mode::Normal, "h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                heading_level = None;
            }
            (Mode::Normal, "ul" | "ol", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                ordered = name == "ol";
            }
            (Mode::Normal, "ul" | "ol", true) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                if !list_items.is_empty() {
                    let items = std::mem::take(&mut list_items);
                    blocks.push(if ordered {
                        Block::Numbered(items)
                    } else {
                        Block::Bullets(items)
                    });
                }
                in_list_item = false;
            }
            (Mode::Normal, "li", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                in_list_item = true;
            }
            (Mode::Normal, "li", true) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
                in_list_item = false;
            }
            (Mode::Normal, "p" | "div" | "section" | "article" | "tr" | "table" | "blockquote", _)
            | (Mode::Normal, "br", false) => {
                flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
            }
            _ => {}
        }
    }

    flush_text(&mut blocks, &mut text, heading_level, in_list_item, &mut list_items);
    if mode == Mode::Preformatted && !pre_text.trim().is_empty() {
        let lines: Vec<String> = decode_entities(&pre_text).lines().map(str::to_string).collect();
        blocks.push(Block::Code(lines));
    }
    if !list_items.is_empty() {
        blocks.push(if ordered {
            Block::Numbered(list_items)
        } else {
            Block::Bullets(list_items)
        });
    }

    blocks
}

fn flush_text(
    blocks: &mut Vec<Block>,
    text: &mut String,
    heading_level: Option<u8>,
    in_list_item: bool,
    list_items: &mut Vec<String>,
) {
    let collapsed = collapse_whitespace(&decode_entities(text));
    text.clear();
    if collapsed.is_empty() {
        return;
    }

    if let Some(level) = heading_level {
        blocks.push(Block::Heading {
            level,
            text: collapsed,
        });
    } else if in_list_item {
        list_items.push(collapsed);
    } else {
        blocks.push(Block::Paragraph(collapsed));
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the entities that actually show up in course exports.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // Byte search keeps us off multi-byte char boundaries
        let Some(semi) = rest.bytes().take(12).position(|b| b == b';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headings_and_paragraphs() {
        let blocks = parse("<h1>Welcome</h1><p>First.</p><p>Second.</p>");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "Welcome".into() },
                Block::Paragraph("First.".into()),
                Block::Paragraph("Second.".into()),
            ]
        );
    }

    #[test]
    fn test_parse_lists() {
        let blocks = parse("<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>");
        assert_eq!(
            blocks,
            vec![
                Block::Bullets(vec!["one".into(), "two".into()]),
                Block::Numbered(vec!["first".into()]),
            ]
        );
    }

    #[test]
    fn test_script_and_style_are_dropped() {
        let blocks = parse("<p>keep</p><script>alert('no')</script><style>p{}</style><p>also</p>");
        assert_eq!(
            blocks,
            vec![Block::Paragraph("keep".into()), Block::Paragraph("also".into())]
        );
    }

    #[test]
    fn test_pre_becomes_code_block() {
        let blocks = parse("<pre>let x = 1;\nlet y = 2;</pre>");
        assert_eq!(
            blocks,
            vec![Block::Code(vec!["let x = 1;".into(), "let y = 2;".into()])]
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let blocks = parse("<p>a &amp; b &lt;c&gt; &#39;d&#x2019;</p>");
        assert_eq!(blocks, vec![Block::Paragraph("a & b <c> 'd\u{2019}".into())]);
    }

    #[test]
    fn test_attributes_are_ignored() {
        let blocks = parse(r#"<p class="lead" style="color:red">styled text</p>"#);
        assert_eq!(blocks, vec![Block::Paragraph("styled text".into())]);
    }

    #[test]
    fn test_whitespace_collapses() {
        let blocks = parse("<p>lots    of\n   space</p>");
        assert_eq!(blocks, vec![Block::Paragraph("lots of space".into())]);
    }
}
