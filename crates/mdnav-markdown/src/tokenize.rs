//! Adapts pulldown-cmark's event stream to the [`Token`] vocabulary.
//!
//! pulldown-cmark reports tight list items as bare inline events and table headers without a
//! row; the adapter smooths both over so the builder sees markdown-it shaped blocks: inline runs
//! always sit inside a paragraph, heading or cell, and every header cell sits in a `tr`.

use pulldown_cmark::Alignment;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::LinkType;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

use crate::token::Token;

/// Parses `markdown` into a flat token stream.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut adapter = Adapter::default();
    for event in Parser::new_ext(markdown, options) {
        adapter.event(event);
    }
    adapter.finish()
}

#[derive(Default)]
struct Adapter {
    out: Vec<Token>,
    /// Children of the inline run currently being collected.
    inline: Option<Vec<Token>>,
    /// The open inline run belongs to a paragraph the adapter opened itself.
    implicit_paragraph: bool,
    /// Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    code: Option<CodeBuf>,
    image: Option<ImageBuf>,
    table: Option<TableCtx>,
}

struct CodeBuf {
    info: Option<String>,
    text: String,
}

struct ImageBuf {
    src: String,
    title: String,
    alt: String,
}

struct TableCtx {
    aligns: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    column: usize,
}

impl Adapter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.text.push_str(&text);
                } else if let Some(image) = self.image.as_mut() {
                    image.alt.push_str(&text);
                } else {
                    self.push_inline(Token::text(text.to_string()));
                }
            }
            Event::Code(code) => {
                if let Some(image) = self.image.as_mut() {
                    image.alt.push_str(&code);
                } else {
                    self.push_inline(Token::new("code_inline").with_content(code.to_string()));
                }
            }
            Event::SoftBreak => self.push_break("softbreak"),
            Event::HardBreak => self.push_break("hardbreak"),
            Event::InlineHtml(html) => {
                self.push_inline(Token::new("html_inline").with_content(html.to_string()));
            }
            Event::Html(html) => {
                self.close_implicit_paragraph();
                self.out
                    .push(Token::new("html_block").with_content(html.to_string()));
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Token::text(format!("[^{label}]")));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_inline(Token::text(marker));
            }
            Event::Rule => {
                self.close_implicit_paragraph();
                self.out.push(Token::new("hr"));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        if is_block_tag(&tag) {
            self.close_implicit_paragraph();
        }
        match tag {
            Tag::Paragraph => {
                self.out.push(Token::new("paragraph_open").with_tag("p"));
                self.inline = Some(Vec::new());
            }
            Tag::Heading { level, .. } => {
                self.out
                    .push(Token::new("heading_open").with_tag(heading_tag(level)));
                self.inline = Some(Vec::new());
            }
            Tag::BlockQuote(_) => self.out.push(Token::new("blockquote_open")),
            Tag::List(Some(start)) => {
                self.lists.push(Some(start));
                self.out.push(Token::new("ordered_list_open"));
            }
            Tag::List(None) => {
                self.lists.push(None);
                self.out.push(Token::new("bullet_list_open"));
            }
            Tag::Item => {
                let mut item = Token::new("list_item_open");
                if let Some(Some(next)) = self.lists.last_mut() {
                    item = item.with_info(next.to_string());
                    *next += 1;
                }
                self.out.push(item);
            }
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => Some(info.to_string()),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBuf {
                    info,
                    text: String::new(),
                });
            }
            Tag::Table(aligns) => {
                self.table = Some(TableCtx {
                    aligns,
                    in_head: false,
                    body_open: false,
                    column: 0,
                });
                self.out.push(Token::new("table_open"));
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                    table.column = 0;
                }
                self.out.push(Token::new("thead_open"));
                self.out.push(Token::new("tr_open"));
            }
            Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.column = 0;
                    if !table.body_open {
                        table.body_open = true;
                        self.out.push(Token::new("tbody_open"));
                    }
                }
                self.out.push(Token::new("tr_open"));
            }
            Tag::TableCell => {
                let (kind, align) = match self.table.as_ref() {
                    Some(table) => (
                        if table.in_head { "th_open" } else { "td_open" },
                        table.aligns.get(table.column).copied(),
                    ),
                    None => ("td_open", None),
                };
                let mut cell = Token::new(kind);
                if let Some(align) = align.and_then(align_attr) {
                    cell = cell.with_attr("align", align);
                }
                self.out.push(cell);
                self.inline = Some(Vec::new());
            }
            Tag::Emphasis => self.push_inline_marker("em_open"),
            Tag::Strong => self.push_inline_marker("strong_open"),
            Tag::Strikethrough => self.push_inline_marker("s_open"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                if self.image.is_none() {
                    let href = match link_type {
                        LinkType::Email => format!("mailto:{dest_url}"),
                        _ => dest_url.to_string(),
                    };
                    let mut link = Token::new("link_open").with_attr("href", href);
                    if !title.is_empty() {
                        link = link.with_attr("title", title.to_string());
                    }
                    self.push_inline(link);
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageBuf {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                });
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_inline();
                self.out.push(Token::new("paragraph_close").with_tag("p"));
            }
            TagEnd::Heading(level) => {
                self.flush_inline();
                self.out
                    .push(Token::new("heading_close").with_tag(heading_tag(level)));
            }
            TagEnd::BlockQuote(_) => {
                self.close_implicit_paragraph();
                self.out.push(Token::new("blockquote_close"));
            }
            TagEnd::List(_) => {
                self.close_implicit_paragraph();
                let kind = match self.lists.pop() {
                    Some(Some(_)) => "ordered_list_close",
                    _ => "bullet_list_close",
                };
                self.out.push(Token::new(kind));
            }
            TagEnd::Item => {
                self.close_implicit_paragraph();
                self.out.push(Token::new("list_item_close"));
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let token = match code.info {
                        Some(info) => Token::new("fence").with_info(info),
                        None => Token::new("code_block"),
                    };
                    self.out.push(token.with_content(code.text));
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take()
                    && table.body_open
                {
                    self.out.push(Token::new("tbody_close"));
                }
                self.out.push(Token::new("table_close"));
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
                self.out.push(Token::new("tr_close"));
                self.out.push(Token::new("thead_close"));
            }
            TagEnd::TableRow => self.out.push(Token::new("tr_close")),
            TagEnd::TableCell => {
                self.flush_inline();
                let kind = match self.table.as_mut() {
                    Some(table) => {
                        table.column += 1;
                        if table.in_head { "th_close" } else { "td_close" }
                    }
                    None => "td_close",
                };
                self.out.push(Token::new(kind));
            }
            TagEnd::Emphasis => self.push_inline_marker("em_close"),
            TagEnd::Strong => self.push_inline_marker("strong_close"),
            TagEnd::Strikethrough => self.push_inline_marker("s_close"),
            TagEnd::Link => {
                if self.image.is_none() {
                    self.push_inline(Token::new("link_close"));
                }
            }
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    let mut token = Token::new("image")
                        .with_attr("src", image.src)
                        .with_attr("alt", image.alt);
                    if !image.title.is_empty() {
                        token = token.with_attr("title", image.title);
                    }
                    self.push_inline(token);
                }
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock => self.close_implicit_paragraph(),
            _ => {}
        }
    }

    fn push_inline(&mut self, token: Token) {
        if self.inline.is_none() {
            self.out.push(Token::new("paragraph_open").with_tag("p").hidden());
            self.inline = Some(Vec::new());
            self.implicit_paragraph = true;
        }
        if let Some(children) = self.inline.as_mut() {
            children.push(token);
        }
    }

    /// Style markers are dropped inside image alt text.
    fn push_inline_marker(&mut self, kind: &str) {
        if self.image.is_none() {
            self.push_inline(Token::new(kind));
        }
    }

    fn push_break(&mut self, kind: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push(' ');
        } else {
            self.push_inline(Token::new(kind));
        }
    }

    fn flush_inline(&mut self) {
        let children = self.inline.take().unwrap_or_default();
        let content = children
            .iter()
            .filter(|t| t.kind == "text" || t.kind == "code_inline")
            .map(|t| t.content.as_str())
            .collect::<String>();
        self.out
            .push(Token::inline(children).with_content(content));
    }

    fn close_implicit_paragraph(&mut self) {
        if !self.implicit_paragraph {
            return;
        }
        self.implicit_paragraph = false;
        self.flush_inline();
        self.out
            .push(Token::new("paragraph_close").with_tag("p").hidden());
    }

    fn finish(mut self) -> Vec<Token> {
        self.close_implicit_paragraph();
        self.out
    }
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Item
            | Tag::FootnoteDefinition(_)
            | Tag::Table(_)
    )
}

fn heading_tag(level: HeadingLevel) -> String {
    let n = match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    };
    format!("h{n}")
}

fn align_attr(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn heading_and_paragraph() {
        let tokens = tokenize("# Title\n\nSome *text*.\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "heading_open",
                "inline",
                "heading_close",
                "paragraph_open",
                "inline",
                "paragraph_close",
            ]
        );
        assert_eq!(tokens[0].tag, "h1");
        let children = kinds(&tokens[4].children);
        assert_eq!(children, vec!["text", "em_open", "text", "em_close", "text"]);
    }

    #[test]
    fn tight_list_items_get_hidden_paragraphs() {
        let tokens = tokenize("- one\n- two\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
        assert!(tokens[2].hidden);
        assert_eq!(tokens[3].content, "one");
    }

    #[test]
    fn nested_tight_list_closes_parent_text_first() {
        let tokens = tokenize("- a\n  - b\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
    }

    #[test]
    fn ordered_list_items_carry_ordinals() {
        let tokens = tokenize("3. c\n4. d\n");
        let infos: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == "list_item_open")
            .map(|t| t.info.as_str())
            .collect();
        assert_eq!(infos, vec!["3", "4"]);
        assert_eq!(tokens[0].kind, "ordered_list_open");
    }

    #[test]
    fn table_header_is_wrapped_in_a_row() {
        let tokens = tokenize("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "table_open",
                "thead_open",
                "tr_open",
                "th_open",
                "inline",
                "th_close",
                "th_open",
                "inline",
                "th_close",
                "tr_close",
                "thead_close",
                "tbody_open",
                "tr_open",
                "td_open",
                "inline",
                "td_close",
                "td_open",
                "inline",
                "td_close",
                "tr_close",
                "tbody_close",
                "table_close",
            ]
        );
        assert_eq!(tokens[3].attr("align"), Some("left"));
        assert_eq!(tokens[6].attr("align"), Some("right"));
    }

    #[test]
    fn fenced_and_indented_code() {
        let tokens = tokenize("```rust\nfn main() {}\n```\n\n    indented\n");
        assert_eq!(kinds(&tokens), vec!["fence", "code_block"]);
        assert_eq!(tokens[0].info, "rust");
        assert_eq!(tokens[0].content, "fn main() {}\n");
        assert_eq!(tokens[1].content, "indented\n");
    }

    #[test]
    fn links_and_images_become_inline_children() {
        let tokens = tokenize("[next](b.md#top) ![a *cat*](cat.png \"Cat\")\n");
        let children = &tokens[1].children;
        assert_eq!(
            kinds(children),
            vec!["link_open", "text", "link_close", "text", "image"]
        );
        assert_eq!(children[0].attr("href"), Some("b.md#top"));
        let image = &children[4];
        assert_eq!(image.attr("src"), Some("cat.png"));
        assert_eq!(image.attr("alt"), Some("a cat"));
        assert_eq!(image.attr("title"), Some("Cat"));
    }

    #[test]
    fn email_autolinks_get_a_mailto_href() {
        let tokens = tokenize("Mail <someone@example.com> or <https://example.com>\n");
        let hrefs: Vec<&str> = tokens[1]
            .children
            .iter()
            .filter_map(|t| t.attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            vec!["mailto:someone@example.com", "https://example.com"]
        );
    }

    #[test]
    fn task_markers_and_rules() {
        let tokens = tokenize("- [x] done\n\n---\n");
        let inline = tokens.iter().find(|t| t.kind == "inline").unwrap();
        assert_eq!(inline.children[0].content, "[x] ");
        assert_eq!(tokens.last().map(|t| t.kind.as_str()), Some("hr"));
    }

    #[test]
    fn soft_and_hard_breaks() {
        let tokens = tokenize("a\nb  \nc\n");
        assert_eq!(
            kinds(&tokens[1].children),
            vec!["text", "softbreak", "text", "hardbreak", "text"]
        );
    }
}
