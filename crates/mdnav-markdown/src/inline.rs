//! Resolving inline token children into a single styled run.

use ratatui::style::Style;

use crate::error::BuildError;
use crate::error::BuildResult;
use crate::style::ClickAction;
use crate::style::InlineStyle;
use crate::style::StyleClass;
use crate::style::StyleRun;
use crate::token::Token;

/// Placeholder shown in place of an image.
pub const IMAGE_GLYPH: &str = "🖼  ";

/// Resolves the children of one `inline` token into a single [`StyleRun`].
///
/// Styles accumulate on a stack: every `*_open` pushes the current style plus its overlay and every
/// `*_close` pops. `code_inline` applies its overlay to its own text only, and an `image` applies
/// its click target to its own placeholder and alt text only.
///
/// A `*_close` with nothing left to pop is a malformed stream and fails the whole run.
pub fn resolve_inline<F>(children: &[Token], class_style: &F) -> BuildResult<StyleRun>
where
    F: Fn(StyleClass) -> Style,
{
    let mut stack: Vec<InlineStyle> = vec![InlineStyle::default()];
    let mut run = StyleRun::new();

    for child in children {
        let effective = stack.last().cloned().unwrap_or_default();
        match child.kind.as_str() {
            "text" => run.push(child.content.as_str(), effective),
            "softbreak" => run.push(" ", effective),
            "hardbreak" => run.push("\n", effective),
            "code_inline" => run.push(
                child.content.as_str(),
                effective.with_overlay(class_style(StyleClass::CodeInline)),
            ),
            "em_open" => stack.push(effective.with_overlay(class_style(StyleClass::Emphasis))),
            "strong_open" => stack.push(effective.with_overlay(class_style(StyleClass::Strong))),
            "s_open" => stack.push(effective.with_overlay(class_style(StyleClass::Strike))),
            "link_open" => {
                let href = child.attr("href").unwrap_or_default().to_string();
                stack.push(effective.with_action(ClickAction::Link(href)));
            }
            "image" => {
                let src = child.attr("src").unwrap_or_default().to_string();
                let image = effective.with_action(ClickAction::Image(src));
                run.push(IMAGE_GLYPH, image.clone());
                if let Some(alt) = child.attr("alt").filter(|alt| !alt.is_empty()) {
                    run.push(format!("({alt})"), image.clone());
                }
                for grandchild in &child.children {
                    run.push(grandchild.content.as_str(), image.clone());
                }
            }
            kind if kind.ends_with("_close") => {
                if stack.len() <= 1 {
                    return Err(BuildError::UnbalancedInlineClose {
                        kind: kind.to_string(),
                    });
                }
                stack.pop();
            }
            // html_inline and anything a newer tokenizer invents.
            _ => {}
        }
    }

    Ok(run)
}
