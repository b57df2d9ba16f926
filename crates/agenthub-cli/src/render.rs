use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use bat::WrappingMode;
use tracing::warn;

use crate::prompt::Theme;

/// How a piece of assistant text ended up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    Nothing,
    Markdown,
    PlainText,
}

pub fn bat_theme(theme: &Theme) -> &'static str {
    match theme {
        Theme::Light => "GitHub",
        Theme::Dark => "zenburn",
    }
}

/// Prints `content` as highlighted markdown. Text the highlighter chokes on,
/// whether it returns an error or panics, is printed verbatim instead.
pub fn print_markdown(content: &str, theme: &Theme) -> Rendered {
    let theme = bat_theme(theme);
    render_with(content, |text| {
        bat::PrettyPrinter::new()
            .input(bat::Input::from_bytes(text.as_bytes()))
            .theme(theme)
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character)
            .print()
            .map(|_| ())
            .map_err(|e| anyhow!(e.to_string()))
    })
}

pub(crate) fn render_with<F>(content: &str, render: F) -> Rendered
where
    F: FnOnce(&str) -> anyhow::Result<()>,
{
    if content.is_empty() {
        return Rendered::Nothing;
    }

    match panic::catch_unwind(AssertUnwindSafe(|| render(content))) {
        Ok(Ok(())) => Rendered::Markdown,
        Ok(Err(err)) => {
            warn!("markdown rendering failed, printing plain text: {}", err);
            println!("{}", content);
            Rendered::PlainText
        }
        Err(_) => {
            warn!("markdown renderer panicked, printing plain text");
            println!("{}", content);
            Rendered::PlainText
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_renders_nothing() {
        let mut called = false;
        let outcome = render_with("", |_| {
            called = true;
            Ok(())
        });
        assert_eq!(outcome, Rendered::Nothing);
        assert!(!called);
    }

    #[test]
    fn test_successful_render() {
        let outcome = render_with("**bold**", |text| {
            assert_eq!(text, "**bold**");
            Ok(())
        });
        assert_eq!(outcome, Rendered::Markdown);
    }

    #[test]
    fn test_render_error_falls_back() {
        let outcome = render_with("| broken table", |_| Err(anyhow!("bad input")));
        assert_eq!(outcome, Rendered::PlainText);
    }

    #[test]
    fn test_render_panic_falls_back() {
        let outcome = render_with("```unterminated", |_| panic!("highlighter blew up"));
        assert_eq!(outcome, Rendered::PlainText);
    }

    #[test]
    fn test_themes() {
        assert_eq!(bat_theme(&Theme::Light), "GitHub");
        assert_eq!(bat_theme(&Theme::Dark), "zenburn");
    }
}
