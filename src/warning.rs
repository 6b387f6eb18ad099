use crate::command::Command;
use crate::consts;
use crate::util::center_rect;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect, Size},
    text::{Line, Span},
    widgets::{
        block::{Block, Padding},
        Clear, Widget,
    },
};
use std::borrow::Cow;
use unicode_width::UnicodeWidthStr;

/// A dismissable pop-up reporting an error and its chain of causes.
///
/// Each failure surfaces exactly once: the overlay is built when the error
/// happens and dropped when the user dismisses it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Warning {
    lines: Vec<String>,
}

impl Warning {
    const TEXT_WIDTH: usize = 44;

    /// Width of the dismissal hint, the narrowest the overlay will go.
    const MIN_WIDTH: u16 = 25;

    pub(crate) fn new(e: &dyn std::error::Error) -> Warning {
        let mut msgs = vec![e.to_string()];
        let mut source = e.source();
        while let Some(src) = source {
            msgs.push(src.to_string());
            source = src.source();
        }
        Warning::from_messages(msgs)
    }

    fn from_messages(msgs: Vec<String>) -> Warning {
        let mut lines = Vec::new();
        let opts = textwrap::Options::new(Warning::TEXT_WIDTH).break_words(true);
        let mut msgs = msgs.into_iter();
        if let Some(head) = msgs.next() {
            lines.extend(textwrap::wrap(&head, opts).into_iter().map(Cow::into_owned));
        }
        let mut any_cause = false;
        for cause in msgs {
            if !any_cause {
                lines.push(String::new());
                lines.push(String::from("Caused by:"));
                any_cause = true;
            }
            let opts = textwrap::Options::new(Warning::TEXT_WIDTH)
                .break_words(true)
                .initial_indent("  - ")
                .subsequent_indent("    ");
            lines.extend(
                textwrap::wrap(&cause, opts)
                    .into_iter()
                    .map(Cow::into_owned),
            );
        }
        Warning { lines }
    }

    /// Handle an input command.  Returns `Some` when the user is done with
    /// the overlay.
    pub(crate) fn handle_command(&mut self, cmd: Command) -> Option<WarningOutcome> {
        match cmd {
            Command::Enter | Command::Space | Command::Esc => Some(WarningOutcome::Dismissed),
            Command::Quit => Some(WarningOutcome::Quit),
            _ => None,
        }
    }

    fn text_width(&self) -> u16 {
        self.lines
            .iter()
            .map(|line| u16::try_from(line.width()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WarningOutcome {
    Dismissed,
    Quit,
}

impl Widget for &Warning {
    // `area` is the whole display area; the overlay centers itself inside.
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = u16::try_from(self.lines.len())
            .unwrap_or(u16::MAX)
            .saturating_add(4);
        let block_area = center_rect(
            area,
            Size {
                width: self.text_width().max(Warning::MIN_WIDTH).saturating_add(4),
                height,
            },
        );
        let block = Block::bordered()
            .title(" PROBLEM ")
            .title_alignment(Alignment::Center)
            .padding(Padding::horizontal(1));
        let inner = block.inner(block_area);
        Clear.render(block_area, buf);
        block.render(block_area, buf);
        let mut rows = inner.rows();
        for (line, row) in self.lines.iter().zip(rows.by_ref()) {
            Line::raw(line.as_str()).render(row, buf);
        }
        if let Some(ok_row) = rows.last() {
            Line::from_iter([
                Span::raw("[Press "),
                Span::styled("Enter", consts::KEY_STYLE),
                Span::raw(" to continue]"),
            ])
            .centered()
            .render(ok_row, buf);
        }
    }
}
