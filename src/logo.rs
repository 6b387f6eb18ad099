use crate::consts;
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Widget,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Logo;

impl Logo {
    const NOD_WIDTH: u16 = 19;
    const SNAKE_WIDTH: u16 = 28;
    const TEXT_HEIGHT: u16 = 5;
    pub(crate) const HEIGHT: u16 = Self::TEXT_HEIGHT + 2;
    pub(crate) const WIDTH: u16 = Self::NOD_WIDTH + Self::SNAKE_WIDTH;

    #[rustfmt::skip]
    const NOD: [&'static str; Self::TEXT_HEIGHT as usize] = [
         " _   _           _ ",
        r"| \ | | ___   __| |",
        r"|  \| |/ _ \ / _` |",
         "| |\\  | (_) | (_| |",
        r"|_| \_|\___/ \__,_|",
    ];

    #[rustfmt::skip]
    const SNAKE: [&'static str; Self::TEXT_HEIGHT as usize] = [
         " ____              _        ",
         "/ ___| _ __   __ _| | _____ ",
        r"\___ \| '_ \ / _` | |/ / _ \",
         " ___) | | | | (_| |   <  __/",
        r"|____/|_| |_|\__,_|_|\_\___|",
    ];
}

impl Widget for Logo {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [area] = Layout::horizontal([Self::WIDTH])
            .flex(Flex::Start)
            .areas(area);
        let [words_area, diagram_area] = Layout::vertical([Self::TEXT_HEIGHT, 1])
            .flex(Flex::Start)
            .spacing(1)
            .areas(area);
        let [nod_area, snake_area] = Layout::horizontal([Self::NOD_WIDTH, Self::SNAKE_WIDTH])
            .flex(Flex::Start)
            .areas(words_area);
        Text::from_iter(Self::NOD)
            .style(consts::TRACKER_STATUS_STYLE)
            .render(nod_area, buf);
        Text::from_iter(Self::SNAKE)
            .style(consts::SNAKE_STYLE)
            .render(snake_area, buf);
        let body: String = std::iter::repeat(consts::SNAKE_BODY_SYMBOL).take(12).collect();
        Line::from_iter([
            Span::styled(body, consts::SNAKE_STYLE),
            Span::styled(
                consts::SNAKE_HEAD_RIGHT_SYMBOL.to_string(),
                consts::SNAKE_STYLE,
            ),
            Span::raw("  "),
            Span::styled(consts::FOOD_SYMBOL.to_string(), consts::FOOD_STYLE),
        ])
        .centered()
        .render(diagram_area, buf);
    }
}
