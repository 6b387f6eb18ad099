use crate::command::Command;
use crate::consts;
use crate::logo::Logo;
use crate::options::{Adjustable, TuneKey, TuneValue, Tuning};
use crate::scores::ScoreRecord;
use crate::util::{get_display_area, EnumExt};
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Widget,
    Frame,
};

/// How many recent results to show under the high score
const RECENT_SHOWN: usize = 3;

/// What the user picked on the startup screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StartupChoice {
    Play,
    Calibrate,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct StartupScreen {
    selection: Selection,
    menu: TuningMenu,
    high_score: u32,
    /// Most recent results, newest first.
    recent: Vec<ScoreRecord>,
    runs: usize,
}

impl StartupScreen {
    pub(crate) fn new(tuning: Tuning, high_score: u32, history: &[ScoreRecord]) -> Self {
        let recent = history.iter().rev().take(RECENT_SHOWN).cloned().collect();
        StartupScreen {
            selection: Selection::default(),
            menu: TuningMenu::new(tuning),
            high_score,
            recent,
            runs: history.len(),
        }
    }

    pub(crate) fn tuning(&self) -> Tuning {
        self.menu.tuning
    }

    pub(crate) fn draw(&self, frame: &mut Frame<'_>) {
        frame.render_widget(self, frame.area());
    }

    pub(crate) fn handle_command(&mut self, cmd: Command) -> Option<StartupChoice> {
        match cmd {
            Command::Quit | Command::Q => return Some(StartupChoice::Quit),
            Command::C => return Some(StartupChoice::Calibrate),
            _ => (),
        }
        match (self.selection, cmd) {
            (Selection::PlayButton, Command::Enter | Command::Space) => {
                return Some(StartupChoice::Play);
            }
            (Selection::PlayButton, Command::Down) => {
                self.selection = Selection::Options;
                self.menu.active = true;
            }
            (Selection::Options, Command::Up) => {
                self.selection = self.menu.move_up();
            }
            (Selection::Options, Command::Down) => {
                self.selection = self.menu.move_down();
            }
            (Selection::Options, Command::Left) => self.menu.adjust(Adjustable::decrease),
            (Selection::Options, Command::Right) => self.menu.adjust(Adjustable::increase),
            (Selection::Options, Command::Enter | Command::Space) => {
                self.menu.adjust(Adjustable::toggle);
            }
            (Selection::QuitButton, Command::Enter) => return Some(StartupChoice::Quit),
            (Selection::QuitButton, Command::Up) => {
                self.selection = Selection::Options;
                self.menu.active = true;
                self.menu.selected = TuneKey::max();
            }
            _ => (),
        }
        None
    }
}

impl Widget for &StartupScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let display = get_display_area(area);
        let [logo_area] = Layout::horizontal([Logo::WIDTH])
            .flex(Flex::Center)
            .areas(Rect {
                height: Logo::HEIGHT,
                ..display
            });
        Logo.render(logo_area, buf);
        let mut y = display.y + Logo::HEIGHT;

        let row = |y| Rect {
            y,
            height: 1,
            ..display
        };
        Line::from_iter([
            Span::raw("High score: "),
            Span::styled(self.high_score.to_string(), consts::KEY_STYLE),
            Span::raw(format!("   Runs: {}", self.runs)),
        ])
        .centered()
        .render(row(y), buf);
        y += 1;
        for record in &self.recent {
            let when = record
                .time
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M");
            Line::raw(format!("{when}  —  {} pts", record.score))
                .centered()
                .render(row(y), buf);
            y += 1;
        }
        y += 1;

        let play_style = if self.selection == Selection::PlayButton {
            consts::MENU_SELECTION_STYLE
        } else {
            Style::new()
        };
        Line::from(Span::styled("[Play (Enter)]", play_style))
            .centered()
            .render(row(y), buf);
        y += 2;

        let [menu_area] = Layout::horizontal([TuningMenu::WIDTH])
            .flex(Flex::Center)
            .areas(Rect {
                y,
                height: TuningMenu::HEIGHT,
                ..display
            });
        (&self.menu).render(menu_area, buf);
        y += TuningMenu::HEIGHT + 1;

        let quit_style = if self.selection == Selection::QuitButton {
            consts::MENU_SELECTION_STYLE
        } else {
            Style::new()
        };
        Line::from(Span::styled("[Quit (q)]", quit_style))
            .centered()
            .render(row(y), buf);
        y += 2;

        Line::from_iter([
            Span::raw("Calibrate ("),
            Span::styled("c", consts::KEY_STYLE),
            Span::raw(") with your head at rest — or steer with the arrow keys"),
        ])
        .centered()
        .render(row(y), buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Selection {
    #[default]
    PlayButton,
    Options,
    QuitButton,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct TuningMenu {
    /// Is the currently-selected startup screen item an element of this
    /// menu?
    active: bool,
    selected: TuneKey,
    tuning: Tuning,
}

impl TuningMenu {
    const WIDTH: u16 = TuneKey::DISPLAY_WIDTH + 2 + TuneValue::DISPLAY_WIDTH;
    const HEIGHT: u16 = 4;

    fn new(tuning: Tuning) -> TuningMenu {
        TuningMenu {
            active: false,
            selected: TuneKey::min(),
            tuning,
        }
    }

    fn move_up(&mut self) -> Selection {
        match self.selected.prev() {
            Some(key) => {
                self.selected = key;
                Selection::Options
            }
            None => {
                self.active = false;
                Selection::PlayButton
            }
        }
    }

    fn move_down(&mut self) -> Selection {
        match self.selected.next() {
            Some(key) => {
                self.selected = key;
                Selection::Options
            }
            None => {
                self.active = false;
                Selection::QuitButton
            }
        }
    }

    /// Apply one of the [`Adjustable`] operations to the selected value.
    fn adjust(&mut self, op: fn(&mut TuneValue)) {
        let mut value = self.tuning.get(self.selected);
        op(&mut value);
        self.tuning.set(self.selected, value);
    }
}

impl Widget for &TuningMenu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (key, row) in TuneKey::iter().zip(area.rows()) {
            let style = if self.active && self.selected == key {
                consts::MENU_SELECTION_STYLE
            } else {
                Style::new()
            };
            Line::styled(
                format!(
                    "{key:kw$}  {value}",
                    value = self.tuning.get(key),
                    kw = usize::from(TuneKey::DISPLAY_WIDTH)
                ),
                style,
            )
            .render(row, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Sensitivity;

    fn screen() -> StartupScreen {
        StartupScreen::new(Tuning::default(), 120, &[])
    }

    #[test]
    fn enter_on_play_starts_a_game() {
        let mut screen = screen();
        assert_eq!(
            screen.handle_command(Command::Enter),
            Some(StartupChoice::Play)
        );
    }

    #[test]
    fn navigation_reaches_every_stop() {
        let mut screen = screen();
        assert_eq!(screen.handle_command(Command::Down), None);
        assert_eq!(screen.selection, Selection::Options);
        for _ in 0..TuningMenu::HEIGHT {
            assert_eq!(screen.handle_command(Command::Down), None);
        }
        assert_eq!(screen.selection, Selection::QuitButton);
        assert_eq!(
            screen.handle_command(Command::Enter),
            Some(StartupChoice::Quit)
        );
        // And back up through the menu to the play button.
        assert_eq!(screen.handle_command(Command::Up), None);
        assert_eq!(screen.selection, Selection::Options);
        assert_eq!(screen.menu.selected, TuneKey::MaxRate);
        for _ in 0..TuningMenu::HEIGHT {
            screen.handle_command(Command::Up);
        }
        assert_eq!(screen.selection, Selection::PlayButton);
    }

    #[test]
    fn adjusting_the_selected_value() {
        let mut screen = screen();
        screen.handle_command(Command::Down);
        assert_eq!(screen.menu.selected, TuneKey::Sensitivity);
        screen.handle_command(Command::Right);
        assert_eq!(
            screen.tuning().sensitivity,
            Sensitivity::from_factor(1.1)
        );
        screen.handle_command(Command::Left);
        assert_eq!(screen.tuning().sensitivity, Sensitivity::from_factor(1.0));
    }

    #[test]
    fn toggling_the_mirror_flag() {
        let mut screen = screen();
        screen.handle_command(Command::Down);
        screen.handle_command(Command::Down);
        screen.handle_command(Command::Down);
        assert_eq!(screen.menu.selected, TuneKey::Mirror);
        screen.handle_command(Command::Space);
        assert!(screen.tuning().mirror);
        screen.handle_command(Command::Space);
        assert!(!screen.tuning().mirror);
    }

    #[test]
    fn calibrate_and_quit_shortcuts() {
        let mut screen = screen();
        assert_eq!(
            screen.handle_command(Command::C),
            Some(StartupChoice::Calibrate)
        );
        assert_eq!(
            screen.handle_command(Command::Q),
            Some(StartupChoice::Quit)
        );
    }

    #[test]
    fn menu_height_matches_the_key_count() {
        assert_eq!(usize::from(TuningMenu::HEIGHT), TuneKey::iter().count());
    }
}
