use crate::command::Command;
use crate::config::Theme;
use crate::consts;
use crate::game::{Direction, Game, Point, TickOutcome};
use crate::util::{center_rect, get_display_area};
use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Margin, Rect, Size},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Widget},
    Frame,
};
use std::time::Instant;

/// What the user picked on the play screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PlayChoice {
    ToMenu,
    Calibrate,
    Quit,
}

/// How the last run ended, for the message line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct RunEnd {
    won: bool,
    new_high: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct PlayScreen<R = rand::rngs::ThreadRng> {
    game: Game<R>,
    theme: Theme,
    high_score: u32,
    ended: Option<RunEnd>,
}

impl<R: Rng> PlayScreen<R> {
    pub(crate) fn new(game: Game<R>, theme: Theme, high_score: u32) -> PlayScreen<R> {
        PlayScreen {
            game,
            theme,
            high_score,
            ended: None,
        }
    }

    pub(crate) fn handle_command(&mut self, cmd: Command, now: Instant) -> Option<PlayChoice> {
        match cmd {
            Command::Quit => return Some(PlayChoice::Quit),
            Command::Up => self.game.set_direction(Direction::Up),
            Command::Down => self.game.set_direction(Direction::Down),
            Command::Left => self.game.set_direction(Direction::Left),
            Command::Right => self.game.set_direction(Direction::Right),
            Command::Esc => {
                self.game.stop();
                return Some(PlayChoice::ToMenu);
            }
            Command::R => {
                if !self.game.is_running() {
                    self.ended = None;
                    self.game.start(now);
                }
            }
            Command::Space | Command::Enter => {
                if !self.game.is_running() {
                    self.ended = None;
                    self.game.start(now);
                }
            }
            Command::C => {
                if !self.game.is_running() {
                    return Some(PlayChoice::Calibrate);
                }
            }
            Command::Q => {
                if !self.game.is_running() {
                    return Some(PlayChoice::Quit);
                }
            }
        }
        None
    }

    /// Run the tick if its deadline has passed, pushing the latest
    /// filtered direction into the game just before the move is computed.
    pub(crate) fn poll_tick(
        &mut self,
        now: Instant,
        steer: Option<Direction>,
    ) -> Option<TickOutcome> {
        if !self.game.next_tick().is_some_and(|when| now >= when) {
            return None;
        }
        if let Some(dir) = steer {
            self.game.set_direction(dir);
        }
        let outcome = self.game.tick(now)?;
        match outcome {
            TickOutcome::GameOver { .. } => {
                self.ended = Some(RunEnd {
                    won: false,
                    new_high: false,
                });
            }
            TickOutcome::Won { .. } => {
                self.ended = Some(RunEnd {
                    won: true,
                    new_high: false,
                });
            }
            TickOutcome::Moved | TickOutcome::Ate { .. } => (),
        }
        Some(outcome)
    }

    pub(crate) fn start(&mut self, now: Instant) {
        self.game.start(now);
    }
}

impl<R> PlayScreen<R> {
    pub(crate) fn draw(&self, frame: &mut Frame<'_>) {
        frame.render_widget(self, frame.area());
    }

    /// Deadline of the next tick while a run is in progress.
    pub(crate) fn next_tick(&self) -> Option<Instant> {
        self.game.next_tick()
    }

    /// Refresh the displayed high score after the run was recorded.
    pub(crate) fn update_high_score(&mut self, high_score: u32, new_record: bool) {
        self.high_score = high_score;
        if let Some(end) = &mut self.ended {
            end.new_high = new_record;
        }
    }
}

impl<R> Widget for &PlayScreen<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let display = get_display_area(area);
        let [score_area, board_area, msg_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(display);
        Line::styled(
            format!(
                " Score: {}    High: {}",
                self.game.score(),
                self.high_score
            ),
            self.theme.score_bar(),
        )
        .render(score_area, buf);

        let tiles = self.game.tiles();
        let block_area = center_rect(
            board_area,
            Size {
                width: tiles.saturating_add(2),
                height: tiles.saturating_add(2),
            },
        );
        Block::bordered().render(block_area, buf);
        let mut board = Canvas {
            area: block_area.inner(Margin::new(1, 1)),
            buf,
        };
        if let Some(food) = self.game.food() {
            board.draw_cell(food, consts::FOOD_SYMBOL, self.theme.food());
        }
        for &pos in self.game.body() {
            board.draw_cell(pos, consts::SNAKE_BODY_SYMBOL, self.theme.snake());
        }
        // The head goes last so a collision overwrites what it hit.
        if self.ended.is_some_and(|end| !end.won) {
            board.draw_cell(
                self.game.head(),
                consts::COLLISION_SYMBOL,
                consts::COLLISION_STYLE,
            );
        } else {
            board.draw_cell(self.game.head(), self.game.head_symbol(), self.theme.snake());
        }

        match self.ended {
            Some(end) => {
                let title = match (end.won, end.new_high) {
                    (true, true) => " — BOARD CLEARED — a new record!",
                    (true, false) => " — BOARD CLEARED —",
                    (false, true) => " — GAME OVER — a new record!",
                    (false, false) => " — GAME OVER —",
                };
                Line::from_iter([
                    Span::raw(title),
                    Span::raw("  Restart ("),
                    Span::styled("r", consts::KEY_STYLE),
                    Span::raw(") — Menu ("),
                    Span::styled("Esc", consts::KEY_STYLE),
                    Span::raw(") — Quit ("),
                    Span::styled("q", consts::KEY_STYLE),
                    Span::raw(")"),
                ])
                .render(msg_area, buf);
            }
            None if !self.game.is_running() => {
                Line::from_iter([
                    Span::raw(" Press "),
                    Span::styled("Space", consts::KEY_STYLE),
                    Span::raw(" to start"),
                ])
                .render(msg_area, buf);
            }
            None => (),
        }
    }
}

/// Maps board cells onto buffer cells inside the board block.
#[derive(Debug, Eq, PartialEq)]
struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Canvas<'_> {
    fn draw_cell(&mut self, pos: Point, symbol: char, style: Style) {
        let Some(x) = self.area.x.checked_add(pos.x) else {
            return;
        };
        let Some(y) = self.area.y.checked_add(pos.y) else {
            return;
        };
        if let Some(cell) = self.buf.cell_mut((x, y)) {
            cell.set_char(symbol);
            cell.set_style(Style::reset().patch(style));
        }
    }
}
