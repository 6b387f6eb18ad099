mod direction;
mod snake;
pub(crate) use self::direction::Direction;
use self::snake::Snake;
use crate::consts;
use rand::{seq::IteratorRandom, Rng};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A cell on the square game board.  Both coordinates lie in
/// `[0, tiles)`, with the origin at the top-left corner.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: u16,
    pub(crate) y: u16,
}

impl Point {
    pub(crate) const fn new(x: u16, y: u16) -> Point {
        Point { x, y }
    }
}

/// What a single tick did, surfaced to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TickOutcome {
    /// The snake moved onto a free cell.
    Moved,
    /// The snake ate; `score` is the updated total.
    Ate { score: u32 },
    /// The snake hit a wall or itself.  The run is over and the tick source
    /// has been stopped.
    GameOver { score: u32 },
    /// The snake covered the whole board, leaving nowhere to put food.
    Won { score: u32 },
}

/// The game state machine.
///
/// Holds the board between runs ("idle") and advances it on fixed-period
/// ticks while running.  The caller owns the clock: it watches
/// [`Game::next_tick`] and calls [`Game::tick`] when the deadline passes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Game<R = rand::rngs::ThreadRng> {
    rng: R,
    tiles: u16,
    tick_period: Duration,
    snake: Snake,
    food: Option<Point>,
    direction: Direction,
    pending: Option<Direction>,
    score: u32,
    running: bool,
    next_tick: Option<Instant>,
}

impl Game<rand::rngs::ThreadRng> {
    pub(crate) fn new(tiles: u16, tick_period: Duration) -> Game {
        Game::new_with_rng(tiles, tick_period, rand::rng())
    }
}

impl<R: Rng> Game<R> {
    pub(crate) fn new_with_rng(tiles: u16, tick_period: Duration, rng: R) -> Game<R> {
        let mut game = Game {
            rng,
            tiles,
            tick_period,
            snake: Snake::new(Point::new(tiles / 2, tiles / 2)),
            food: None,
            direction: Direction::Right,
            pending: None,
            score: 0,
            running: false,
            next_tick: None,
        };
        game.reset();
        game
    }

    /// Put the board back into its starting state: a single-segment snake
    /// at the center facing right, score zero, fresh food, not running.
    pub(crate) fn reset(&mut self) {
        self.snake = Snake::new(Point::new(self.tiles / 2, self.tiles / 2));
        self.direction = Direction::Right;
        self.pending = None;
        self.score = 0;
        self.running = false;
        self.next_tick = None;
        self.food = self.place_food();
    }

    /// Reset and begin ticking.  No-op while a run is already in progress.
    pub(crate) fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.reset();
        self.running = true;
        self.next_tick = Some(now + self.tick_period);
    }

    /// Cancel the tick source.  Idempotent.
    pub(crate) fn stop(&mut self) {
        self.running = false;
        self.next_tick = None;
    }

    /// Queue a turn to be committed on the next tick.  A turn onto the
    /// opposite of the committed direction is dropped.  The queued value is
    /// checked against the *committed* direction, so two quick turns within
    /// one tick cannot smuggle in a reversal either.
    pub(crate) fn set_direction(&mut self, dir: Direction) {
        if dir == self.direction.opposite() {
            return;
        }
        self.pending = Some(dir);
    }

    /// Advance the board by one tick: commit the queued turn, move the head
    /// one cell, and resolve wall/self collisions and food.  Returns `None`
    /// when not running.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<TickOutcome> {
        if !self.running {
            return None;
        }
        self.next_tick = Some(now + self.tick_period);
        if let Some(dir) = self.pending.take() {
            self.direction = dir;
        }
        let Some(head) = self.direction.advance(self.snake.head(), self.tiles) else {
            self.stop();
            return Some(TickOutcome::GameOver { score: self.score });
        };
        if self.snake.occupies(head) {
            self.stop();
            return Some(TickOutcome::GameOver { score: self.score });
        }
        let ate = self.food == Some(head);
        self.snake.advance(head, ate);
        if !ate {
            return Some(TickOutcome::Moved);
        }
        self.score += consts::FOOD_REWARD;
        self.food = self.place_food();
        if self.food.is_none() {
            self.stop();
            return Some(TickOutcome::Won { score: self.score });
        }
        Some(TickOutcome::Ate { score: self.score })
    }

    /// Pick a cell for the food that the snake does not occupy.  Random
    /// probes first; a sweep over the remaining free cells once the board
    /// is nearly full.  `None` only when no free cell exists.
    fn place_food(&mut self) -> Option<Point> {
        for _ in 0..consts::FOOD_PLACEMENT_TRIES {
            let pos = Point::new(
                self.rng.random_range(0..self.tiles),
                self.rng.random_range(0..self.tiles),
            );
            if !self.snake.occupies(pos) {
                return Some(pos);
            }
        }
        let tiles = self.tiles;
        let Game { rng, snake, .. } = self;
        (0..tiles)
            .flat_map(|y| (0..tiles).map(move |x| Point::new(x, y)))
            .filter(|&pos| !snake.occupies(pos))
            .choose(rng)
    }
}

impl<R> Game<R> {
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Deadline of the next tick, while running.
    pub(crate) fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn tiles(&self) -> u16 {
        self.tiles
    }

    pub(crate) fn food(&self) -> Option<Point> {
        self.food
    }

    pub(crate) fn head(&self) -> Point {
        self.snake.head()
    }

    /// Positions of the snake's trailing segments.
    pub(crate) fn body(&self) -> &VecDeque<Point> {
        self.snake.body()
    }

    pub(crate) fn snake_len(&self) -> usize {
        self.snake.len()
    }

    /// Glyph for drawing the snake's head in its travel direction.
    pub(crate) fn head_symbol(&self) -> char {
        match self.direction {
            Direction::Up => consts::SNAKE_HEAD_UP_SYMBOL,
            Direction::Down => consts::SNAKE_HEAD_DOWN_SYMBOL,
            Direction::Left => consts::SNAKE_HEAD_LEFT_SYMBOL,
            Direction::Right => consts::SNAKE_HEAD_RIGHT_SYMBOL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    const RNG_SEED: u64 = 0x0123456789ABCDEF;

    fn game() -> Game<ChaCha12Rng> {
        Game::new_with_rng(
            20,
            Duration::from_millis(consts::TICK_PERIOD_MS),
            ChaCha12Rng::seed_from_u64(RNG_SEED),
        )
    }

    fn started() -> (Game<ChaCha12Rng>, Instant) {
        let mut game = game();
        let now = Instant::now();
        game.start(now);
        // Keep the food out of the way unless a test places it.
        game.food = Some(Point::new(0, 19));
        (game, now)
    }

    #[test]
    fn fresh_game() {
        let game = game();
        assert!(!game.is_running());
        assert_eq!(game.score(), 0);
        assert_eq!(game.head(), Point::new(10, 10));
        assert_eq!(game.snake_len(), 1);
        assert_eq!(game.next_tick(), None);
        let food = game.food.expect("food should be placed");
        assert!(!game.snake.occupies(food));
    }

    #[test]
    fn head_moves_one_cell_per_tick() {
        let (mut game, now) = started();
        let before = game.head();
        assert_eq!(game.tick(now), Some(TickOutcome::Moved));
        assert_eq!(game.head(), Point::new(before.x + 1, before.y));
        assert_eq!(game.snake_len(), 1);
    }

    #[test]
    fn queued_turn_commits_on_next_tick() {
        let (mut game, now) = started();
        let before = game.head();
        game.set_direction(Direction::Down);
        // Not applied until the tick runs.
        assert_eq!(game.direction, Direction::Right);
        game.tick(now);
        assert_eq!(game.direction, Direction::Down);
        assert_eq!(game.head(), Point::new(before.x, before.y + 1));
    }

    #[test]
    fn reversal_is_ignored() {
        let (mut game, now) = started();
        let before = game.head();
        game.set_direction(Direction::Left);
        game.tick(now);
        assert_eq!(game.direction, Direction::Right);
        assert_eq!(game.head(), Point::new(before.x + 1, before.y));
    }

    #[test]
    fn reversal_cannot_sneak_in_behind_a_queued_turn() {
        let (mut game, now) = started();
        // Turning down and then "left" within one tick must not commit the
        // reversal: left is still the opposite of the committed direction.
        game.set_direction(Direction::Down);
        game.set_direction(Direction::Left);
        game.tick(now);
        assert_eq!(game.direction, Direction::Down);
    }

    #[test]
    fn reversal_of_committed_turn_is_ignored() {
        let (mut game, now) = started();
        game.set_direction(Direction::Down);
        game.tick(now);
        game.set_direction(Direction::Up);
        let before = game.head();
        game.tick(now);
        assert_eq!(game.head(), Point::new(before.x, before.y + 1));
    }

    #[test]
    fn eating_food_scores_and_grows() {
        let (mut game, now) = started();
        let head = game.head();
        game.food = Some(Point::new(head.x + 1, head.y));
        assert_eq!(game.tick(now), Some(TickOutcome::Ate { score: 10 }));
        assert_eq!(game.score(), 10);
        assert_eq!(game.snake_len(), 2);
        let food = game.food.expect("new food should be placed");
        assert!(!game.snake.occupies(food));
    }

    #[test]
    fn moving_without_food_keeps_length_and_score() {
        let (mut game, now) = started();
        for _ in 0..5 {
            assert_eq!(game.tick(now), Some(TickOutcome::Moved));
        }
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake_len(), 1);
    }

    #[test]
    fn food_respawns_off_the_snake() {
        let (mut game, now) = started();
        for step in 0..4 {
            let head = game.head();
            game.food = Some(Point::new(head.x + 1, head.y));
            game.tick(now);
            assert_eq!(game.snake_len(), step + 2);
            let food = game.food.expect("food should be placed");
            assert!(!game.snake.occupies(food));
        }
    }

    #[test]
    fn wall_collision_ends_the_run_once() {
        let (mut game, now) = started();
        game.snake = Snake::new(Point::new(19, 10));
        assert_eq!(game.tick(now), Some(TickOutcome::GameOver { score: 0 }));
        assert!(!game.is_running());
        assert_eq!(game.next_tick(), None);
        // The tick source is stopped; further ticks do nothing.
        assert_eq!(game.tick(now), None);
    }

    #[test]
    fn self_collision_ends_the_run() {
        let (mut game, now) = started();
        // A hook of body directly above the head; turning up runs into it.
        let head = game.head();
        game.snake.body = VecDeque::from([
            Point::new(head.x, head.y - 1),
            Point::new(head.x - 1, head.y - 1),
            Point::new(head.x - 1, head.y),
        ]);
        game.set_direction(Direction::Up);
        assert_eq!(game.tick(now), Some(TickOutcome::GameOver { score: 0 }));
        assert!(!game.is_running());
    }

    #[test]
    fn filling_the_board_wins() {
        let mut game = Game::new_with_rng(
            2,
            Duration::from_millis(consts::TICK_PERIOD_MS),
            ChaCha12Rng::seed_from_u64(RNG_SEED),
        );
        let now = Instant::now();
        game.start(now);
        game.snake = Snake::new(Point::new(0, 0));
        game.snake.body = VecDeque::from([Point::new(0, 1), Point::new(1, 1)]);
        game.direction = Direction::Right;
        game.food = Some(Point::new(1, 0));
        assert_eq!(game.tick(now), Some(TickOutcome::Won { score: 10 }));
        assert!(!game.is_running());
        assert_eq!(game.food(), None);
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let (mut game, now) = started();
        game.score = 30;
        game.start(now);
        assert_eq!(game.score(), 30);
    }

    #[test]
    fn start_after_a_run_resets() {
        let (mut game, now) = started();
        game.snake = Snake::new(Point::new(19, 10));
        game.tick(now);
        game.start(now);
        assert!(game.is_running());
        assert_eq!(game.score(), 0);
        assert_eq!(game.head(), Point::new(10, 10));
        assert!(game.next_tick().is_some());
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut game, _) = started();
        game.stop();
        game.stop();
        assert!(!game.is_running());
        assert_eq!(game.next_tick(), None);
    }
}
