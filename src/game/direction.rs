use super::Point;

/// One of the four movement directions on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Translate `pos` by one cell within a `tiles`-by-`tiles` board.
    /// Returns `None` if the move would leave the board.
    pub(crate) fn advance(self, pos: Point, tiles: u16) -> Option<Point> {
        let Point { mut x, mut y } = pos;
        match self {
            Direction::Up => {
                y = decrement_in_bounds(y)?;
            }
            Direction::Down => {
                y = increment_in_bounds(y, tiles)?;
            }
            Direction::Left => {
                x = decrement_in_bounds(x)?;
            }
            Direction::Right => {
                x = increment_in_bounds(x, tiles)?;
            }
        }
        Some(Point { x, y })
    }

    /// The geometric opposite; the snake may never turn onto this in one
    /// step.
    pub(crate) fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

fn decrement_in_bounds(v: u16) -> Option<u16> {
    v.checked_sub(1)
}

fn increment_in_bounds(v: u16, max: u16) -> Option<u16> {
    v.checked_add(1).filter(|&v2| v2 < max)
}
