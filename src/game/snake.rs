use super::Point;
use std::collections::VecDeque;

/// Snake state.
///
/// The head is stored apart from the trailing segments; `body` holds the
/// rest of the snake, nearest-to-head first.  Cells only ever enter at the
/// head and leave at the tail, so the order is always the travel order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Snake {
    pub(super) head: Point,
    pub(super) body: VecDeque<Point>,
}

impl Snake {
    /// Create a single-segment snake with its head at `head`.
    pub(super) fn new(head: Point) -> Snake {
        Snake {
            head,
            body: VecDeque::new(),
        }
    }

    pub(super) fn head(&self) -> Point {
        self.head
    }

    /// Total number of cells the snake occupies.
    pub(super) fn len(&self) -> usize {
        1 + self.body.len()
    }

    /// Whether any segment, head included, sits on `pos`.
    pub(super) fn occupies(&self, pos: Point) -> bool {
        self.head == pos || self.body.contains(&pos)
    }

    /// Move the head to `pos`; the old head becomes the first body segment.
    /// The tail is kept when `grow` is true, so the snake lengthens by one
    /// cell; otherwise it is dropped and the length is unchanged.
    pub(super) fn advance(&mut self, pos: Point, grow: bool) {
        self.body.push_front(self.head);
        self.head = pos;
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Positions of the trailing segments, nearest-to-head first.
    pub(super) fn body(&self) -> &VecDeque<Point> {
        &self.body
    }
}
