// src/orders/queue.rs

//! Fixed-capacity ring buffer holding the blocking orders.
//!
//! Orders are only ever appended; the queue grows until it is full and keeps
//! its contents for the life of the process. Lookups accept negative indices
//! counted from the newest element, `-1` being the last one added.

use thiserror::Error;

use super::Order;

pub const ORDER_QUEUE_CAPACITY: usize = 15;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("queue is empty")]
    Empty,
    #[error("no element at index {0}")]
    NotFound(isize),
}

#[derive(Debug, Clone)]
pub struct OrderQueue {
    slots: [Option<Order>; ORDER_QUEUE_CAPACITY],
    count: usize,
    /// Physical slot of the oldest element.
    start: usize,
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderQueue {
    pub const fn capacity() -> usize {
        ORDER_QUEUE_CAPACITY
    }

    pub fn new() -> Self {
        OrderQueue {
            slots: Default::default(),
            count: 0,
            start: ORDER_QUEUE_CAPACITY - 1,
        }
    }

    /// Empties the queue.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    fn slot(&self, offset: usize) -> usize {
        (self.start + offset) % ORDER_QUEUE_CAPACITY
    }

    /// Appends `order` after the newest element and returns the stored copy.
    /// A full queue is left untouched.
    pub fn add(&mut self, order: Order) -> Result<&Order, QueueError> {
        if self.count == ORDER_QUEUE_CAPACITY {
            return Err(QueueError::Full);
        }
        let slot = self.slot(self.count);
        self.count += 1;
        let stored: &Order = self.slots[slot].insert(order);
        Ok(stored)
    }

    pub fn first(&self) -> Result<&Order, QueueError> {
        self.get(0).map_err(|_| QueueError::Empty)
    }

    pub fn last(&self) -> Result<&Order, QueueError> {
        self.get(-1).map_err(|_| QueueError::Empty)
    }

    /// `0..count` counts from the oldest element, `-count..=-1` from the
    /// newest.
    pub fn get(&self, index: isize) -> Result<&Order, QueueError> {
        let count = self.count as isize;
        let offset = match index {
            i if (0..count).contains(&i) => i,
            i if (-count..0).contains(&i) => count + i,
            i => return Err(QueueError::NotFound(i)),
        };
        self.slots[self.slot(offset as usize)]
            .as_ref()
            .ok_or(QueueError::NotFound(index))
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        (0..self.count).filter_map(move |offset| self.slots[self.slot(offset)].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::MessageStyle;

    fn message(text: &str) -> Order {
        Order::Message {
            text: text.to_string(),
            style: MessageStyle::Scroll,
        }
    }

    fn abc() -> OrderQueue {
        let mut queue = OrderQueue::new();
        for text in ["A", "B", "C"] {
            queue.add(message(text)).unwrap();
        }
        queue
    }

    #[test]
    fn empty_queue_has_no_first_or_last() {
        let queue = OrderQueue::new();
        assert_eq!(queue.count(), 0);
        assert_eq!(queue.first(), Err(QueueError::Empty));
        assert_eq!(queue.last(), Err(QueueError::Empty));
        assert_eq!(queue.get(0), Err(QueueError::NotFound(0)));
        assert_eq!(queue.get(-1), Err(QueueError::NotFound(-1)));
    }

    #[test]
    fn add_returns_the_stored_copy() {
        let mut queue = OrderQueue::new();
        let stored = queue.add(Order::Uptime).unwrap();
        assert_eq!(stored, &Order::Uptime);
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn forward_and_backward_indexing() {
        let queue = abc();
        assert_eq!(queue.get(0), Ok(&message("A")));
        assert_eq!(queue.get(1), Ok(&message("B")));
        assert_eq!(queue.get(2), Ok(&message("C")));
        assert_eq!(queue.get(-1), Ok(&message("C")));
        assert_eq!(queue.get(-2), Ok(&message("B")));
        assert_eq!(queue.get(-3), Ok(&message("A")));
        assert_eq!(queue.get(3), Err(QueueError::NotFound(3)));
        assert_eq!(queue.get(-4), Err(QueueError::NotFound(-4)));
    }

    #[test]
    fn first_and_last_follow_insertion_order() {
        let queue = abc();
        assert_eq!(queue.first(), Ok(&message("A")));
        assert_eq!(queue.last(), queue.get(-1));
        let texts: Vec<_> = queue.iter().cloned().collect();
        assert_eq!(texts, vec![message("A"), message("B"), message("C")]);
    }

    #[test]
    fn sixteenth_add_is_rejected_without_changing_state() {
        let mut queue = OrderQueue::new();
        for n in 0..ORDER_QUEUE_CAPACITY {
            queue.add(message(&n.to_string())).unwrap();
            assert_eq!(queue.count(), n + 1);
            assert_eq!(queue.get(0), Ok(&message("0")));
            assert_eq!(queue.get(-1), queue.last());
        }

        assert_eq!(queue.add(message("overflow")), Err(QueueError::Full));
        assert_eq!(queue.count(), ORDER_QUEUE_CAPACITY);
        assert_eq!(queue.last(), Ok(&message("14")));
        assert_eq!(queue.get(-15), Ok(&message("0")));
        assert_eq!(queue.get(-16), Err(QueueError::NotFound(-16)));
    }

    #[test]
    fn init_is_idempotent() {
        let mut queue = abc();
        queue.init();
        queue.init();
        assert!(queue.is_empty());
        queue.add(message("again")).unwrap();
        assert_eq!(queue.first(), Ok(&message("again")));
    }
}
