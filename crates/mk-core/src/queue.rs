//! Pending events awaiting transmission.

use crate::event::Event;

/// An in-memory queue that aggregates repeated events.
///
/// Pushing an event whose key and segmentation match a queued event merges
/// the two instead of appending. Insertion order of distinct events is kept.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event, aggregating it into a matching queued event if present.
    ///
    /// Returns true if the event was merged rather than appended.
    pub fn push(&mut self, event: Event) -> bool {
        if let Some(existing) = self.events.iter_mut().find(|e| e.same_bucket(&event)) {
            existing.absorb(&event);
            return true;
        }
        self.events.push(event);
        false
    }

    /// Removes and returns every queued event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Returns the queued events without removing them.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of distinct queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::event::Segmentation;

    fn event(key: &str, screen: Option<&str>, count: u32) -> Event {
        let mut segmentation = Segmentation::new();
        if let Some(screen) = screen {
            segmentation.insert("screen".to_string(), screen.to_string());
        }
        Event::new(key, segmentation, count, None, Utc::now()).unwrap()
    }

    #[test]
    fn push_aggregates_matching_events() {
        let mut queue = EventQueue::new();

        assert!(!queue.push(event("tap", None, 1)));
        assert!(queue.push(event("tap", None, 2)));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.events()[0].count, 3);
    }

    #[test]
    fn push_keeps_distinct_segmentations_apart() {
        let mut queue = EventQueue::new();

        queue.push(event("view", Some("home"), 1));
        queue.push(event("view", Some("settings"), 1));
        queue.push(event("view", None, 1));
        queue.push(event("view", Some("home"), 1));

        let counts: Vec<u32> = queue.events().iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn drain_empties_queue_in_insertion_order() {
        let mut queue = EventQueue::new();
        queue.push(event("b", None, 1));
        queue.push(event("a", None, 1));

        let drained = queue.drain();

        let keys: Vec<&str> = drained.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(queue.is_empty());
    }
}
