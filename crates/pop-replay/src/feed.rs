//! Input feed: recorded events delivered as the virtual clock reaches them

use pop_dom::{Document, DomResult, NodeId};
use tracing::{debug, trace, warn};

use crate::record::InputEvent;

/// Ordered queue of recorded input
#[derive(Debug, Clone, Default)]
pub struct InputFeed {
    events: Vec<InputEvent>,
    next: usize,
}

impl InputFeed {
    /// Arm the feed with a recorded log
    ///
    /// An out-of-order log is stable-sorted by timestamp, so events with
    /// equal timestamps keep their recorded order.
    pub fn arm(mut events: Vec<InputEvent>) -> Self {
        let sorted = events.windows(2).all(|w| w[0].time_stamp <= w[1].time_stamp);
        if !sorted {
            warn!(events = events.len(), "input log out of timestamp order, sorting");
            events.sort_by(|a, b| a.time_stamp.total_cmp(&b.time_stamp));
        }
        Self { events, next: 0 }
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.next
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }

    /// All recorded events have been delivered
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.events.len()
    }

    /// Timestamp of the next undelivered event
    pub fn peek_time(&self) -> Option<f64> {
        self.events.get(self.next).map(|e| e.time_stamp)
    }

    /// Take the next event if it is due at `now_ms`
    pub fn next_due(&mut self, now_ms: f64) -> Option<&InputEvent> {
        let event = self.events.get(self.next)?;
        if event.time_stamp > now_ms {
            return None;
        }
        self.next += 1;
        Some(event)
    }

    /// Dispatch every event due at `now_ms` on `target`, in order
    ///
    /// Returns the number delivered. After exhaustion this is a no-op.
    pub fn deliver_due(&mut self, now_ms: f64, document: &Document, target: NodeId) -> DomResult<usize> {
        let mut delivered = 0;
        while let Some(input) = self.next_due(now_ms) {
            let mut event = input.to_event();
            let outcome = document.dispatch_event(target, &mut event)?;
            debug!(
                event_type = %event.event_type,
                key = %input.key,
                at = input.time_stamp,
                now = now_ms,
                "input delivered"
            );
            if outcome.handled_by.is_none() {
                trace!(event_type = %event.event_type, "input had no listener");
            }
            delivered += 1;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pop_dom::{Event, Listener};

    use super::*;

    fn keys(feed: &InputFeed) -> Vec<&str> {
        feed.events().iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_sorts_out_of_order_log_stably() {
        let feed = InputFeed::arm(vec![
            InputEvent::key("keydown", "b", 20.0),
            InputEvent::key("keydown", "a", 10.0),
            InputEvent::key("keyup", "c", 20.0),
        ]);
        assert_eq!(keys(&feed), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delivers_in_timestamp_order_up_to_now() {
        let mut doc = Document::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let listener: Listener = Rc::new(move |e: &mut Event| {
            sink.borrow_mut().push((e.event_type.clone(), e.time_stamp));
        });
        doc.add_event_listener("keydown", Rc::clone(&listener));
        doc.add_event_listener("keyup", listener);

        let mut feed = InputFeed::arm(vec![
            InputEvent::key("keydown", "w", 0.0),
            InputEvent::key("keyup", "w", 100.0),
        ]);
        let body = doc.body();

        assert_eq!(feed.deliver_due(50.0, &doc, body).unwrap(), 1);
        assert_eq!(feed.peek_time(), Some(100.0));
        assert_eq!(feed.deliver_due(99.9, &doc, body).unwrap(), 0);
        assert_eq!(feed.deliver_due(100.0, &doc, body).unwrap(), 1);
        assert!(feed.is_exhausted());

        // Exhausted: no-op
        assert_eq!(feed.deliver_due(1e9, &doc, body).unwrap(), 0);
        assert_eq!(
            *seen.borrow(),
            vec![("keydown".to_string(), 0.0), ("keyup".to_string(), 100.0)]
        );
    }

    #[test]
    fn test_empty_feed_is_exhausted() {
        let feed = InputFeed::arm(Vec::new());
        assert!(feed.is_exhausted());
        assert_eq!(feed.remaining(), 0);
        assert_eq!(feed.peek_time(), None);
    }
}
