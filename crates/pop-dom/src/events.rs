//! DOM Events
//!
//! Per-node listener registries and the dispatcher.
//!
//! Propagation is driven by listener presence: dispatch starts at the
//! target and walks up through parents until it reaches the first node
//! with listeners for the event type, runs all of them in registration
//! order, and stops there. The `bubbles` flag is carried on the event but
//! does not change this walk.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::{DomResult, DomTree, KeyboardData, NodeId};

/// Anything that can receive an event; closures qualify
pub trait EventListener {
    fn handle_event(&self, event: &mut Event);
}

impl<F: Fn(&mut Event)> EventListener for F {
    fn handle_event(&self, event: &mut Event) {
        self(event)
    }
}

/// Shared listener handle. Identity is the allocation, so registering
/// the same handle twice for one type is a no-op.
pub type Listener = Rc<dyn EventListener>;

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// Event type -> ordered listeners
#[derive(Default)]
pub struct ListenerRegistry {
    by_type: HashMap<String, Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the listener was already registered for this type
    pub fn add(&mut self, event_type: &str, listener: Listener) -> bool {
        let list = self.by_type.entry(event_type.to_string()).or_default();
        if list.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        list.push(listener);
        true
    }

    pub fn remove(&mut self, event_type: &str, listener: &Listener) -> bool {
        let Some(list) = self.by_type.get_mut(event_type) else {
            return false;
        };
        match list.iter().position(|l| same_listener(l, listener)) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, event_type: &str) -> &[Listener] {
        self.by_type.get(event_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total listeners over all types
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event_type, listeners) in &self.by_type {
            map.entry(event_type, &listeners.len());
        }
        map.finish()
    }
}

/// A dispatched event. Built per dispatch and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub target: Option<NodeId>,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Virtual milliseconds
    pub time_stamp: f64,
    pub keyboard: Option<KeyboardData>,
    default_prevented: bool,
}

impl Event {
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: None,
            current_target: None,
            bubbles: false,
            cancelable: false,
            time_stamp: 0.0,
            keyboard: None,
            default_prevented: false,
        }
    }

    /// Bubbling, cancelable keyboard event
    pub fn keyboard(event_type: &str, data: KeyboardData, time_stamp: f64) -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            time_stamp,
            keyboard: Some(data),
            ..Self::new(event_type)
        }
    }

    pub fn init_event(&mut self, event_type: &str, bubbles: bool, cancelable: bool) {
        self.event_type = event_type.to_string();
        self.bubbles = bubbles;
        self.cancelable = cancelable;
    }

    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Where a dispatch ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Node whose listeners ran, `None` if the walk reached the root unheard
    pub handled_by: Option<NodeId>,
    pub listeners_invoked: usize,
    pub default_prevented: bool,
}

impl DomTree {
    /// Register `listener` on `node`. `Ok(false)` for a duplicate.
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        listener: Listener,
    ) -> DomResult<bool> {
        Ok(self.node_mut(node)?.listeners.add(event_type, listener))
    }

    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        listener: &Listener,
    ) -> DomResult<bool> {
        Ok(self.node_mut(node)?.listeners.remove(event_type, listener))
    }

    /// Dispatch `event` at `node`. An event without a target gets `node`.
    pub fn dispatch_event(&self, node: NodeId, event: &mut Event) -> DomResult<DispatchOutcome> {
        self.node(node)?;
        if event.target.is_none() {
            event.target = Some(node);
        }

        let mut current = node;
        loop {
            let here = self.node(current)?;
            let listeners = here.listeners.get(&event.event_type);
            if !listeners.is_empty() {
                for listener in listeners {
                    event.current_target = Some(current);
                    listener.handle_event(event);
                }
                trace!(event = %event.event_type, ?current, count = listeners.len(), "dispatched");
                return Ok(DispatchOutcome {
                    handled_by: Some(current),
                    listeners_invoked: listeners.len(),
                    default_prevented: event.default_prevented,
                });
            }
            match here.parent {
                Some(parent) => current = parent,
                None => {
                    trace!(event = %event.event_type, ?node, "no listener on path");
                    return Ok(DispatchOutcome {
                        default_prevented: event.default_prevented,
                        ..DispatchOutcome::default()
                    });
                }
            }
        }
    }
}
