//! Discrete health notifications, queued for the embedder to deliver
//! (screen message, log line, whatever the shell does with them).

use serde::{Deserialize, Serialize};

/// A one-time health event for a named person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthEvent {
    /// Dropped below the exhaustion threshold; working role suspended.
    Exhausted { name: String },
    /// Recovered past the exhaustion-end threshold; role restored.
    Revived { name: String, role: String },
    /// Health reached the death threshold with death enabled. Terminal.
    Died { name: String },
    /// Health fraction crossed below the configured alert level.
    LowHealth { name: String },
}

impl HealthEvent {
    pub fn name(&self) -> &str {
        match self {
            HealthEvent::Exhausted { name }
            | HealthEvent::Revived { name, .. }
            | HealthEvent::Died { name }
            | HealthEvent::LowHealth { name } => name,
        }
    }
}

/// FIFO queue of pending events, drained by the embedder after each tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<HealthEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: HealthEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue() {
        let mut queue = EventQueue::default();
        queue.push(HealthEvent::Exhausted {
            name: "Ada Reyes".into(),
        });
        queue.push(HealthEvent::Died {
            name: "Kai Larsen".into(),
        });
        assert_eq!(queue.len(), 2);
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
        assert_eq!(drained[0].name(), "Ada Reyes");
    }
}
