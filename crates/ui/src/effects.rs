use indexmap::IndexMap;
use rigview_core::{MonitorEvent, OpState};

/// Tracks the operations currently running against one fixture, keyed by
/// operation name within the collection named by the event's `op` category.
///
/// NEW inserts or overwrites, DONE removes. A DONE with no matching NEW is
/// a no-op and a duplicate NEW overwrites rather than appends, so the
/// tracker stays consistent when the sender reorders events. Iteration is
/// insertion-ordered.
#[derive(Debug, Default)]
pub struct EffectTracker {
    effects: IndexMap<String, String>,
    state_effects: IndexMap<String, String>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event into the collection named by its `op` category,
    /// lower-cased and pluralized as the wire does it.
    pub fn apply(&mut self, event: &MonitorEvent) {
        let bucket = match event.op.to_ascii_lowercase().as_str() {
            "effect" => &mut self.effects,
            "state_effect" => &mut self.state_effects,
            other => {
                log::debug!("ignoring monitor event with unknown op {:?}", other);
                return;
            }
        };
        match event.op_state {
            OpState::New => {
                bucket.insert(event.op_name.clone(), summarize(event));
            }
            OpState::Done => {
                bucket.shift_remove(&event.op_name);
            }
        }
    }

    /// Active in-flight effects, insertion-ordered.
    pub fn effects(&self) -> impl Iterator<Item = &str> {
        self.effects.values().map(String::as_str)
    }

    /// Active state-level effects, insertion-ordered.
    pub fn state_effects(&self) -> impl Iterator<Item = &str> {
        self.state_effects.values().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.state_effects.is_empty()
    }
}

/// Human-readable one-liner for an active operation:
/// `<op_name> <start>-><end>-><done> <duration>`.
fn summarize(event: &MonitorEvent) -> String {
    let s = &event.state;
    format!(
        "{} {}->{}->{} {}",
        event.op_name, s.start, s.end, s.done, s.duration
    )
}
