use rigview_fixtures::Capabilities;

use crate::dom::Document;
use crate::light::StateMap;
use crate::messages::MonitorEvent;

/// Read-only view of a light handed to its outputs while rendering.
/// State is the single source of truth; outputs only ever read it.
#[derive(Clone, Copy)]
pub struct LightView<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub capabilities: Capabilities,
    pub state: &'a StateMap,
}

impl LightView<'_> {
    /// State value for an attribute, 0 when it has never been set.
    pub fn value(&self, attr: &str) -> f64 {
        self.state.get(attr).copied().unwrap_or(0.0)
    }
}

/// One projection of a light onto the page.
///
/// An output owns exactly the visual subtree it created. Implementations
/// built against a fixture that does not meet their capability precondition
/// must stay inert: every method a safe no-op, never a fault.
pub trait Output {
    /// Lifecycle event pass-through; semantics live in the implementation.
    fn monitor_event(&mut self, _event: &MonitorEvent) {}

    /// UI selection toggles; no-ops unless the output renders selection.
    fn select_light(&mut self, _name: &str) {}
    fn deselect_light(&mut self, _name: &str) {}

    /// Project the light's current state onto the owned surface. Idempotent;
    /// no side effects beyond that surface.
    fn render(&mut self, light: &LightView<'_>, dom: &mut Document);

    /// Release the owned surface. Safe to call when construction
    /// short-circuited and no surface exists.
    fn destroy(&mut self, dom: &mut Document);
}
