use std::collections::BTreeMap;

use indexmap::IndexMap;
use rigview_fixtures::{Capabilities, FixtureDescriptor, FunctionSpec};

use crate::dom::Document;
use crate::messages::MonitorEvent;
use crate::output::{LightView, Output};

/// Mutable attribute state of a fixture, attribute name -> value.
/// Most channels run 0-255.
pub type StateMap = BTreeMap<String, f64>;

/// A fixture as the page sees it: identity, capability flags derived once
/// from the descriptor, mutable state, and the ordered list of outputs
/// projecting that state onto the page.
///
/// Outputs are owned by the light and destroyed with it; state starts empty
/// and is populated by the first state event.
pub struct Light {
    name: String,
    type_name: String,
    functions: IndexMap<String, FunctionSpec>,
    capabilities: Capabilities,
    state: StateMap,
    outputs: Vec<Box<dyn Output>>,
}

impl Light {
    pub fn new(name: impl Into<String>, descriptor: FixtureDescriptor) -> Self {
        let capabilities = Capabilities::classify(&descriptor.functions);
        Light {
            name: name.into(),
            type_name: descriptor.type_name.unwrap_or_default(),
            functions: descriptor.functions,
            capabilities,
            state: StateMap::new(),
            outputs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn functions(&self) -> &IndexMap<String, FunctionSpec> {
        &self.functions
    }

    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Transition-duration bounds declared for a function, if any.
    pub fn speed(&self, function: &str) -> Option<(f64, f64)> {
        self.functions.get(function).and_then(|f| f.speed)
    }

    /// Appends to the output list; no de-duplication.
    pub fn add_output(&mut self, output: Box<dyn Output>) {
        self.outputs.push(output);
    }

    /// Merge a partial update, last write wins per key, then re-render every
    /// output in attachment order. Keys absent from the update keep their
    /// prior value.
    pub fn apply_state(&mut self, update: &StateMap, dom: &mut Document) {
        for (attr, value) in update {
            self.state.insert(attr.clone(), *value);
        }
        self.render(dom);
    }

    /// Forward a lifecycle event unchanged to every output, then re-render.
    /// Event semantics live in the outputs, not here.
    pub fn monitor_event(&mut self, event: &MonitorEvent, dom: &mut Document) {
        let view = LightView {
            name: &self.name,
            type_name: &self.type_name,
            capabilities: self.capabilities,
            state: &self.state,
        };
        for output in &mut self.outputs {
            output.monitor_event(event);
            output.render(&view, dom);
        }
    }

    pub fn select(&mut self, dom: &mut Document) {
        let view = LightView {
            name: &self.name,
            type_name: &self.type_name,
            capabilities: self.capabilities,
            state: &self.state,
        };
        for output in &mut self.outputs {
            output.select_light(view.name);
            output.render(&view, dom);
        }
    }

    pub fn deselect(&mut self, dom: &mut Document) {
        let view = LightView {
            name: &self.name,
            type_name: &self.type_name,
            capabilities: self.capabilities,
            state: &self.state,
        };
        for output in &mut self.outputs {
            output.deselect_light(view.name);
            output.render(&view, dom);
        }
    }

    /// Re-render every output against the current state.
    pub fn render(&mut self, dom: &mut Document) {
        let view = LightView {
            name: &self.name,
            type_name: &self.type_name,
            capabilities: self.capabilities,
            state: &self.state,
        };
        for output in &mut self.outputs {
            output.render(&view, dom);
        }
    }

    /// Destroy every output exactly once. The light is inert afterwards:
    /// further renders find no outputs to notify.
    pub fn destroy(&mut self, dom: &mut Document) {
        for mut output in self.outputs.drain(..) {
            output.destroy(dom);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records the calls an output receives.
    struct Probe {
        label: &'static str,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Output for Probe {
        fn monitor_event(&mut self, event: &MonitorEvent) {
            self.calls
                .borrow_mut()
                .push(format!("{}:event:{}", self.label, event.op_name));
        }

        fn select_light(&mut self, name: &str) {
            self.calls
                .borrow_mut()
                .push(format!("{}:select:{}", self.label, name));
        }

        fn render(&mut self, light: &LightView<'_>, _dom: &mut Document) {
            self.calls
                .borrow_mut()
                .push(format!("{}:render:{}", self.label, light.state.len()));
        }

        fn destroy(&mut self, _dom: &mut Document) {
            self.calls.borrow_mut().push(format!("{}:destroy", self.label));
        }
    }

    fn state(pairs: &[(&str, f64)]) -> StateMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn test_light() -> Light {
        let descriptor: FixtureDescriptor =
            serde_json::from_str(r#"{"Type": "spot", "Functions": {"pan": {}, "tilt": {}}}"#)
                .unwrap();
        Light::new("spot1", descriptor)
    }

    #[test]
    fn state_merge_is_last_write_wins_per_key() {
        let mut dom = Document::new("div");
        let mut light = test_light();

        light.apply_state(&state(&[("pan", 10.0), ("tilt", 20.0)]), &mut dom);
        light.apply_state(&state(&[("pan", 200.0)]), &mut dom);

        assert_eq!(light.state().get("pan"), Some(&200.0));
        assert_eq!(light.state().get("tilt"), Some(&20.0));
    }

    #[test]
    fn state_merge_ignores_delivery_chunking() {
        let mut dom = Document::new("div");
        let mut chunked = test_light();
        chunked.apply_state(&state(&[("pan", 10.0)]), &mut dom);
        chunked.apply_state(&state(&[("tilt", 20.0)]), &mut dom);
        chunked.apply_state(&state(&[("pan", 30.0)]), &mut dom);

        let mut whole = test_light();
        whole.apply_state(&state(&[("pan", 30.0), ("tilt", 20.0)]), &mut dom);

        assert_eq!(chunked.state(), whole.state());
    }

    #[test]
    fn reapplying_an_update_is_idempotent() {
        let mut dom = Document::new("div");
        let mut light = test_light();
        let update = state(&[("pan", 127.0), ("dim", 255.0)]);

        light.apply_state(&update, &mut dom);
        let once = light.state().clone();
        light.apply_state(&update, &mut dom);

        assert_eq!(light.state(), &once);
    }

    #[test]
    fn outputs_are_notified_in_attachment_order() {
        let mut dom = Document::new("div");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut light = test_light();
        light.add_output(Box::new(Probe {
            label: "a",
            calls: Rc::clone(&calls),
        }));
        light.add_output(Box::new(Probe {
            label: "b",
            calls: Rc::clone(&calls),
        }));

        light.apply_state(&state(&[("pan", 1.0)]), &mut dom);

        assert_eq!(calls.borrow().as_slice(), ["a:render:1", "b:render:1"]);
    }

    #[test]
    fn destroy_reaches_every_output_exactly_once() {
        let mut dom = Document::new("div");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut light = test_light();
        light.add_output(Box::new(Probe {
            label: "a",
            calls: Rc::clone(&calls),
        }));
        light.add_output(Box::new(Probe {
            label: "b",
            calls: Rc::clone(&calls),
        }));

        light.destroy(&mut dom);
        // The entity is inert afterwards; a stray render reaches nothing.
        light.render(&mut dom);

        assert_eq!(calls.borrow().as_slice(), ["a:destroy", "b:destroy"]);
    }

    #[test]
    fn capabilities_are_derived_at_construction() {
        let light = test_light();
        assert!(light.capabilities().moving_head);
        assert!(!light.capabilities().rgb);
        assert_eq!(light.type_name(), "spot");
    }
}
