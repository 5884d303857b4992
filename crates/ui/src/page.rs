use indexmap::IndexMap;
use rigview_core::{
    AudioFrame, Document, Light, LightsMessage, MonitorEvent, NodeId, StateMap,
};
use rigview_fixtures::FixtureDescriptor;

use crate::meter::AudioMeter;
use crate::moving_head::MovingHeadOutput;
use crate::table::TableOutput;

/// Owns one monitor view: builds the light set from snapshots, routes
/// partial state and lifecycle events by fixture name, and tears the whole
/// surface down on stop.
///
/// The container is handed in explicitly; the page owns it and everything
/// renderers hang off it. All processing is synchronous and serialized in
/// arrival order.
pub struct MonitorPage {
    document: Document,
    container: NodeId,
    lights: IndexMap<String, Light>,
    table: Option<TableOutput>,
    meter: Option<AudioMeter>,
    active: bool,
}

impl MonitorPage {
    pub fn new(document: Document, container: NodeId) -> Self {
        MonitorPage {
            document,
            container,
            lights: IndexMap::new(),
            table: None,
            meter: None,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    pub fn lights(&self) -> &IndexMap<String, Light> {
        &self.lights
    }

    /// Feed one decoded lights-channel message. A transport callback may
    /// still be in flight when the page is stopped, so a stopped page
    /// ignores everything.
    pub fn handle_message(&mut self, message: LightsMessage) {
        if !self.active {
            return;
        }
        match message {
            LightsMessage::Snapshot(descriptors) => self.rebuild(descriptors),
            LightsMessage::State { name, update } => self.apply_state(&name, &update),
            LightsMessage::Monitor { name, event } => self.monitor_event(&name, &event),
        }
    }

    /// Feed one decoded audio-channel frame.
    pub fn handle_audio(&mut self, frame: &AudioFrame) {
        if !self.active {
            return;
        }
        if self.meter.is_none() {
            self.meter = Some(AudioMeter::new(self.container, &mut self.document));
        }
        if let Some(meter) = &mut self.meter {
            meter.update(&frame.audio, &mut self.document);
        }
    }

    pub fn select_light(&mut self, name: &str) {
        if !self.active {
            return;
        }
        if let Some(light) = self.lights.get_mut(name) {
            light.select(&mut self.document);
        }
    }

    pub fn deselect_light(&mut self, name: &str) {
        if !self.active {
            return;
        }
        if let Some(light) = self.lights.get_mut(name) {
            light.deselect(&mut self.document);
        }
    }

    /// Stop processing and release the whole surface. Idempotent.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.clear();
        if let Some(mut meter) = self.meter.take() {
            meter.destroy(&mut self.document);
        }
        self.document.clear_children(self.container);
    }

    /// Full snapshot: tear down the previous renderer tree and build a new
    /// one, attaching a moving-head output where the fixture qualifies and
    /// a shared table over the whole set.
    fn rebuild(&mut self, descriptors: IndexMap<String, FixtureDescriptor>) {
        log::info!("lights snapshot with {} fixtures", descriptors.len());
        self.clear();

        for (key, descriptor) in descriptors {
            let name = descriptor.name.clone().unwrap_or_else(|| key.clone());
            let mut light = Light::new(name, descriptor);
            if light.capabilities().moving_head {
                let output = MovingHeadOutput::new(&light, self.container, &mut self.document);
                light.add_output(Box::new(output));
            }
            self.lights.insert(key, light);
        }

        self.table = Some(TableOutput::new(
            &mut self.lights,
            self.container,
            &mut self.document,
        ));

        // First paint, so identity columns show before any state arrives.
        for light in self.lights.values_mut() {
            light.render(&mut self.document);
        }
    }

    fn apply_state(&mut self, name: &str, update: &StateMap) {
        match self.lights.get_mut(name) {
            Some(light) => light.apply_state(update, &mut self.document),
            None => log::debug!("dropping state update for unknown fixture {:?}", name),
        }
    }

    fn monitor_event(&mut self, name: &str, event: &MonitorEvent) {
        match self.lights.get_mut(name) {
            Some(light) => light.monitor_event(event, &mut self.document),
            None => log::debug!("dropping monitor event for unknown fixture {:?}", name),
        }
    }

    fn clear(&mut self) {
        for (_, mut light) in self.lights.drain(..) {
            light.destroy(&mut self.document);
        }
        if let Some(mut table) = self.table.take() {
            table.destroy(&mut self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MonitorPage {
        let document = Document::new("div");
        let container = document.root();
        MonitorPage::new(document, container)
    }

    fn feed(page: &mut MonitorPage, raw: &str) {
        page.handle_message(LightsMessage::from_json(raw).unwrap());
    }

    const SNAPSHOT: &str = r#"["lights", {
        "spot1": {"Name": "spot1", "Type": "spot60",
                  "Functions": {"pan": {"speed": [0.2, 1.0]}, "tilt": {}, "dim": {}}},
        "par1": {"Name": "par1", "Type": "par", "Functions": {"dim": {}}}
    }]"#;

    #[test]
    fn snapshot_builds_heads_for_moving_fixtures_and_one_shared_table() {
        let mut page = page();
        feed(&mut page, SNAPSHOT);

        let html = page.to_html();
        assert_eq!(html.matches("light_container").count(), 1);
        assert_eq!(html.matches("<table").count(), 1);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.contains("<td>spot1</td>"));
        assert!(html.contains("<td>par1</td>"));
    }

    #[test]
    fn state_updates_route_by_fixture_name() {
        let mut page = page();
        feed(&mut page, SNAPSHOT);
        feed(&mut page, r#"["state", "spot1", {"pan": 255}]"#);

        assert!(page.to_html().contains("rotate(540deg)"));
        assert_eq!(page.lights()["spot1"].state().get("pan"), Some(&255.0));
    }

    #[test]
    fn updates_for_unknown_fixtures_are_dropped_silently() {
        let mut page = page();
        feed(&mut page, SNAPSHOT);
        let before = page.to_html();

        feed(&mut page, r#"["state", "ghost", {"pan": 255}]"#);
        feed(
            &mut page,
            r#"["monitor", "ghost", {"op": "effect", "op_name": "x", "op_state": "NEW"}]"#,
        );
        assert_eq!(page.to_html(), before);
    }

    #[test]
    fn a_new_snapshot_replaces_the_renderer_tree() {
        let mut page = page();
        feed(&mut page, SNAPSHOT);
        feed(
            &mut page,
            r#"["lights", {"wash1": {"Name": "wash1", "Type": "wash", "Functions": {"dim": {}}}}]"#,
        );

        let html = page.to_html();
        assert!(!html.contains("spot1"));
        assert_eq!(html.matches("<table").count(), 1);
        assert_eq!(html.matches("<tr>").count(), 1);
        assert!(html.contains("<td>wash1</td>"));
    }

    #[test]
    fn audio_frames_drive_the_meter() {
        let mut page = page();
        page.handle_audio(&AudioFrame {
            audio: vec![0.25, 0.75],
        });

        let html = page.to_html();
        assert_eq!(html.matches("audio_band").count(), 2);
        assert!(html.contains("height: 25%"));
    }

    #[test]
    fn stop_clears_the_surface_and_ignores_further_input() {
        let mut page = page();
        feed(&mut page, SNAPSHOT);
        page.handle_audio(&AudioFrame { audio: vec![0.5] });

        page.stop();
        assert_eq!(page.to_html(), "<div></div>");
        assert!(!page.is_active());

        feed(&mut page, SNAPSHOT);
        page.handle_audio(&AudioFrame { audio: vec![0.5] });
        page.select_light("spot1");
        assert_eq!(page.to_html(), "<div></div>");

        // Stopping twice is fine.
        page.stop();
    }

    #[test]
    fn snapshot_key_is_the_routing_name_when_descriptor_name_is_missing() {
        let mut page = page();
        feed(
            &mut page,
            r#"["lights", {"spot9": {"Type": "spot", "Functions": {"pan": {}, "tilt": {}}}}]"#,
        );
        feed(&mut page, r#"["state", "spot9", {"pan": 255}]"#);
        assert!(page.to_html().contains("rotate(540deg)"));
    }
}
