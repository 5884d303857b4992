use rigview_core::{Document, NodeId};

/// Bar-per-band level meter for the audio-reactive feed.
///
/// Bands are created lazily from the first frame and rebuilt if the band
/// count changes; levels are expected in 0.0..=1.0 and drive bar heights.
pub struct AudioMeter {
    container: NodeId,
    bands: Vec<NodeId>,
}

impl AudioMeter {
    pub fn new(dest: NodeId, dom: &mut Document) -> Self {
        let container = dom.create_element("div");
        dom.add_class(container, "audio_meter");
        dom.append_child(dest, container);
        AudioMeter {
            container,
            bands: Vec::new(),
        }
    }

    pub fn update(&mut self, levels: &[f64], dom: &mut Document) {
        if self.bands.len() != levels.len() {
            dom.clear_children(self.container);
            self.bands = levels
                .iter()
                .map(|_| {
                    let band = dom.create_element("div");
                    dom.add_class(band, "audio_band");
                    dom.append_child(self.container, band);
                    band
                })
                .collect();
        }
        for (&band, level) in self.bands.iter().zip(levels) {
            dom.set_style(band, "height", &format!("{}%", level * 100.0));
        }
    }

    pub fn destroy(&mut self, dom: &mut Document) {
        dom.remove(self.container);
        self.bands.clear();
    }
}
