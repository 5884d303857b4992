use rigview_core::{Document, Light, LightView, MonitorEvent, NodeId, Output};
use rigview_fixtures::{ColorTable, GoboTable};

use crate::effects::EffectTracker;

/// Graphical projection of a moving-head fixture: a rotating head element,
/// a bulb carrying color/opacity/vertical position, an optional gobo image
/// and the two effect overlay lists.
///
/// Constructed against a fixture without pan/tilt the output stays inert:
/// no surface is created and every method is a safe no-op.
pub struct MovingHeadOutput {
    head: Option<Head>,
}

struct Head {
    container: NodeId,
    rotor: NodeId,
    bulb: NodeId,
    gobo_img: Option<NodeId>,
    effects_list: NodeId,
    state_effects_list: NodeId,
    rgb: bool,
    colors: Option<ColorTable>,
    gobos: Option<GoboTable>,
    pan_speed: Option<(f64, f64)>,
    tilt_speed: Option<(f64, f64)>,
    tracker: EffectTracker,
}

impl MovingHeadOutput {
    pub fn new(light: &Light, dest: NodeId, dom: &mut Document) -> Self {
        let caps = light.capabilities();
        if !caps.moving_head {
            return MovingHeadOutput { head: None };
        }

        let colors = if caps.fixed_colors {
            light
                .functions()
                .get("color")
                .and_then(|f| f.map.as_ref())
                .map(ColorTable::from_map)
        } else {
            None
        };
        let gobos = if caps.gobo {
            light
                .functions()
                .get("gobo")
                .and_then(|f| f.map.as_ref())
                .map(GoboTable::from_map)
        } else {
            None
        };

        let gobo_img = if gobos.is_some() {
            let img = dom.create_element("img");
            dom.add_class(img, "gobo");
            Some(img)
        } else {
            None
        };

        let bulb = dom.create_element("div");
        dom.add_class(bulb, "light_bulb");
        if let Some(img) = gobo_img {
            dom.append_child(bulb, img);
        }

        let rotor = dom.create_element("div");
        dom.add_class(rotor, "light_head");
        dom.append_child(rotor, bulb);

        let label = dom.create_element("span");
        dom.add_class(label, "light_name");
        dom.set_text(label, &format!("{} {}", light.type_name(), light.name()));

        let body = dom.create_element("div");
        dom.add_class(body, "light_body");
        dom.append_child(body, rotor);
        dom.append_child(body, label);

        let state_effects_list = dom.create_element("ul");
        dom.add_class(state_effects_list, "info_list");
        dom.add_class(state_effects_list, "state_effects");

        let effects_list = dom.create_element("ul");
        dom.add_class(effects_list, "info_list");
        dom.add_class(effects_list, "effects");

        let container = dom.create_element("div");
        dom.add_class(container, "light_container");
        dom.append_child(container, body);
        dom.append_child(container, state_effects_list);
        dom.append_child(container, effects_list);

        dom.append_child(dest, container);

        MovingHeadOutput {
            head: Some(Head {
                container,
                rotor,
                bulb,
                gobo_img,
                effects_list,
                state_effects_list,
                rgb: caps.rgb,
                colors,
                gobos,
                pan_speed: light.speed("pan"),
                tilt_speed: light.speed("tilt"),
                tracker: EffectTracker::new(),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.head.is_some()
    }
}

impl Output for MovingHeadOutput {
    fn monitor_event(&mut self, event: &MonitorEvent) {
        if let Some(head) = &mut self.head {
            head.tracker.apply(event);
        }
    }

    fn render(&mut self, light: &LightView<'_>, dom: &mut Document) {
        let head = match &mut self.head {
            Some(head) => head,
            None => return,
        };

        // RGB channels win over a fixed palette when a fixture has both.
        if head.rgb {
            let color = format!(
                "rgb({}, {}, {})",
                light.value("red"),
                light.value("green"),
                light.value("blue")
            );
            dom.set_style(head.bulb, "background-color", &color);
        } else if let Some(colors) = &head.colors {
            if let Some(pair) = colors.resolve(channel_value(light.value("color"))) {
                let gradient = format!(
                    "linear-gradient(90deg, {0} 0%, {0} 50%, {1} 50%, {1} 100%)",
                    pair.start, pair.end
                );
                dom.set_style(head.bulb, "background", &gradient);
            }
        }

        if let Some(img) = head.gobo_img {
            let entry = head
                .gobos
                .as_ref()
                .and_then(|g| g.get(channel_value(light.value("gobo"))));
            match entry {
                Some(entry) if !entry.is_open() => {
                    dom.set_style(img, "display", "block");
                    dom.set_attr(img, "src", &format!("/static/img/gobos/{}.png", entry.gobo));
                }
                _ => dom.set_style(img, "display", "none"),
            }
        }

        dom.set_style(head.bulb, "opacity", &(light.value("dim") / 255.0).to_string());

        let speed = light.value("speed");
        let pan_duration = transition_duration(head.pan_speed, speed);
        dom.set_style(head.rotor, "transition", &format!("transform {}s", pan_duration));
        dom.set_style(
            head.rotor,
            "transform",
            &format!("rotate({}deg)", (light.value("pan") / 255.0) * 540.0),
        );

        let tilt_duration = transition_duration(head.tilt_speed, speed);
        dom.set_style(head.bulb, "transition", &format!("top {}s", tilt_duration));
        dom.set_style(
            head.bulb,
            "top",
            &format!("{}%", (light.value("tilt") / 255.0) * 70.0),
        );

        render_list(dom, head.effects_list, head.tracker.effects());
        render_list(dom, head.state_effects_list, head.tracker.state_effects());
    }

    fn destroy(&mut self, dom: &mut Document) {
        if let Some(head) = self.head.take() {
            dom.remove(head.container);
        }
    }
}

/// Duration of one axis transition: speed 0 runs at the lower bound of the
/// fixture's declared range, 255 at the upper; no declared range means an
/// instant transition.
fn transition_duration(bounds: Option<(f64, f64)>, speed: f64) -> f64 {
    match bounds {
        Some((min, max)) => min + (speed / 255.0) * (max - min),
        None => 0.0,
    }
}

/// Raw channel value for a lookup-table index.
fn channel_value(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

fn render_list<'a>(dom: &mut Document, list: NodeId, items: impl Iterator<Item = &'a str>) {
    dom.clear_children(list);
    for text in items {
        let item = dom.create_element("li");
        dom.set_text(item, text);
        dom.append_child(list, item);
    }
}
