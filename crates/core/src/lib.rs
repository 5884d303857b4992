pub use dom::{Document, NodeId};
pub use light::{Light, StateMap};
pub use messages::{
    AudioFrame, LightsMessage, MonitorEvent, OpState, ProtocolError, TransitionState,
};
pub use output::{LightView, Output};

mod dom;
mod light;
mod messages;
mod output;
