pub use effects::EffectTracker;
pub use meter::AudioMeter;
pub use moving_head::MovingHeadOutput;
pub use page::MonitorPage;
pub use table::{TableOutput, TableRowOutput};

mod effects;
mod meter;
mod moving_head;
mod page;
mod table;
