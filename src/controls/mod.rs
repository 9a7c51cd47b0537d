pub mod morph;
pub mod panel;
pub mod rotation;

pub use panel::ControlPanel;
