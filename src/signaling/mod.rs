// Public API
pub use relay::SignalingRelay;
pub use types::{ControlEvent, ControlKind, SignalKind, SignalingMessage};

// Internal modules
mod relay;
mod types;
