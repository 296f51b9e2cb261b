// Gateway event queue
//
// Every connection feeds one queue drained by a single dispatcher task, which keeps
// registry changes and their notifications in arrival order.

// Public API - what other modules can use
pub use bus::{DispatchReport, GatewayHandle};
pub(crate) use bus::QueuedEvent;
pub use dispatcher::EventDispatcher;
pub use events::GatewayEvent;

// Internal modules
mod bus;
mod dispatcher;
mod events;
