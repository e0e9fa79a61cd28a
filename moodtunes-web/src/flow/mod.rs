//! Mood -> artist -> songs selection flow

pub mod controller;
pub mod driver;
pub mod registry;

pub use controller::{FlowController, FlowError, FlowSnapshot, FlowState, LookupState, LookupTicket};
pub use driver::FlowDriver;
pub use registry::FlowRegistry;
