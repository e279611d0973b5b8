//! Application core: domain logic with no direct I/O.
//!
//! The polling loop and its event vocabulary.  All interaction with
//! hardware and the network happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod main_loop;
pub mod ports;
