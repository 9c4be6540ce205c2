//! Vehicle state and the gear lever state machine
//!
//! The state machine is explicit, ordered and deterministic: a newly observed
//! lever reading is matched against a fixed rule table and the first rule
//! that applies decides the gear.

pub mod machine;
pub mod vehicle;

pub use machine::{classify, Rule, TransitionKey};
pub use vehicle::VehicleState;
