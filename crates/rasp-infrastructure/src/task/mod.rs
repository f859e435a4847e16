//! Background task framework
//!
//! A cooperative, suspendable worker that runs one [`TaskAction`] on a fixed
//! delay and never lets an action failure escape.

pub mod periodic;

pub use periodic::{PeriodicTask, TaskAction, TaskState, TaskStats};
