//! Agent-side lifecycle control: one controller supervises one database
//! server process end-to-end.
mod controller;
mod process;

#[cfg(test)]
mod tests;

pub use controller::LifecycleController;
pub use process::{AgentProcess, ExitKind, ExitReport, LifecycleState};
