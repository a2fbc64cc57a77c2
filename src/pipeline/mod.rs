pub mod assembler;
pub mod controller;
pub mod dispatcher;
pub mod handoff;
#[allow(clippy::module_inception)]
pub mod pipeline;
