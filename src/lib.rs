// Library surface for headless/integration tests and reuse.
// main.rs only wires the terminal and threads around these.
pub mod config;
pub mod engine;
pub mod input;
pub mod persist;
pub mod render;
pub mod runtime;
pub mod signals;
pub mod split;
pub mod ui;
pub mod util;
