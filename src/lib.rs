// Library surface for headless/integration tests and reuse.
// The ui module stays in the binary: it renders bin-only App state.
pub mod app_dirs;
pub mod config;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod solve;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod util;
