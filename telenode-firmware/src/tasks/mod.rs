//! Embassy async tasks
//!
//! Driver tasks run beside the main loop on the same executor and talk to
//! it only through the queues in `channels`.

pub mod wifi;
pub mod ws_server;

pub use wifi::{cyw43_task, net_task};
pub use ws_server::ws_server_task;
