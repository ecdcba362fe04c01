pub mod web_server;

pub use web_server::{routes, run_web_server};
