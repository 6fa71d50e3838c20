pub mod config;
pub mod widget;

pub use config::*;
pub use widget::*;
