pub mod config_helper;
pub mod directive;

pub use directive::{render_relation_directive, ConfigRenderer};
