//! Service configuration model shared by every component.
mod tree;


pub use tree::{ClassConfig, ConfigTree, MethodConfig, ServiceConfig, ServiceOverview};
