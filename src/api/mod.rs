mod layout_config;
mod layout_engine;
mod layout_snapshot;

pub use layout_config::TimelineLayoutConfig;
pub use layout_engine::TimelineLayout;
pub use layout_snapshot::LayoutSnapshot;
