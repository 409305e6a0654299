pub mod boundary_loader;
pub mod config;
pub mod map;
pub mod panel;
pub mod regionmap_ui;
pub use map::{map_event::MapEvent, region::RegionId, widget::RegionMap};
