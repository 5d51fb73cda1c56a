pub mod chunk;
pub mod color;
pub mod config;
pub mod curve;
pub mod gfa;
pub mod layout;
pub mod reconstruct;
pub mod scene;

pub use chunk::{expand, RenderGraph, RenderLink};
pub use config::Settings;
pub use gfa::{decode, decode_bytes, Graph};
pub use layout::{ForceLayout, LayoutEngine, Positions};
pub use scene::Scene;
