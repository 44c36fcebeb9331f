pub mod layout;
pub mod scene;
pub mod svg;

pub use layout::{LayoutNode, layout};
pub use scene::{BBox, Primitive, SceneBuilder, bounding_box};
