pub mod hit;
pub mod paint;

pub use hit::{drop_target, hit_test, hit_test_order};
pub use paint::{
    Ephemeral, Overlay, PaintItem, display_bounds, effective_opacity, paint_list, paint_order,
    preview_opacity,
};
