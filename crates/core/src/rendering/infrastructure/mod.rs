pub mod rgba_overlay_surface;
