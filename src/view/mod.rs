mod scan_view;
mod ui_fmt;

pub use scan_view::render as render_scan;
