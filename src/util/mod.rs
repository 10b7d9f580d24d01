mod format;
mod link;

pub use format::{format_size, format_timestamp, truncate_end};
pub use link::{is_link_like, parse_link};
