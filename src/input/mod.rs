mod keyboard;

pub use keyboard::{map_key_to_intent, InputMode, Intent};
