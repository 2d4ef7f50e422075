mod action;
mod effect;
mod effects;
mod input;
mod reducer;
mod state;
mod util;

pub use action::Action;
pub use effect::Effect;
pub use state::{App, DeleteTarget, DetailState, Dialog, Mode};
pub use util::{magnet_link, torrent_file_name};
