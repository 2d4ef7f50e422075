pub mod api;
pub mod app;
pub mod config;
pub mod events;
pub mod files;
pub mod logging;
pub mod tui;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;
