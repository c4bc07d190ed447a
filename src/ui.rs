//! Ratatui front-end for the teacher directory.
//!
//! Screens are plain state machines: they react to keys and to finished
//! requests by returning [`screens::Effect`]s, and never touch the network or
//! the terminal themselves. [`App`] owns the active screen, routes effects to
//! the request dispatcher, and renders the current state every tick.

mod app;
mod dispatch;
mod forms;
mod helpers;
mod routes;
mod screens;
mod terminal;

pub use app::App;
pub use routes::Route;
pub use terminal::run_app;
