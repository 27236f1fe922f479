//! Terminal host for the editor overlay (`translator edit`).

pub mod render;
pub mod runtime;
pub mod terminal;
pub mod view;

pub use runtime::run;
pub use view::{Action, EditorView};
