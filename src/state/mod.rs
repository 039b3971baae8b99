//! Application state module

mod app_state;
mod builder;
mod form_data;
mod input;
mod schema;

pub use app_state::*;
pub use builder::*;
pub use form_data::*;
pub use input::*;
pub use schema::*;
