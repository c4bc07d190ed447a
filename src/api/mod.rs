//! Remote teacher API split across logical submodules.

mod client;
mod error;
mod store;

pub use client::{TeacherClient, API_PREFIX};
pub use error::ApiError;
pub use store::{StoreSnapshot, StoreSubscription, TeacherStore};
