pub mod manager;
pub mod model;
pub mod store;
pub mod window;
