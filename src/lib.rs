pub mod capabilities;
pub mod codec;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod reference;
pub mod responses;
pub mod server;
pub mod session;
pub mod sync;

pub use engine::run_session;
pub use error::NntpError;
pub use session::Session;
