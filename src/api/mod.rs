pub mod api_version;
pub mod handlers;
pub mod routes;

pub use api_version::*;
pub use handlers::*;
pub use routes::*;
