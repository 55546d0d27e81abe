pub mod audit;
pub mod handlers;
pub mod middleware;
pub mod offline;
pub mod routes;
pub mod scan;
pub mod sync;

pub use routes::create_router;
