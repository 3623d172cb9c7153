pub mod api;
pub mod http_client;
pub mod page;
pub mod rounds;
pub mod sync;
pub mod teams;
