pub mod extract;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
