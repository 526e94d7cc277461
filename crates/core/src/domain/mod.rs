pub mod chat;
pub mod contract;
pub mod forecast;
pub mod recommendation;
