pub mod api;
pub mod interaction;
pub mod model;
pub mod ratelimit;

pub use api::RestClient;
pub use interaction::HttpInteraction;
pub use ratelimit::RateLimiter;
