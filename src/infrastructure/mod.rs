pub mod backends;
pub mod profiles;
pub mod transports;
