pub mod client;
pub mod selector;

pub use client::AdsClient;
pub use selector::Selector;
