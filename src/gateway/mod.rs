pub mod client;

pub use client::{
    from_minor_units, to_minor_units, GatewayError, GatewayResult, PaystackClient,
    DEFAULT_BASE_URL, DEFAULT_CURRENCY,
};
