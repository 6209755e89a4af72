//! Content-addressed storage via the Pinata pinning API.

mod pinata_content_store;

pub use pinata_content_store::{
    DEFAULT_GATEWAY_URL, DEFAULT_PINATA_API_URL, PinataContentStore, PinataSettings,
};
