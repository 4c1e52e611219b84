mod client;
#[cfg(test)]
pub(crate) mod mock;
mod payload;
mod submitter;
#[cfg(test)]
mod tests;

pub use client::{HttpVerificationBackend, VerificationBackend};
pub use payload::{
    ConsentProfile, ConsentRequest, ConsentResponse, LoginRequest, RegisterRequest,
    RegisterResponse,
};
pub use submitter::{provisional_user_id, VerificationSubmitter, Verified};
