//! Repository contracts for the OTP queue and the credential store.

pub mod credential;
pub mod queue;

pub use credential::CredentialRepository;
pub use queue::OtpQueue;

#[cfg(test)]
pub use credential::MockCredentialRepository;
#[cfg(test)]
pub use queue::MockOtpQueue;
