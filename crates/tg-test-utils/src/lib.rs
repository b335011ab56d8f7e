//! # Token Gate Test Utilities
//!
//! Shared test utilities for exercising the token validation pipeline.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (seeded Ed25519 keypairs)
//! - Test token builders (`TestTokenBuilder`, signing real `EdDSA` tokens)
//! - Key-resolver fakes (`StaticKeyResolver`, `FailingKeyResolver`) with
//!   invocation counters
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tg_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let keypair = TestKeypair::new(1, "key-01");
//!     let resolver = StaticKeyResolver::for_keypair(&keypair);
//!
//!     let token = TestTokenBuilder::new()
//!         .for_subject("user-123")
//!         .with_scope("meetings:read")
//!         .sign(&keypair);
//!
//!     let header = format!("Bearer {token}");
//!     // hand `header` and `resolver` to the pipeline under test
//! }
//! ```

pub mod crypto_fixtures;
pub mod resolvers;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use resolvers::*;
pub use token_builders::*;
