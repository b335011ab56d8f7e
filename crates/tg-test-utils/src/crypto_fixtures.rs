//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible Ed25519 keypairs for signing and verifying test
//! tokens. All fixtures are deterministic based on seed values.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use ring::signature::{Ed25519KeyPair, KeyPair};
use token_gate::ResolvedKey;

/// Deterministic Ed25519 keypair for signing test tokens.
///
/// The same seed always produces the same keypair, ensuring test
/// reproducibility. Test-only: production keys come from a real key
/// source, never from a fixed seed.
pub struct TestKeypair {
    /// Key ID stamped into signed token headers.
    pub key_id: String,

    /// Raw 32-byte Ed25519 public key.
    pub public_key: Vec<u8>,

    /// Private key as a PKCS#8 v1 document.
    pub private_key_pkcs8: Vec<u8>,
}

impl TestKeypair {
    /// Create a deterministic keypair from a seed byte.
    ///
    /// # Panics
    ///
    /// Panics if the seed cannot be turned into a keypair (test fixture).
    pub fn new(seed: u8, key_id: &str) -> Self {
        let seed_bytes = expand_seed(seed);

        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
            .expect("failed to create test keypair");

        Self {
            key_id: key_id.to_string(),
            public_key: key_pair.public_key().as_ref().to_vec(),
            private_key_pkcs8: build_pkcs8_from_seed(&seed_bytes),
        }
    }

    /// The verification side of this keypair, as the pipeline consumes it.
    pub fn resolved_key(&self) -> ResolvedKey {
        ResolvedKey::new(
            DecodingKey::from_ed_der(&self.public_key),
            Algorithm::EdDSA,
        )
    }

    /// The signing side of this keypair.
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_ed_der(&self.private_key_pkcs8)
    }
}

/// Expand a single seed byte into a deterministic 32-byte seed.
fn expand_seed(seed: u8) -> [u8; 32] {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }
    seed_bytes
}

/// Build PKCS#8 v1 document from Ed25519 seed
///
/// This is a test-only utility. Ring doesn't expose a method to get PKCS#8
/// from an `Ed25519KeyPair`, so we build it by hand.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    // PKCS#8 v1 format for Ed25519 (RFC 5208):
    // SEQUENCE {
    //   version         INTEGER (0),
    //   algorithm       AlgorithmIdentifier,
    //   privateKey      OCTET STRING
    // }
    // Where privateKey for Ed25519 is:
    // OCTET STRING containing OCTET STRING with 32-byte seed

    let mut pkcs8 = Vec::new();

    // Outer SEQUENCE tag
    pkcs8.push(0x30);
    pkcs8.push(0x2e); // Length: 46 bytes

    // Version: INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);

    // Algorithm Identifier: SEQUENCE
    pkcs8.push(0x30);
    pkcs8.push(0x05); // Length: 5 bytes
                      // OID for Ed25519: 1.3.101.112
    pkcs8.extend_from_slice(&[0x06, 0x03, 0x2b, 0x65, 0x70]);

    // Private Key: OCTET STRING
    pkcs8.push(0x04);
    pkcs8.push(0x22); // Length: 34 bytes
                      // Inner OCTET STRING with seed
    pkcs8.push(0x04);
    pkcs8.push(0x20); // Length: 32 bytes
    pkcs8.extend_from_slice(seed);

    pkcs8
}
