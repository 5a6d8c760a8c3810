//! Order signatures
//!
//! The exchange only consumes a `SignatureVerifier`. The shipped verifier is
//! ed25519 over the 32-byte order hash; a signer's address is the last 20
//! bytes of `sha256(public_key)`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use types::ids::{Address, OrderHash};
use types::order::{Order, OrderParam, OrderSignature};

/// Checks that `signer` produced `signature` over `hash`. Must fail closed.
pub trait SignatureVerifier {
    fn verify(&self, signer: &Address, hash: &OrderHash, signature: &OrderSignature) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, signer: &Address, hash: &OrderHash, signature: &OrderSignature) -> bool {
        let Some(key_bytes) = decode_array::<32>(&signature.public_key) else {
            return false;
        };
        if Address::from_public_key(&key_bytes) != *signer {
            return false;
        }
        let Some(sig_bytes) = decode_array::<64>(&signature.signature) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        verifying_key
            .verify(hash.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .is_ok()
    }
}

fn decode_array<const N: usize>(text: &str) -> Option<[u8; N]> {
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(stripped).ok()?.try_into().ok()
}

/// Address controlled by a signing key.
pub fn signer_address(key: &SigningKey) -> Address {
    Address::from_public_key(&key.verifying_key().to_bytes())
}

/// Sign an order hash.
pub fn sign_order(order: &Order, key: &SigningKey) -> OrderParam {
    let hash = order.hash();
    let signature = key.sign(hash.as_bytes());
    OrderParam {
        order: order.clone(),
        signature: OrderSignature {
            public_key: hex::encode(key.verifying_key().to_bytes()),
            signature: hex::encode(signature.to_bytes()),
        },
    }
}
