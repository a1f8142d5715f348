//! RSA-PSS primitives: MGF1(SHA-256), maximum salt length, SHA-256 digest.
//!
//! Compiled in with the `signing` feature. Without it `AVAILABLE` is false and
//! every primitive refuses, which is what the signer and verifier key their
//! fallback and fail-closed rules on.

#[cfg(feature = "signing")]
mod imp {
    use anyhow::Context;
    use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
    use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
    use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
    use rsa::rand_core::OsRng;
    use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
    use rsa::traits::PublicKeyParts;
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use sha2::Sha256;

    pub const AVAILABLE: bool = true;

    const SHA256_LEN: usize = 32;

    /// emLen - hLen - 2, with emLen = ceil((modBits - 1) / 8).
    pub(crate) fn max_salt_len(modulus_bits: usize) -> usize {
        let em_len = (modulus_bits.saturating_sub(1) + 7) / 8;
        em_len.saturating_sub(SHA256_LEN + 2)
    }

    fn private_key(pem: &str) -> anyhow::Result<RsaPrivateKey> {
        match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(k) => Ok(k),
            Err(_) => RsaPrivateKey::from_pkcs1_pem(pem).context("unreadable RSA private key"),
        }
    }

    fn public_key(pem: &str) -> anyhow::Result<RsaPublicKey> {
        match RsaPublicKey::from_public_key_pem(pem) {
            Ok(k) => Ok(k),
            Err(_) => RsaPublicKey::from_pkcs1_pem(pem).context("unreadable RSA public key"),
        }
    }

    pub fn sign_pem(pem: &str, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        let key = private_key(pem)?;
        let salt_len = max_salt_len(key.n().bits());
        let signer = BlindedSigningKey::<Sha256>::new_with_salt_len(key, salt_len);
        let signature: Signature = signer
            .try_sign_with_rng(&mut OsRng, payload)
            .context("RSA-PSS signing")?;
        Ok(signature.to_bytes().to_vec())
    }

    /// `Ok(false)` on mismatch; `Err` only for unusable key material.
    pub fn verify_pem(pem: &str, payload: &[u8], signature: &[u8]) -> anyhow::Result<bool> {
        let key = public_key(pem)?;
        let salt_len = max_salt_len(key.n().bits());
        let verifier = VerifyingKey::<Sha256>::new_with_salt_len(key, salt_len);
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        Ok(verifier.verify(payload, &signature).is_ok())
    }
}

#[cfg(not(feature = "signing"))]
mod imp {
    pub const AVAILABLE: bool = false;

    pub fn sign_pem(_pem: &str, _payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("built without the `signing` feature")
    }

    pub fn verify_pem(_pem: &str, _payload: &[u8], _signature: &[u8]) -> anyhow::Result<bool> {
        anyhow::bail!("built without the `signing` feature")
    }
}

pub use imp::{sign_pem, verify_pem, AVAILABLE};
