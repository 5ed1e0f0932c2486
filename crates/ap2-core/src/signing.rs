//! Mandate authorization hook points.
//!
//! No signature scheme ships here. `DigestSigner` binds a payment
//! authorization to the exact cart and payment contents via content digests,
//! which is enough for tamper detection in tests but proves nothing about who
//! produced it.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Ap2Error, Ap2Result};
use crate::types::{CartMandate, PaymentMandate, PaymentMandateContents};

/// Produces the `user_authorization` value for a payment mandate.
pub trait MandateSigner: Send + Sync {
    fn sign(&self, cart: &CartMandate, payment: &PaymentMandateContents) -> Ap2Result<String>;
}

/// Checks a payment mandate's authorization before it is acted on.
pub trait MandateVerifier: Send + Sync {
    fn verify(&self, mandate: &PaymentMandate) -> Ap2Result<()>;
}

/// `sha256(jcs(cart)) + "_" + sha256(jcs(payment contents))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

impl DigestSigner {
    fn digest<T: Serialize>(value: &T) -> Ap2Result<String> {
        let bytes = serde_jcs::to_vec(value).map_err(|e| Ap2Error::Serialization {
            message: e.to_string(),
        })?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

impl MandateSigner for DigestSigner {
    fn sign(&self, cart: &CartMandate, payment: &PaymentMandateContents) -> Ap2Result<String> {
        Ok(format!("{}_{}", Self::digest(cart)?, Self::digest(payment)?))
    }
}

/// Accepts any mandate whose `user_authorization` is present and non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceVerifier;

impl MandateVerifier for PresenceVerifier {
    fn verify(&self, mandate: &PaymentMandate) -> Ap2Result<()> {
        if mandate.is_authorized() {
            Ok(())
        } else {
            Err(Ap2Error::validation(
                "PaymentMandate",
                "user_authorization is missing",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merchant::Catalog;
    use crate::types::{IntentMandate, PaymentItem, PaymentResponse};
    use chrono::{Duration, Utc};

    fn fixtures() -> (CartMandate, PaymentMandateContents) {
        let intent = IntentMandate::new("mug", Utc::now() + Duration::hours(1));
        let cart = Catalog::demo()
            .offer(&intent, Utc::now(), Duration::minutes(30))
            .remove(0);
        let total: PaymentItem = cart.contents.payment_request.details.total.clone();
        let contents = PaymentMandateContents {
            payment_mandate_id: "pm_1".to_string(),
            payment_details_id: cart.contents.payment_request.details.id.clone(),
            payment_details_total: total,
            payment_response: PaymentResponse::new("order_1", "CARD"),
            merchant_agent: "Generic Merchant".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (cart, contents)
    }

    #[test]
    fn test_digest_signer_is_deterministic() {
        let (cart, contents) = fixtures();
        let a = DigestSigner.sign(&cart, &contents).unwrap();
        let b = DigestSigner.sign(&cart, &contents).unwrap();
        assert_eq!(a, b);

        let (left, right) = a.split_once('_').unwrap();
        assert_eq!(left.len(), 64);
        assert_eq!(right.len(), 64);
    }

    #[test]
    fn test_digest_changes_with_contents() {
        let (cart, mut contents) = fixtures();
        let before = DigestSigner.sign(&cart, &contents).unwrap();
        contents.payment_mandate_id = "pm_2".to_string();
        let after = DigestSigner.sign(&cart, &contents).unwrap();
        assert_eq!(before.split_once('_').unwrap().0, after.split_once('_').unwrap().0);
        assert_ne!(before, after);
    }

    #[test]
    fn test_presence_verifier() {
        let (_, contents) = fixtures();
        let mut mandate = PaymentMandate::new(contents);
        assert!(PresenceVerifier.verify(&mandate).is_err());

        mandate.user_authorization = Some(String::new());
        assert!(PresenceVerifier.verify(&mandate).is_err());

        mandate.user_authorization = Some("sig".to_string());
        assert!(PresenceVerifier.verify(&mandate).is_ok());
    }
}
