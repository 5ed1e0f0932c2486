//! Canonical object codec.
//!
//! A canonical object travels as a single data part entry under a well-known
//! key. Decoding validates the value against the object's schema at the
//! boundary, so business logic only ever sees typed values.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::a2a::wire::{data_maps, Part};
use crate::error::{Ap2Error, Ap2Result};
use crate::keys;
use crate::types::{CartMandate, ContactAddress, IntentMandate, PaymentMandate, PaymentMethodData};

/// A typed object with a well-known data key.
pub trait CanonicalObject: Serialize + DeserializeOwned {
    const DATA_KEY: &'static str;
    const NAME: &'static str;
}

impl CanonicalObject for IntentMandate {
    const DATA_KEY: &'static str = keys::INTENT_MANDATE;
    const NAME: &'static str = "IntentMandate";
}

impl CanonicalObject for CartMandate {
    const DATA_KEY: &'static str = keys::CART_MANDATE;
    const NAME: &'static str = "CartMandate";
}

impl CanonicalObject for PaymentMandate {
    const DATA_KEY: &'static str = keys::PAYMENT_MANDATE;
    const NAME: &'static str = "PaymentMandate";
}

impl CanonicalObject for PaymentMethodData {
    const DATA_KEY: &'static str = keys::PAYMENT_METHOD_DATA;
    const NAME: &'static str = "PaymentMethodData";
}

impl CanonicalObject for ContactAddress {
    const DATA_KEY: &'static str = keys::CONTACT_ADDRESS;
    const NAME: &'static str = "ContactAddress";
}

/// Encode `object` as a data part under its well-known key.
pub fn encode<T: CanonicalObject>(object: &T) -> Ap2Result<Part> {
    Ok(Part::data(T::DATA_KEY, serde_json::to_value(object)?))
}

/// First raw value under `key`, without validation.
pub fn find<'a>(key: &str, parts: &'a [Part]) -> Option<&'a Value> {
    data_maps(parts).find_map(|data| data.get(key))
}

/// Every raw value under `key`, in part order, without validation.
pub fn find_all<'a>(key: &str, parts: &'a [Part]) -> Vec<&'a Value> {
    data_maps(parts).filter_map(|data| data.get(key)).collect()
}

/// First string value under `key`. Empty strings count as absent.
pub fn find_str<'a>(key: &str, parts: &'a [Part]) -> Option<&'a str> {
    find(key, parts)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Validate a raw value against `T`.
pub fn from_value<T: DeserializeOwned>(name: &str, value: &Value) -> Ap2Result<T> {
    T::deserialize(value).map_err(|e| Ap2Error::validation(name, e.to_string()))
}

/// Decode the first value under `T::DATA_KEY`.
pub fn decode<T: CanonicalObject>(parts: &[Part]) -> Ap2Result<T> {
    decode_key(T::DATA_KEY, T::NAME, parts)
}

/// Decode the first value under an arbitrary key.
pub fn decode_key<T: DeserializeOwned>(key: &str, name: &str, parts: &[Part]) -> Ap2Result<T> {
    let value = find(key, parts).ok_or_else(|| Ap2Error::not_found(key))?;
    from_value(name, value)
}

/// Decode every value under `T::DATA_KEY`. Any invalid entry fails the lot.
pub fn decode_all<T: CanonicalObject>(parts: &[Part]) -> Ap2Result<Vec<T>> {
    find_all(T::DATA_KEY, parts)
        .into_iter()
        .map(|value| from_value(T::NAME, value))
        .collect()
}

/// One decoded canonical object of any registered kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    IntentMandate(IntentMandate),
    CartMandate(CartMandate),
    PaymentMandate(PaymentMandate),
    PaymentMethodData(PaymentMethodData),
    ContactAddress(ContactAddress),
}

impl Canonical {
    /// Decode a `key -> value` entry. Unregistered keys yield `None`.
    pub fn decode_entry(key: &str, value: &Value) -> Ap2Result<Option<Self>> {
        let decoded = match key {
            keys::INTENT_MANDATE => Self::IntentMandate(from_value(IntentMandate::NAME, value)?),
            keys::CART_MANDATE => Self::CartMandate(from_value(CartMandate::NAME, value)?),
            keys::PAYMENT_MANDATE => Self::PaymentMandate(from_value(PaymentMandate::NAME, value)?),
            keys::PAYMENT_METHOD_DATA => {
                Self::PaymentMethodData(from_value(PaymentMethodData::NAME, value)?)
            }
            keys::CONTACT_ADDRESS => Self::ContactAddress(from_value(ContactAddress::NAME, value)?),
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }

    /// Decode every registered entry in `parts`, in order.
    pub fn decode_parts(parts: &[Part]) -> Ap2Result<Vec<Self>> {
        let mut out = Vec::new();
        for data in data_maps(parts) {
            for (key, value) in data {
                if let Some(object) = Self::decode_entry(key, value)? {
                    out.push(object);
                }
            }
        }
        Ok(out)
    }

    pub fn data_key(&self) -> &'static str {
        match self {
            Self::IntentMandate(_) => IntentMandate::DATA_KEY,
            Self::CartMandate(_) => CartMandate::DATA_KEY,
            Self::PaymentMandate(_) => PaymentMandate::DATA_KEY,
            Self::PaymentMethodData(_) => PaymentMethodData::DATA_KEY,
            Self::ContactAddress(_) => ContactAddress::DATA_KEY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address_part() -> Part {
        Part::data(keys::CONTACT_ADDRESS, json!({"city": "Sample City", "country": "US"}))
    }

    #[test]
    fn test_decode_first_match() {
        let parts = vec![
            Part::text("hello"),
            address_part(),
            Part::data(keys::CONTACT_ADDRESS, json!({"city": "Other"})),
        ];
        let address: ContactAddress = decode(&parts).unwrap();
        assert_eq!(address.city.as_deref(), Some("Sample City"));
    }

    #[test]
    fn test_decode_missing_is_not_found() {
        let parts = vec![Part::text("hello")];
        let err = decode::<ContactAddress>(&parts).unwrap_err();
        assert!(matches!(err, Ap2Error::NotFound { ref key } if key == keys::CONTACT_ADDRESS));
    }

    #[test]
    fn test_decode_schema_mismatch_is_validation() {
        let parts = vec![Part::data(keys::PAYMENT_METHOD_DATA, json!({"data": {}}))];
        let err = decode::<PaymentMethodData>(&parts).unwrap_err();
        assert!(matches!(err, Ap2Error::Validation { ref what, .. } if what == "PaymentMethodData"));
    }

    #[test]
    fn test_find_all_returns_raw_values_in_order() {
        let parts = vec![
            Part::data(keys::PAYMENT_METHOD_DATA, json!({"supported_methods": "CARD"})),
            Part::text("between"),
            Part::data(keys::PAYMENT_METHOD_DATA, json!("not validated")),
        ];
        let raw = find_all(keys::PAYMENT_METHOD_DATA, &parts);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1], &json!("not validated"));
        assert!(decode_all::<PaymentMethodData>(&parts).is_err());
    }

    #[test]
    fn test_find_str_skips_empty() {
        let parts = vec![Part::data(keys::USER_EMAIL, json!(""))];
        assert!(find_str(keys::USER_EMAIL, &parts).is_none());
    }

    #[test]
    fn test_registry_decodes_known_keys_only() {
        let parts = vec![
            address_part(),
            Part::data("debug_mode", json!(true)),
            Part::data(
                keys::PAYMENT_METHOD_DATA,
                json!({"supported_methods": "CARD", "data": {"network": ["amex"]}}),
            ),
        ];
        let decoded = Canonical::decode_parts(&parts).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].data_key(), keys::CONTACT_ADDRESS);
        assert!(matches!(decoded[1], Canonical::PaymentMethodData(_)));
    }

    #[test]
    fn test_encode_uses_data_key() {
        let part = encode(&ContactAddress::default()).unwrap();
        assert!(part.as_data().unwrap().contains_key(keys::CONTACT_ADDRESS));
    }
}
