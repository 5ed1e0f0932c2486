//! Canonical object extraction from task artifacts.

use serde_json::{Map, Value};

use crate::a2a::wire::{data_maps, Artifact};
use crate::codec::{self, CanonicalObject};
use crate::error::{Ap2Error, Ap2Result};

fn raw_values<'a>(artifacts: &'a [Artifact], key: &'a str) -> impl Iterator<Item = &'a Value> {
    artifacts
        .iter()
        .flat_map(|artifact| data_maps(&artifact.parts))
        .filter_map(move |data| data.get(key))
}

/// Every `T` in artifact order.
pub fn all<T: CanonicalObject>(artifacts: &[Artifact]) -> Ap2Result<Vec<T>> {
    raw_values(artifacts, T::DATA_KEY)
        .map(|value| codec::from_value(T::NAME, value))
        .collect()
}

/// The first `T`; `NotFound` when there is none.
pub fn first<T: CanonicalObject>(artifacts: &[Artifact]) -> Ap2Result<T> {
    let value = raw_values(artifacts, T::DATA_KEY)
        .next()
        .ok_or_else(|| Ap2Error::not_found(T::DATA_KEY))?;
    codec::from_value(T::NAME, value)
}

/// The only `T`; `AmbiguousResult` when several exist, `NotFound` when none.
pub fn exactly_one<T: CanonicalObject>(artifacts: &[Artifact]) -> Ap2Result<T> {
    let values: Vec<&Value> = raw_values(artifacts, T::DATA_KEY).collect();
    match values.as_slice() {
        [] => Err(Ap2Error::not_found(T::DATA_KEY)),
        [value] => codec::from_value(T::NAME, value),
        _ => Err(Ap2Error::AmbiguousResult {
            key: T::DATA_KEY.to_string(),
            count: values.len(),
        }),
    }
}

/// The first data map of the first artifact that has one.
pub fn first_data(artifacts: &[Artifact]) -> Ap2Result<&Map<String, Value>> {
    artifacts
        .iter()
        .flat_map(|artifact| data_maps(&artifact.parts))
        .next()
        .ok_or_else(|| Ap2Error::not_found("artifact data"))
}

/// First raw value under `key` across all artifacts.
pub fn find<'a>(artifacts: &'a [Artifact], key: &'a str) -> Option<&'a Value> {
    raw_values(artifacts, key).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::wire::Part;
    use crate::keys;
    use crate::types::ContactAddress;
    use serde_json::json;

    fn address_artifact(city: &str) -> Artifact {
        Artifact::new(vec![Part::data(keys::CONTACT_ADDRESS, json!({ "city": city }))])
    }

    #[test]
    fn test_exactly_one_rejects_two() {
        let artifacts = vec![address_artifact("A"), address_artifact("B")];
        let err = exactly_one::<ContactAddress>(&artifacts).unwrap_err();
        assert!(matches!(err, Ap2Error::AmbiguousResult { count: 2, .. }));

        let first: ContactAddress = first(&artifacts).unwrap();
        assert_eq!(first.city.as_deref(), Some("A"));
    }

    #[test]
    fn test_exactly_one_single() {
        let artifacts = vec![
            Artifact::new(vec![Part::data(keys::RISK_DATA, json!("r"))]),
            address_artifact("A"),
        ];
        let only: ContactAddress = exactly_one(&artifacts).unwrap();
        assert_eq!(only.city.as_deref(), Some("A"));
    }

    #[test]
    fn test_none_is_not_found() {
        let artifacts = vec![Artifact::new(vec![Part::text("nothing")])];
        assert!(matches!(
            first::<ContactAddress>(&artifacts),
            Err(Ap2Error::NotFound { .. })
        ));
        assert!(matches!(
            exactly_one::<ContactAddress>(&artifacts),
            Err(Ap2Error::NotFound { .. })
        ));
        assert!(all::<ContactAddress>(&artifacts).unwrap().is_empty());
        assert!(first_data(&artifacts).is_err());
    }

    #[test]
    fn test_all_in_artifact_order() {
        let artifacts = vec![address_artifact("A"), address_artifact("B"), address_artifact("C")];
        let cities: Vec<_> = all::<ContactAddress>(&artifacts)
            .unwrap()
            .into_iter()
            .filter_map(|a| a.city)
            .collect();
        assert_eq!(cities, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_first_data() {
        let artifacts = vec![
            Artifact::new(vec![Part::text("x")]),
            Artifact::new(vec![Part::data("token", json!("tok"))]),
        ];
        assert_eq!(first_data(&artifacts).unwrap()["token"], "tok");
        assert_eq!(find(&artifacts, "token"), Some(&json!("tok")));
    }
}
