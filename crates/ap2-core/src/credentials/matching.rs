//! Payment method eligibility against merchant criteria.
//!
//! Pure functions: no store access, no side effects.

use crate::types::{PaymentMethod, PaymentMethodData};

/// Whether `method` satisfies `criterion`.
///
/// Requires the method type to equal `supported_methods`, and at least one of
/// the method's networks to match (case-insensitively) one of the criterion's
/// networks. A criterion that declares no network never matches.
pub fn is_eligible(method: &PaymentMethod, criterion: &PaymentMethodData) -> bool {
    if method.kind.as_str() != criterion.supported_methods {
        return false;
    }

    let accepted: Vec<String> = criterion
        .networks()
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    if accepted.is_empty() {
        return false;
    }

    method
        .network
        .iter()
        .any(|network| accepted.contains(&network.name.to_lowercase()))
}

/// Aliases of the methods matching any criterion, in storage order.
pub fn eligible(methods: &[PaymentMethod], criteria: &[PaymentMethodData]) -> Vec<String> {
    methods
        .iter()
        .filter(|method| criteria.iter().any(|criterion| is_eligible(method, criterion)))
        .map(|method| method.alias.clone())
        .collect()
}
