//! Provider-specific plan modifiers

use declarative::{ModifyRequest, ModifyResponse, PlanModifier, PlannedValue};

/// Carry a positive expiry forward when the configuration leaves it unset.
///
/// The API keeps `expires_after_seconds` once set, so an empty value in the
/// configuration would otherwise show as a perpetual diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarryForwardExpiry;

impl PlanModifier for CarryForwardExpiry {
    fn description(&self) -> &'static str {
        "A positive configured value is used as-is; otherwise the value in state is kept."
    }

    fn modify(&self, request: &ModifyRequest<'_>) -> ModifyResponse {
        let configured = request
            .planned
            .known()
            .and_then(serde_json::Value::as_i64)
            .is_some_and(|n| n > 0);
        if configured {
            return ModifyResponse::keep(request);
        }
        match request.prior {
            Some(prior) if !prior.is_null() => ModifyResponse {
                planned: PlannedValue::Known(prior.clone()),
                requires_replace: false,
            },
            _ => ModifyResponse::keep(request),
        }
    }
}
