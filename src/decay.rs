//! Shared decay primitive. `Tensor::apply_decay` and `Graph::apply_decay` both
//! take a time delta in the same units (days) and funnel through this one
//! function, so the two call sites can never disagree on the decay formula.

use crate::scalar::Scalar;

/// `exp(-lambda * max(0, delta_t))`, clamped to zero below `Scalar::decay_epsilon()`.
pub fn decay_multiplier<T: Scalar>(lambda: T, delta_t: T) -> T {
    let dt = if delta_t > T::zero() { delta_t } else { T::zero() };
    let mult = (-lambda * dt).exp();
    if mult < T::decay_epsilon() {
        T::zero()
    } else {
        mult
    }
}

/// Apply the decay multiplier to a single scalar value.
pub fn decay_value<T: Scalar>(value: T, lambda: T, delta_t: T) -> T {
    value * decay_multiplier(lambda, delta_t)
}
