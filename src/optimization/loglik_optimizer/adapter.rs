//! Bridge from a [`LogLikelihood`] to Argmin's `CostFunction`/`Gradient`.
//!
//! Argmin minimizes, so the adapter exposes `c(θ) = -ℓ(θ)`. An analytic
//! `∇ℓ` is negated; otherwise the cost itself is finite-differenced and no
//! sign flip is needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        finite_diff::fd_gradient,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// `-ℓ(θ)`, rejecting non-finite values.
    fn negative_loglik(&self, theta: &Theta) -> OptResult<Cost> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.negative_loglik(theta)?)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(fd_gradient(&|x: &Theta| self.negative_loglik(x), theta)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    struct Bowl;

    impl LogLikelihood for Bowl {
        type Data = f64;

        fn value(&self, theta: &Theta, center: &f64) -> OptResult<f64> {
            Ok(-theta.mapv(|t| (t - center).powi(2)).sum())
        }

        fn check(&self, _theta: &Theta, _data: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The adapter flips the sign of ℓ and finite-differences the cost when
    // no analytic gradient exists.
    //
    // Given
    // -----
    // - ℓ(θ) = -Σ (θᵢ - 1)², evaluated at θ = [2, 0].
    //
    // Expect
    // ------
    // - cost = 2, ∇c = [2, -2].
    fn adapter_negates_value_and_differences_cost() {
        // Arrange
        let model = Bowl;
        let center = 1.0;
        let adapter = ArgMinAdapter::new(&model, &center);
        let theta = array![2.0, 0.0];

        // Act
        let cost = adapter.cost(&theta).unwrap();
        let grad = adapter.gradient(&theta).unwrap();

        // Assert
        assert_relative_eq!(cost, 2.0, epsilon = 1e-12);
        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], -2.0, epsilon = 1e-6);
    }
}
