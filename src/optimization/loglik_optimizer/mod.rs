//! loglik_optimizer — Argmin-backed maximum-likelihood driver.
//!
//! Purpose
//! -------
//! Let a model implement one trait, [`LogLikelihood`], and get back a
//! validated [`OptimOutcome`] from [`maximize`] without touching Argmin
//! generics. The ARIMAX estimator is the main client.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the cost `-ℓ(θ)`.
//! - [`solver`] builds L-BFGS with More–Thuente or Hager–Zhang line search,
//!   runs it, and normalizes the final state.
//! - [`finite_diff`] supplies the gradient fallback and the scalar Hessian
//!   used for observed-information standard errors.
//! - [`validation`] guards tolerances, parameter vectors, gradients, and
//!   Hessians.
//!
//! Invariants & assumptions
//! ------------------------
//! - θ lives in an unconstrained space; any mapping to model parameters is
//!   the model's business.
//! - `value` reports domain failures as `OptError`, never by panicking.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its own piece on toy objectives; the ARIMAX
//!   integration tests exercise the full path on simulated data.

pub mod adapter;
pub mod finite_diff;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::finite_diff::{fd_gradient, scalar_hessian};
pub use self::solver::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::solver::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Grad, Theta};
}
