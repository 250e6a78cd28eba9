//! Error types for the rigid3d collision and impulse-response core.
//!
//! The narrow-phase and resolver operate under strict real-time constraints:
//! most numerical edge cases (near-zero denominators, degenerate simplices,
//! iteration caps) are handled inline by falling back to a safe default
//! rather than by propagating an error. This crate exists for the small set
//! of failures that *are* meant to surface to the caller — principally
//! invalid body construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias used throughout the rigid3d crates.
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Errors produced by the rigid3d collision and dynamics core.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicsError {
    /// GJK could not build a non-degenerate simplex: the support oracle
    /// returned the same point across iterations, indicating both inputs
    /// collapse to a point or a single direction.
    #[error("degenerate geometry: support oracle produced no new simplex vertex")]
    DegenerateGeometry,

    /// GJK or EPA exceeded its iteration cap without resolving. Treated by
    /// callers as a safe no-collision result.
    #[error("iteration cap of {limit} exceeded during {stage}")]
    IterationCap {
        /// Which algorithm hit the cap ("gjk" or "epa").
        stage: &'static str,
        /// The configured cap that was exceeded.
        limit: usize,
    },

    /// A rigid body or point body was constructed with non-positive mass.
    #[error("invalid mass {0}: mass must be strictly positive")]
    InvalidMass(f64),
}

impl PhysicsError {
    /// Returns a short machine-readable category, for logging/telemetry.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DegenerateGeometry => "degenerate_geometry",
            Self::IterationCap { .. } => "iteration_cap",
            Self::InvalidMass(_) => "invalid_mass",
        }
    }

    /// Whether this error is recoverable by simply treating the operation
    /// as a no-collision result for the current tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateGeometry | Self::IterationCap { .. })
    }
}
