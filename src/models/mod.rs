//! Recommender models.
//!
//! Both models implement [`Recommender`](../trait.Recommender.html) and are
//! built from [`Hyperparameters`](cf/struct.Hyperparameters.html) builders
//! over borrowed training structures, so one training set can back many
//! concurrent queries.
pub mod cf;
pub mod ppr;
