//! Tree-ensemble models behind a common estimator contract.
pub mod forest;
pub mod tree;

use ndarray::Array2;

use crate::error::Result;

/// Contract shared by the regressor and the classifiers so a pipeline can
/// wrap either. `fit` replaces any previously fitted state.
pub trait Estimator: Send + Sync {
    type Target;

    fn fit(&mut self, x: &Array2<f64>, y: &[Self::Target]) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Self::Target>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "estimator"
    }
}

pub use forest::{RandomForestClassifier, RandomForestRegressor};
