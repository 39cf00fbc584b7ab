pub mod classifier_trait;
pub mod factory;
pub mod logistic;

pub use classifier_trait::{ClassifierModel, FittedClassifier, DEFAULT_THRESHOLD};
pub use factory::build_model;
pub use logistic::{FittedLogisticRegression, LogisticRegression};
