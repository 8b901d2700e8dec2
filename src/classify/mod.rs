pub mod pipeline;
pub mod postprocessing;
pub mod types;

pub use pipeline::DiseaseClassifier;
pub use postprocessing::ResultFormatter;
pub use types::{ClassProbabilities, ModelInfo, PredictionResult};
