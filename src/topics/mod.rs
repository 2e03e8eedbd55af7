// Topic modelling: Gibbs-sampled LDA, its metadata-conditioned variant, and
// coherence scoring.

pub mod coherence;
pub mod model;
pub mod progress;
pub mod sampler;
pub mod trainer;

pub use coherence::CoherenceMeasure;
pub use model::{ModelWarning, Priors, TopicModel, TopicTerms};
pub use progress::{Flow, NoopObserver, ObserverError, Progress, ProgressObserver};
pub use sampler::Sampler;
pub use trainer::{
    train, MetadataMode, TermWeighting, TopicFeatureExtractor, TrainConfig, Training, CHUNK_SIZE,
};
