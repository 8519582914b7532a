pub mod activation;
pub mod events;
pub mod ids;
pub mod params;

pub use activation::Activation;
pub use events::{EventHub, TaskEvent};
pub use ids::ActivationId;
pub use params::TaskParameters;
