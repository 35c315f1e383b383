// Application layer - Use case interactors

pub mod container;
pub mod edit_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use edit_interactor::{EditInteractor, EditRunRequest, PipelineStep, StepObserver};
