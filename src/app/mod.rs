// Application layer - Use case interactors

pub mod container;
pub mod import_interactor;
pub mod inspect_interactor;
pub mod verify_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use import_interactor::{ImportInteractor, ImportRequest};
pub use inspect_interactor::{InspectInteractor, InspectRequest, InspectResponse};
pub use verify_interactor::{VerifyInteractor, VerifyResponse};
