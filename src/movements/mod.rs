pub mod movements_errors;
pub mod movements_model;
pub mod movements_repository;
pub mod movements_service;

pub use movements_errors::MovementError;
pub use movements_model::{Movement, MovementType, MovementUpdate, NewMovement};
pub use movements_repository::MovementRepository;
pub use movements_service::MovementService;
