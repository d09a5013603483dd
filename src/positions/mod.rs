pub mod positions_model;
pub mod positions_repository;
pub mod positions_service;

pub use positions_model::{
    AssetAllocation, AssetClass, NewPosition, PortfolioSummary, Position, PositionSummary,
};
pub use positions_repository::PositionRepository;
pub use positions_service::PositionService;
