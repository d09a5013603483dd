pub mod sections_model;
pub mod sections_repository;
pub mod sections_service;

pub use sections_model::{NewSection, Section};
pub use sections_repository::SectionRepository;
pub use sections_service::SectionService;
