pub mod charges_model;
pub mod charges_repository;
pub mod charges_service;

pub use charges_model::{AccountCharge, CompoundFrequency, NewAccountCharge, PaymentFrequency};
pub use charges_repository::ChargeRepository;
pub use charges_service::ChargeService;
