pub mod accounts_model;
pub mod accounts_repository;
pub mod accounts_service;

pub use accounts_model::{Account, AccountKind, AccountUpdate, NewAccount};
pub use accounts_repository::AccountRepository;
pub use accounts_service::AccountService;
