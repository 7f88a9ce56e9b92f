//! Core library of the travel-expense tracker.
//!
//! The [`Engine`] owns a database connection and exposes every trip,
//! collaboration and settlement operation as an async method. Each operation
//! runs inside a single database transaction and checks the acting user's
//! relationship to the trip (owner, accepted collaborator, stranger) before
//! mutating anything.

pub use collaborations::{Collaboration, CollaborationStatus, CollaboratorEntry};
pub use commands::{CollaborationExpenseCmd, ExpenseNewCmd, TripNewCmd, TripUpdateCmd};
pub use error::EngineError;
pub use expenses::{CONTRIBUTION_CATEGORY, Expense};
pub use ops::{Engine, EngineBuilder, ExpenseWithPayer, PendingInvitation};
pub use trips::Trip;
pub use users::UserRef;

mod collaborations;
mod commands;
mod error;
mod expenses;
mod ops;
mod trips;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
