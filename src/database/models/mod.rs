pub mod expense;
pub mod facets;

pub use expense::{Expense, NewExpense, StoredExpense};
pub use facets::{Category, DateRange, PaymentMode};
