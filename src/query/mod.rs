pub mod aggregate;
pub mod filter;

pub use aggregate::{summarize, MonthlyBreakdown, MonthlyCategoryTotal, Period};
pub use filter::{build_query, ExpenseQuery, FilterParams, FilterSelection, Predicate, SortSpec};
