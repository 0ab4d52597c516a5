//! Fixed facet enumerations shared by the filter builder, the HTTP layer and
//! the terminal client. Adding a variant here changes every consumer at once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Rental,
    Groceries,
    Entertainment,
    Travel,
    Others,
}

impl Category {
    /// Every category in chart order.
    pub const ALL: [Category; 5] = [
        Category::Rental,
        Category::Groceries,
        Category::Entertainment,
        Category::Travel,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rental => "Rental",
            Self::Groceries => "Groceries",
            Self::Entertainment => "Entertainment",
            Self::Travel => "Travel",
            Self::Others => "Others",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Net Banking")]
    NetBanking,
    Cash,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Upi,
        PaymentMode::CreditCard,
        PaymentMode::NetBanking,
        PaymentMode::Cash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::CreditCard => "Credit Card",
            Self::NetBanking => "Net Banking",
            Self::Cash => "Cash",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown payment mode: {}", s))
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative window applied to the listing. `AllTime` adds no date clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
    #[default]
    #[serde(rename = "all_time")]
    AllTime,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::ThisMonth,
        DateRange::Last30Days,
        DateRange::Last90Days,
        DateRange::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this_month",
            Self::Last30Days => "last_30_days",
            Self::Last90Days => "last_90_days",
            Self::AllTime => "all_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ThisMonth => "This Month",
            Self::Last30Days => "Last 30 Days",
            Self::Last90Days => "Last 90 Days",
            Self::AllTime => "All Time",
        }
    }

    /// Next range in display order, wrapping around.
    pub fn cycle(&self) -> DateRange {
        let pos = DateRange::ALL.iter().position(|r| r == self).unwrap_or(0);
        DateRange::ALL[(pos + 1) % DateRange::ALL.len()]
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown date range: {}", s))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
