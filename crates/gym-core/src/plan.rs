//! Membership Plans
//!
//! The plan catalogue offered on the website. Prices are monthly, in rupees.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GymError;

/// Membership plan tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Standard,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Standard, Plan::Premium];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Standard => "standard",
            Plan::Premium => "premium",
        }
    }

    /// Catalogue entry for this plan
    pub fn details(&self) -> PlanDetails {
        match self {
            Plan::Basic => PlanDetails {
                plan: *self,
                name: "Basic Plan",
                monthly_price: dec!(999),
                features: vec![
                    "Access to Gym Equipment",
                    "1 Personal Training Session",
                    "Free Fitness Assessment",
                ],
            },
            Plan::Standard => PlanDetails {
                plan: *self,
                name: "Standard Plan",
                monthly_price: dec!(1999),
                features: vec![
                    "All Basic Plan Features",
                    "5 Personal Training Sessions",
                    "Access to Group Classes",
                    "Diet Consultation",
                ],
            },
            Plan::Premium => PlanDetails {
                plan: *self,
                name: "Premium Plan",
                monthly_price: dec!(2999),
                features: vec![
                    "All Standard Plan Features",
                    "Unlimited Personal Training",
                    "Priority Class Booking",
                    "24/7 Gym Access",
                ],
            },
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "standard" => Ok(Plan::Standard),
            "premium" => Ok(Plan::Premium),
            other => Err(GymError::Validation(format!("Unknown plan: {other}"))),
        }
    }
}

/// Catalogue information for a plan
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    pub plan: Plan,
    pub name: &'static str,
    pub monthly_price: Decimal,
    pub features: Vec<&'static str>,
}

/// The full plan catalogue, cheapest first
pub fn catalogue() -> Vec<PlanDetails> {
    Plan::ALL.iter().map(Plan::details).collect()
}
