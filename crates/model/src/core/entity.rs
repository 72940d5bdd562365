use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// One logical dataset moved from the legacy store into the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Geography,
    Users,
    Partners,
    CostCenters,
    ChartOfAccounts,
    PaymentTypes,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown entity: {0}")]
pub struct UnknownEntity(pub String);

impl Entity {
    /// Every entity in the order a full run starts them.
    pub const ALL: [Entity; 6] = [
        Entity::Geography,
        Entity::Users,
        Entity::Partners,
        Entity::CostCenters,
        Entity::ChartOfAccounts,
        Entity::PaymentTypes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Geography => "geography",
            Entity::Users => "users",
            Entity::Partners => "partners",
            Entity::CostCenters => "cost_centers",
            Entity::ChartOfAccounts => "chart_of_accounts",
            Entity::PaymentTypes => "payment_types",
        }
    }

    /// Name the entity had in the legacy tooling; still accepted on input.
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Entity::Geography => "cidadeEstado",
            Entity::Users => "users",
            Entity::Partners => "cliFornec",
            Entity::CostCenters => "centroCusto",
            Entity::ChartOfAccounts => "planoContas",
            Entity::PaymentTypes => "tipoPag",
        }
    }

    /// Entities that must have finished before this one starts.
    pub fn depends_on(&self) -> &'static [Entity] {
        match self {
            Entity::Partners => &[Entity::Geography],
            _ => &[],
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Entity::ALL
            .into_iter()
            .find(|e| {
                e.as_str().eq_ignore_ascii_case(needle)
                    || e.legacy_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}
