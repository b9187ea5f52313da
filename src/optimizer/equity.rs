//! Energy-security assessment and surplus redistribution during scarcity.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::HouseholdId;

use super::NetworkState;

const VULNERABLE_BELOW: f64 = 0.7;
const DONOR_MARGIN: f64 = 1.2;
const EMERGENCY_SHARE: f64 = 0.2;
const MIN_TRANSFER_KWH: f64 = 0.1;
const IMMEDIATE_BELOW_KWH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn from_security(security: f64) -> Self {
        if security < 0.3 {
            Self::Critical
        } else if security < 0.5 {
            Self::High
        } else if security < VULNERABLE_BELOW {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySecurity {
    pub household_id: HouseholdId,
    /// (generation + stored) / demand, clamped to [0, 1].
    pub energy_security: f64,
    pub vulnerable: bool,
    pub priority_level: PriorityLevel,
    pub shortfall_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Immediate,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: HouseholdId,
    pub to: HouseholdId,
    pub amount_kwh: f64,
    pub kind: TransferKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedistributionPlan {
    pub transfers: Vec<Transfer>,
    pub total_redistributed_kwh: f64,
    pub beneficiaries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitableAccess {
    pub assessments: Vec<EnergySecurity>,
    pub vulnerable_count: usize,
    pub equity_score: f64,
    pub emergency_support_required: bool,
    pub redistribution: RedistributionPlan,
}

pub fn assess_equity(network: &NetworkState) -> EquitableAccess {
    let online: Vec<_> = network.households.iter().filter(|f| f.is_online).collect();

    let assessments: Vec<EnergySecurity> = online
        .iter()
        .map(|f| {
            let available = f.predicted_generation_kwh + f.stored_energy_kwh;
            let demand = f.predicted_demand_kwh;
            let energy_security = if demand > 0.0 {
                (available / demand).clamp(0.0, 1.0)
            } else {
                1.0
            };
            EnergySecurity {
                household_id: f.household_id,
                energy_security,
                vulnerable: energy_security < VULNERABLE_BELOW,
                priority_level: PriorityLevel::from_security(energy_security),
                shortfall_kwh: (demand - available).max(0.0),
            }
        })
        .collect();

    let total = assessments.len();
    let vulnerable_count = assessments.iter().filter(|a| a.vulnerable).count();
    let equity_score = if total > 0 {
        (1.0 - vulnerable_count as f64 / total as f64).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let emergency_support_required =
        total > 0 && vulnerable_count as f64 > total as f64 * EMERGENCY_SHARE;

    // (donor, transferable surplus)
    let mut donors: Vec<(HouseholdId, f64)> = online
        .iter()
        .filter_map(|f| {
            let available = f.predicted_generation_kwh + f.stored_energy_kwh;
            let reserve = f.predicted_demand_kwh * DONOR_MARGIN;
            (available > reserve).then_some((f.household_id, available - reserve))
        })
        .collect();

    let mut transfers = Vec::new();
    for need in assessments
        .iter()
        .filter(|a| a.vulnerable && a.shortfall_kwh > 0.0)
    {
        let Some(donor) = donors
            .iter_mut()
            .find(|(id, surplus)| *surplus > 0.0 && *id != need.household_id)
        else {
            continue;
        };
        let amount = need.shortfall_kwh.min(donor.1);
        if amount < MIN_TRANSFER_KWH {
            continue;
        }
        donor.1 -= amount;
        transfers.push(Transfer {
            from: donor.0,
            to: need.household_id,
            amount_kwh: amount,
            kind: if amount < IMMEDIATE_BELOW_KWH {
                TransferKind::Immediate
            } else {
                TransferKind::Scheduled
            },
        });
    }

    let redistribution = RedistributionPlan {
        total_redistributed_kwh: transfers.iter().map(|t| t.amount_kwh).sum(),
        beneficiaries: transfers.iter().map(|t| t.to).unique().count(),
        transfers,
    };

    EquitableAccess {
        assessments,
        vulnerable_count,
        equity_score,
        emergency_support_required,
        redistribution,
    }
}
