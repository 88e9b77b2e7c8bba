//! Declarative aggregation tables
//!
//! Each step type maps source fields to the statistic computed per 12-hour
//! bucket and the column name the result is stored under. `lai_hv`, `lai_lv`,
//! `u10` and `v10` are intermediate columns consumed by feature derivation.

use super::operations::AggFunc;
use crate::frame::StepType;

/// One source field → statistic → output column mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggRule {
    pub source: &'static str,
    pub func: AggFunc,
    pub output: &'static str,
}

const fn rule(source: &'static str, func: AggFunc, output: &'static str) -> AggRule {
    AggRule {
        source,
        func,
        output,
    }
}

pub const INSTANT_RULES: &[AggRule] = &[
    rule("t2m", AggFunc::Mean, "t2m_mean"),
    rule("t2m", AggFunc::Max, "t2m_max"),
    rule("t2m", AggFunc::Min, "t2m_min"),
    rule("d2m", AggFunc::Mean, "d2m_mean"),
    rule("skt", AggFunc::Mean, "skt_mean"),
    rule("sp", AggFunc::Mean, "sp_mean"),
    rule("blh", AggFunc::Mean, "blh_mean"),
    rule("tcc", AggFunc::Mean, "tcc_mean"),
    rule("swvl1", AggFunc::Mean, "soil_moisture"),
    rule("lai_hv", AggFunc::Mean, "lai_hv"),
    rule("lai_lv", AggFunc::Mean, "lai_lv"),
    rule("u10", AggFunc::Mean, "u10"),
    rule("v10", AggFunc::Mean, "v10"),
];

pub const ACCUM_RULES: &[AggRule] = &[
    rule("tp", AggFunc::Sum, "tp_sum"),
    rule("e", AggFunc::Sum, "e_sum"),
    rule("ssrd", AggFunc::Sum, "ssrd_sum"),
];

/// Rule table for a step type
#[must_use]
pub const fn rules_for(step_type: StepType) -> &'static [AggRule] {
    match step_type {
        StepType::Instant => INSTANT_RULES,
        StepType::Accumulated => ACCUM_RULES,
    }
}
