//! Simulator — the daily settle / decide / rebalance loop.

use super::cost_model::CostModel;
use super::trade_book::{OpenHolding, TradeBook};
use crate::data::AlignedPair;
use crate::domain::{Asset, ExitReason, Position, Trade};
use crate::gate::{GateThresholds, GateTransition, HysteresisGate};
use crate::signal::{SignalError, SignalReason, SignalRule};
use crate::walk_forward::RiskSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no dates after warm-up: {available} aligned dates, warm-up needs {warmup}")]
    InsufficientData { warmup: usize, available: usize },
    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// State at the close of one simulated date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// NAV after settlement and any commission charged today.
    pub nav: f64,
    /// Holding carried into the next day.
    pub position: Position,
    pub rule_target: Position,
    pub rule_reason: SignalReason,
    pub risk_probability: Option<f64>,
    pub risk_off: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub rule: SignalRule,
    pub days: Vec<DayRecord>,
    pub trades: Vec<Trade>,
    /// Holding still open on the final date; not booked as a trade.
    pub open_holding: Option<OpenHolding>,
}

impl SimulationOutput {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|d| d.date).collect()
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.nav).collect()
    }

    pub fn final_position(&self) -> Position {
        self.days.last().map_or(Position::Cash, |d| d.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulator {
    costs: CostModel,
    thresholds: GateThresholds,
}

impl Simulator {
    pub fn new(costs: CostModel, thresholds: GateThresholds) -> Self {
        Self { costs, thresholds }
    }

    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    pub fn thresholds(&self) -> &GateThresholds {
        &self.thresholds
    }

    /// Simulate the rotation over `pair` with the given windows.
    ///
    /// With `risk` supplied, dates carrying a probability drive the gate and
    /// force cash while it is risk-off; dates without one leave the gate as is
    /// and follow the rule target.
    /// The first post-warm-up date starts at NAV 1.0.
    pub fn run(
        &self,
        pair: &AlignedPair,
        momentum_window: usize,
        ma_window: usize,
        risk: Option<&RiskSeries>,
    ) -> Result<SimulationOutput, EngineError> {
        let rule = SignalRule::new(momentum_window, ma_window)?;
        self.run_rule(pair, &rule, risk)
    }

    pub fn run_rule(
        &self,
        pair: &AlignedPair,
        rule: &SignalRule,
        risk: Option<&RiskSeries>,
    ) -> Result<SimulationOutput, EngineError> {
        let warmup = rule.warmup();
        let n = pair.len();
        if n <= warmup {
            return Err(EngineError::InsufficientData {
                warmup,
                available: n,
            });
        }

        let inputs = rule.precompute(pair);
        let bars_a = pair.bars(Asset::A);
        let bars_b = pair.bars(Asset::B);
        let cash_return = self.costs.daily_cash_return();

        let mut gate = HysteresisGate::new(self.thresholds);
        let mut book = TradeBook::new();
        let mut position = Position::Cash;
        let mut nav = 1.0;
        let mut days = Vec::with_capacity(n - warmup);

        for i in warmup..n {
            let date = pair.dates()[i];

            // 1. settle yesterday's holding
            if i > warmup {
                let day_return = match position {
                    Position::AssetA => bars_a[i].daily_return(),
                    Position::AssetB => bars_b[i].daily_return(),
                    Position::Cash => cash_return,
                };
                nav *= 1.0 + day_return;
            }

            // 2. rotation rule
            let decision = inputs.decide_at(i);
            let mut target = decision.target;
            let mut exit_reason = ExitReason::SignalSwitch;

            // 3. risk gate
            let risk_probability = risk.and_then(|r| r.get(date));
            if let Some(p) = risk_probability {
                let gate_decision = gate.update(p);
                if gate_decision.transition == GateTransition::Tripped {
                    exit_reason = ExitReason::RiskTriggered { probability: p };
                }
                if gate.is_risk_off() {
                    target = Position::Cash;
                }
            }

            // 4. rebalance
            if target != position {
                if let Some(trade) = book.close(date, nav, exit_reason) {
                    tracing::trace!(
                        asset = ?trade.asset,
                        exit_date = %trade.exit_date,
                        return_pct = trade.return_pct,
                        "trade closed"
                    );
                }
                nav *= self.costs.cost_factor(position.legs_to(target));
                if let Some(asset) = target.asset() {
                    book.open(asset, date, nav);
                }
                position = target;
            }

            days.push(DayRecord {
                date,
                nav,
                position,
                rule_target: decision.target,
                rule_reason: decision.reason,
                risk_probability,
                risk_off: gate.is_risk_off(),
            });
        }

        let (trades, open_holding) = book.into_parts();
        tracing::debug!(
            momentum_window = rule.momentum_window(),
            ma_window = rule.ma_window(),
            gated = risk.is_some(),
            days = days.len(),
            trades = trades.len(),
            final_nav = nav,
            "simulation complete"
        );

        Ok(SimulationOutput {
            rule: *rule,
            days,
            trades,
            open_holding,
        })
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(CostModel::default(), GateThresholds::default())
    }
}
