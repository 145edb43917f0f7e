//! Usage accumulator
//!
//! Collects per-event unit counts into one session's running totals and
//! keeps each model's cost in sync with the rate table. Mutated only
//! from the session's event-processing stream.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RateTable;

/// Unit kind carried by a usage event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Units are tokens
    Text,
    /// Units are seconds
    Audio,
}

/// Which side of the conversation the units belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

/// One usage report from the external API. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    pub model: String,
    pub modality: Modality,
    pub direction: Direction,
    pub units: u64,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    /// Convenience constructor stamped with the current time
    #[must_use]
    pub fn now(
        model: impl Into<String>,
        modality: Modality,
        direction: Direction,
        units: u64,
    ) -> Self {
        Self {
            model: model.into(),
            modality,
            direction,
            units,
            timestamp: Utc::now(),
        }
    }
}

/// Accumulated units and cost for one model within a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub text_input_tokens: u64,
    pub text_output_tokens: u64,
    pub audio_input_secs: u64,
    pub audio_output_secs: u64,
    /// Cost of this model's buckets; zero when `rated` is false
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
    /// False when the model was missing from the rate table
    pub rated: bool,
}

impl ModelUsage {
    fn bucket_mut(&mut self, modality: Modality, direction: Direction) -> &mut u64 {
        match (modality, direction) {
            (Modality::Text, Direction::Input) => &mut self.text_input_tokens,
            (Modality::Text, Direction::Output) => &mut self.text_output_tokens,
            (Modality::Audio, Direction::Input) => &mut self.audio_input_secs,
            (Modality::Audio, Direction::Output) => &mut self.audio_output_secs,
        }
    }

    /// Fold another usage block into this one (lifetime aggregation)
    pub fn merge(&mut self, other: &Self) {
        self.text_input_tokens += other.text_input_tokens;
        self.text_output_tokens += other.text_output_tokens;
        self.audio_input_secs += other.audio_input_secs;
        self.audio_output_secs += other.audio_output_secs;
        self.cost += other.cost;
        self.rated = self.rated || other.rated;
    }
}

/// Finalized or in-flight totals for one conversation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Per-model breakdown, keyed by model id
    pub models: BTreeMap<String, ModelUsage>,
}

impl SessionTotals {
    /// Fresh totals for a session starting now
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            models: BTreeMap::new(),
        }
    }

    /// Sum of all per-model costs
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.models.values().map(|m| m.cost).sum()
    }
}

/// Accumulates usage events for one session
#[derive(Debug)]
pub struct UsageAccumulator {
    rates: RateTable,
    totals: SessionTotals,
}

impl UsageAccumulator {
    /// Create an accumulator for a new session
    #[must_use]
    pub fn new(session_id: impl Into<String>, rates: RateTable) -> Self {
        Self {
            rates,
            totals: SessionTotals::new(session_id),
        }
    }

    /// Record one usage event.
    ///
    /// Adds the units to the matching (model, modality, direction) bucket
    /// and recomputes that model's cost from the rate table. A model
    /// missing from the table accrues units with cost zero and a warning;
    /// the session never fails over pricing.
    pub fn record(&mut self, event: &UsageEvent) {
        if event.units == 0 {
            return;
        }

        let known = self.rates.get(&event.model).copied();
        let first_seen = !self.totals.models.contains_key(&event.model);
        let entry = self.totals.models.entry(event.model.clone()).or_default();
        *entry.bucket_mut(event.modality, event.direction) += event.units;

        if let Some(rates) = known {
            entry.rated = true;
            // Recomputing from totals keeps the cost identical to an
            // incremental update regardless of event order.
            entry.cost = rates.text_input * Decimal::from(entry.text_input_tokens)
                + rates.text_output * Decimal::from(entry.text_output_tokens)
                + rates.audio_input * Decimal::from(entry.audio_input_secs)
                + rates.audio_output * Decimal::from(entry.audio_output_secs);
        } else if first_seen {
            tracing::warn!(model = %event.model, "no rates for model, recording unrated units");
        }
    }

    /// Running total cost across all models
    #[must_use]
    pub fn session_cost(&self) -> Decimal {
        self.totals.total_cost()
    }

    /// Owned copy of the current totals; recording continues unblocked
    #[must_use]
    pub fn snapshot(&self) -> SessionTotals {
        self.totals.clone()
    }

    /// Freeze the totals, stamping the end time
    #[must_use]
    pub fn finish(mut self) -> SessionTotals {
        self.totals.ended_at = Some(Utc::now());
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::super::ModelRates;
    use super::*;

    const REALTIME: &str = "gpt-4o-realtime-preview-2024-12-17";

    fn event(model: &str, modality: Modality, direction: Direction, units: u64) -> UsageEvent {
        UsageEvent::now(model, modality, direction, units)
    }

    #[test]
    fn pricing_sheet_scenario_is_exact() {
        // input=$0.005/unit, output=$0.01/unit; 100 in + 50 out => $1.00
        let mut table = RateTable::empty();
        table.set(
            "gpt-4o-realtime",
            ModelRates::text_only(Decimal::new(5, 3), Decimal::new(1, 2)),
        );

        let mut acc = UsageAccumulator::new("s1", table);
        acc.record(&event("gpt-4o-realtime", Modality::Text, Direction::Input, 100));
        acc.record(&event("gpt-4o-realtime", Modality::Text, Direction::Output, 50));

        assert_eq!(acc.session_cost(), Decimal::ONE);
    }

    #[test]
    fn cost_is_order_independent() {
        let events = [
            event(REALTIME, Modality::Text, Direction::Input, 1200),
            event(REALTIME, Modality::Audio, Direction::Input, 33),
            event(REALTIME, Modality::Text, Direction::Output, 480),
            event(REALTIME, Modality::Audio, Direction::Output, 21),
            event(REALTIME, Modality::Text, Direction::Input, 77),
        ];

        let mut forward = UsageAccumulator::new("s1", RateTable::builtin());
        for e in &events {
            forward.record(e);
        }

        let mut reverse = UsageAccumulator::new("s2", RateTable::builtin());
        for e in events.iter().rev() {
            reverse.record(e);
        }

        assert_eq!(forward.session_cost(), reverse.session_cost());
        assert_eq!(
            forward.snapshot().models[REALTIME],
            reverse.snapshot().models[REALTIME],
        );
    }

    #[test]
    fn cost_matches_rate_times_units() {
        let mut acc = UsageAccumulator::new("s1", RateTable::builtin());
        acc.record(&event(REALTIME, Modality::Audio, Direction::Input, 60));
        acc.record(&event(REALTIME, Modality::Audio, Direction::Output, 30));

        // 60s * $0.001 + 30s * $0.004 = $0.18
        assert_eq!(acc.session_cost(), Decimal::new(18, 2));
    }

    #[test]
    fn unknown_model_accrues_units_at_zero_cost() {
        let mut acc = UsageAccumulator::new("s1", RateTable::builtin());
        acc.record(&event("mystery-model", Modality::Text, Direction::Input, 500));

        let snap = acc.snapshot();
        let usage = &snap.models["mystery-model"];
        assert_eq!(usage.text_input_tokens, 500);
        assert_eq!(usage.cost, Decimal::ZERO);
        assert!(!usage.rated);
        assert_eq!(acc.session_cost(), Decimal::ZERO);
    }

    #[test]
    fn zero_unit_events_are_ignored() {
        let mut acc = UsageAccumulator::new("s1", RateTable::builtin());
        acc.record(&event(REALTIME, Modality::Text, Direction::Input, 0));
        assert!(acc.snapshot().models.is_empty());
    }

    #[test]
    fn snapshot_does_not_block_recording() {
        let mut acc = UsageAccumulator::new("s1", RateTable::builtin());
        acc.record(&event(REALTIME, Modality::Text, Direction::Input, 10));

        let snap = acc.snapshot();
        acc.record(&event(REALTIME, Modality::Text, Direction::Input, 10));

        assert_eq!(snap.models[REALTIME].text_input_tokens, 10);
        assert_eq!(acc.snapshot().models[REALTIME].text_input_tokens, 20);
    }

    #[test]
    fn finish_stamps_end_time() {
        let acc = UsageAccumulator::new("s1", RateTable::builtin());
        let totals = acc.finish();
        assert!(totals.ended_at.is_some());
    }
}
