//! Rate table: model id → per-unit prices
//!
//! Prices are `Decimal` so long sessions accumulate without float drift.
//! Text rates are per token, audio rates per second (derived from the
//! published per-minute prices).

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{Direction, Modality};

/// Per-unit prices for one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRates {
    /// Price per input text token
    pub text_input: Decimal,
    /// Price per output text token
    pub text_output: Decimal,
    /// Price per second of input audio
    pub audio_input: Decimal,
    /// Price per second of output audio
    pub audio_output: Decimal,
}

impl ModelRates {
    /// Text-only rates (chat models)
    #[must_use]
    pub fn text_only(text_input: Decimal, text_output: Decimal) -> Self {
        Self {
            text_input,
            text_output,
            audio_input: Decimal::ZERO,
            audio_output: Decimal::ZERO,
        }
    }

    /// Price for one unit in the given bucket
    #[must_use]
    pub const fn unit_rate(&self, modality: Modality, direction: Direction) -> Decimal {
        match (modality, direction) {
            (Modality::Text, Direction::Input) => self.text_input,
            (Modality::Text, Direction::Output) => self.text_output,
            (Modality::Audio, Direction::Input) => self.audio_input,
            (Modality::Audio, Direction::Output) => self.audio_output,
        }
    }
}

/// Mapping from model identifier to its per-unit prices
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    models: HashMap<String, ModelRates>,
}

impl RateTable {
    /// Empty table (every model unrated)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in prices as of Nov 2024. Update as the vendor changes them.
    #[must_use]
    pub fn builtin() -> Self {
        let mut models = HashMap::new();

        // Realtime API: $5/1M text in, $20/1M text out,
        // $0.06/min audio in, $0.24/min audio out
        models.insert(
            "gpt-4o-realtime-preview-2024-12-17".to_string(),
            ModelRates {
                text_input: Decimal::new(5, 6),
                text_output: Decimal::new(2, 5),
                audio_input: Decimal::new(1, 3),
                audio_output: Decimal::new(4, 3),
            },
        );

        // Chat models: $2.50/1M in, $10/1M out
        models.insert(
            "gpt-4o".to_string(),
            ModelRates::text_only(Decimal::new(25, 7), Decimal::new(1, 5)),
        );

        // $0.15/1M in, $0.60/1M out
        models.insert(
            "gpt-4o-mini".to_string(),
            ModelRates::text_only(Decimal::new(15, 8), Decimal::new(6, 7)),
        );

        Self { models }
    }

    /// Add or replace a model's rates
    pub fn set(&mut self, model: impl Into<String>, rates: ModelRates) {
        self.models.insert(model.into(), rates);
    }

    /// Rates for a model, `None` if unrated
    #[must_use]
    pub fn get(&self, model: &str) -> Option<&ModelRates> {
        self.models.get(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_realtime_model() {
        let table = RateTable::builtin();
        let rates = table.get("gpt-4o-realtime-preview-2024-12-17").unwrap();
        assert_eq!(rates.text_input, Decimal::new(5, 6));
        assert_eq!(rates.audio_output, Decimal::new(4, 3));
    }

    #[test]
    fn chat_models_have_no_audio_rate() {
        let table = RateTable::builtin();
        let rates = table.get("gpt-4o-mini").unwrap();
        assert_eq!(rates.audio_input, Decimal::ZERO);
        assert_eq!(rates.audio_output, Decimal::ZERO);
    }

    #[test]
    fn unknown_model_is_unrated() {
        assert!(RateTable::builtin().get("o9-maxi").is_none());
    }

    #[test]
    fn per_minute_prices_divide_to_seconds() {
        // $0.06/min == $0.001/s, $0.24/min == $0.004/s
        let table = RateTable::builtin();
        let rates = table.get("gpt-4o-realtime-preview-2024-12-17").unwrap();
        assert_eq!(rates.audio_input * Decimal::from(60), Decimal::new(6, 2));
        assert_eq!(rates.audio_output * Decimal::from(60), Decimal::new(24, 2));
    }
}
