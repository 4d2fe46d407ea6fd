//! Epoch-driven training loop over the record table.

use crate::agent::{reward, EpsilonGreedyPolicy};
use crate::data::record::FinancialRecord;
use crate::error::EngineError;
use crate::model::{AdamOptimizer, DenseLayer, LtcCell};
use crate::training::config::TrainerConfig;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::debug;

/// Numerically stabilized softmax: the maximum logit is subtracted
/// before exponentiation, which leaves the result unchanged.
pub fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp = logits.mapv(|x| (x - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Snapshot emitted after each epoch through the reporting callback.
#[derive(Debug, Clone)]
pub struct EpochReport {
    pub epoch: usize,
    /// Exploration rate after this epoch's decay
    pub epsilon: f64,
    /// Mean reward over the epoch's records
    pub mean_reward: f64,
    /// Cumulative reward per symbol since training started
    pub cumulative_reward: BTreeMap<String, f64>,
}

/// Drives the three reservoir cells, the linear head, the exploration
/// policy and the optimizer through shuffled epochs. Only the head is
/// trained; the cells stay frozen after construction.
pub struct Trainer {
    config: TrainerConfig,
    macro_cell: LtcCell,
    accounting_cell: LtcCell,
    market_cell: LtcCell,
    macro_state: Array1<f64>,
    accounting_state: Array1<f64>,
    market_state: Array1<f64>,
    head: DenseLayer,
    optimizer: AdamOptimizer,
    policy: EpsilonGreedyPolicy,
    shuffle_rng: StdRng,
    cumulative_reward: BTreeMap<String, f64>,
    last_symbol: Option<String>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let macro_cell = LtcCell::new(config.macro_units, config.macro_inputs, &mut rng)?
            .with_unfolds(config.ode_unfolds)
            .with_sensory_coupling(config.sensory_coupling);
        let accounting_cell =
            LtcCell::new(config.accounting_units, config.accounting_inputs, &mut rng)?
                .with_unfolds(config.ode_unfolds)
                .with_sensory_coupling(config.sensory_coupling);
        let market_cell = LtcCell::new(config.market_units, config.market_inputs, &mut rng)?
            .with_unfolds(config.ode_unfolds)
            .with_sensory_coupling(config.sensory_coupling);

        let combined = config.combined_units();
        let head = DenseLayer::new(combined, config.actions, &mut rng)?;

        let mut optimizer = AdamOptimizer::new(
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.adam_epsilon,
        );
        optimizer.initialize((config.actions, combined), config.actions)?;

        let policy =
            EpsilonGreedyPolicy::new(config.epsilon_start, StdRng::seed_from_u64(rng.gen()));
        let shuffle_rng = StdRng::seed_from_u64(rng.gen());

        let macro_state = macro_cell.init_state();
        let accounting_state = accounting_cell.init_state();
        let market_state = market_cell.init_state();

        Ok(Self {
            config,
            macro_cell,
            accounting_cell,
            market_cell,
            macro_state,
            accounting_state,
            market_state,
            head,
            optimizer,
            policy,
            shuffle_rng,
            cumulative_reward: BTreeMap::new(),
            last_symbol: None,
        })
    }

    /// Run the configured number of epochs over `records`, invoking
    /// `on_epoch` after each one. The record set is reshuffled at the
    /// start of every epoch; epsilon decays once at its end.
    pub fn train<F>(&mut self, records: &[FinancialRecord], mut on_epoch: F) -> Result<(), EngineError>
    where
        F: FnMut(&EpochReport),
    {
        if records.is_empty() {
            return Err(EngineError::EmptyTable);
        }

        let mut order: Vec<usize> = (0..records.len()).collect();

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut self.shuffle_rng);

            let mut epoch_reward = 0.0;
            for &index in &order {
                epoch_reward += self.process_record(&records[index], epoch)?;
            }

            self.policy.decay(self.config.epsilon_decay);

            on_epoch(&EpochReport {
                epoch,
                epsilon: self.policy.epsilon(),
                mean_reward: epoch_reward / records.len() as f64,
                cumulative_reward: self.cumulative_reward.clone(),
            });
        }

        Ok(())
    }

    /// One record: cells step, head forwards, the policy picks an
    /// action, and the surrogate policy gradient updates the head.
    fn process_record(
        &mut self,
        record: &FinancialRecord,
        epoch: usize,
    ) -> Result<f64, EngineError> {
        if self.config.reset_state_on_symbol_change
            && self.last_symbol.as_deref() != Some(record.symbol.as_str())
        {
            if self.last_symbol.is_some() {
                debug!(symbol = %record.symbol, "resetting cell state at symbol boundary");
            }
            self.macro_state = self.macro_cell.init_state();
            self.accounting_state = self.accounting_cell.init_state();
            self.market_state = self.market_cell.init_state();
        }
        self.last_symbol = Some(record.symbol.clone());

        self.macro_state = self
            .macro_cell
            .step(&record.macro_features(), &self.macro_state);
        self.accounting_state = self
            .accounting_cell
            .step(&record.accounting_features(), &self.accounting_state);
        self.market_state = self
            .market_cell
            .step(&record.market_features(), &self.market_state);

        let mut combined = Vec::with_capacity(self.config.combined_units());
        combined.extend(self.macro_state.iter());
        combined.extend(self.accounting_state.iter());
        combined.extend(self.market_state.iter());
        let combined = Array1::from_vec(combined);

        let logits = self.head.forward(&combined);
        let probabilities = softmax(&logits);
        let action = self.policy.select_action(&probabilities);

        let record_reward = reward(record.price, record.next_period_price);
        // No baseline subtraction: the raw reward is the advantage.
        let advantage = record_reward;

        // Gradient of -advantage * log p[action] at the softmax output
        let mut grad = probabilities.mapv(|p| advantage * p);
        grad[action] = -advantage * (1.0 - probabilities[action]);

        let (grad_weights, grad_biases) = self.head.backward(&combined, &grad);
        let DenseLayer {
            ref mut weights,
            ref mut biases,
            ..
        } = self.head;
        // The step index follows the epoch, not the record; Adam's
        // bias-correction ramp advances once per epoch.
        self.optimizer
            .update(weights, biases, &grad_weights, &grad_biases, epoch + 1)?;

        *self
            .cumulative_reward
            .entry(record.symbol.clone())
            .or_insert(0.0) += record_reward;

        Ok(record_reward)
    }

    /// Cumulative reward per symbol since training started.
    pub fn cumulative_reward(&self) -> &BTreeMap<String, f64> {
        &self.cumulative_reward
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    /// The trained readout layer.
    pub fn head(&self) -> &DenseLayer {
        &self.head
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}
