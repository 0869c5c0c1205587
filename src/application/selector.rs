use crate::application::health::HealthEvaluator;
use crate::config::GatewayDescriptor;
use crate::error::{Result, RoutingError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Uniform integer draws for weighted selection.
pub trait RandomSource: Send + Sync {
    /// A value in `[0, bound)`. `bound` is never zero.
    fn next_below(&self, bound: u64) -> u64;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&self, bound: u64) -> u64 {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Reproducible generator for a given seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&self, bound: u64) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..bound)
    }
}

/// Replays scripted draws (reduced modulo the bound); zero once exhausted.
#[derive(Debug, Default)]
pub struct FixedDraws {
    draws: Mutex<VecDeque<u64>>,
}

impl FixedDraws {
    pub fn new(draws: impl IntoIterator<Item = u64>) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
        }
    }
}

impl RandomSource for FixedDraws {
    fn next_below(&self, bound: u64) -> u64 {
        let mut draws = self.draws.lock().unwrap_or_else(|e| e.into_inner());
        draws.pop_front().unwrap_or(0) % bound
    }
}

/// Cumulative-weight roulette over `candidates` in their given order.
///
/// Returns the first candidate whose running weight exceeds `draw`, or the
/// last candidate if none does.
pub fn weighted_pick<'a>(
    candidates: &[&'a GatewayDescriptor],
    draw: u64,
) -> Option<&'a GatewayDescriptor> {
    let mut cumulative = 0u64;
    for &gateway in candidates {
        cumulative += u64::from(gateway.weight);
        if draw < cumulative {
            return Some(gateway);
        }
    }
    candidates.last().copied()
}

/// Picks one gateway per routing request among the enabled, healthy ones.
pub struct GatewaySelector {
    gateways: Vec<GatewayDescriptor>,
    evaluator: Arc<HealthEvaluator>,
    random: Box<dyn RandomSource>,
}

impl GatewaySelector {
    pub fn new(gateways: Vec<GatewayDescriptor>, evaluator: Arc<HealthEvaluator>) -> Self {
        Self::with_random(gateways, evaluator, Box::new(ThreadRandom))
    }

    pub fn with_random(
        gateways: Vec<GatewayDescriptor>,
        evaluator: Arc<HealthEvaluator>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            gateways,
            evaluator,
            random,
        }
    }

    pub fn gateways(&self) -> &[GatewayDescriptor] {
        &self.gateways
    }

    pub fn evaluator(&self) -> &Arc<HealthEvaluator> {
        &self.evaluator
    }

    /// Chooses a gateway, failing with `NoAvailableGateway` when none is eligible.
    pub async fn select_gateway(&self) -> Result<String> {
        let eligible = self.eligible().await?;
        if eligible.is_empty() {
            error!("No healthy gateways available for routing");
            return Err(RoutingError::NoAvailableGateway);
        }

        let total_weight: u64 = eligible.iter().map(|g| u64::from(g.weight)).sum();
        let selected = if total_weight == 0 {
            let index = self.random.next_below(eligible.len() as u64) as usize;
            eligible[index]
        } else {
            let draw = self.random.next_below(total_weight);
            let picked = weighted_pick(&eligible, draw).ok_or(RoutingError::NoAvailableGateway)?;
            debug!(
                gateway = %picked.name,
                weight = picked.weight,
                total_weight,
                draw,
                "Gateway selection"
            );
            picked
        };

        info!(
            gateway = %selected.name,
            available = eligible.len(),
            "Selected gateway"
        );
        Ok(selected.name.clone())
    }

    /// Names of the eligible gateways, in configuration order.
    pub async fn healthy_gateway_names(&self) -> Result<Vec<String>> {
        Ok(self
            .eligible()
            .await?
            .into_iter()
            .map(|g| g.name.clone())
            .collect())
    }

    async fn eligible(&self) -> Result<Vec<&GatewayDescriptor>> {
        let mut eligible = Vec::with_capacity(self.gateways.len());
        for gateway in self.gateways.iter().filter(|g| g.enabled) {
            if self.evaluator.is_healthy(&gateway.name).await? {
                eligible.push(gateway);
            }
        }
        Ok(eligible)
    }
}
