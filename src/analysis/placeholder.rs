//! Stand-in signal and outlook sources.
//!
//! Nothing here looks at prices. Every value is a uniform random draw, kept
//! behind traits so a real model can replace it without touching the dashboard.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::bar::Bar;
use crate::model::signal::{BarSignal, Sentiment, Trend};

pub trait SignalSource {
    /// One entry per bar, in bar order.
    fn signals(&mut self, bars: &[Bar]) -> Vec<BarSignal>;
}

pub trait OutlookSource {
    fn trend(&mut self, bars: &[Bar]) -> Trend;
    fn sentiment(&mut self, bars: &[Bar]) -> Sentiment;
}

#[derive(Debug, Clone)]
pub struct RandomPlaceholder {
    rng: StdRng,
}

impl RandomPlaceholder {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl SignalSource for RandomPlaceholder {
    fn signals(&mut self, bars: &[Bar]) -> Vec<BarSignal> {
        // Buy flags for every row are drawn before any sell flag.
        let buys: Vec<bool> = bars.iter().map(|_| self.rng.gen_bool(0.5)).collect();
        buys.into_iter()
            .map(|buy| BarSignal {
                buy,
                sell: self.rng.gen_bool(0.5),
            })
            .collect()
    }
}

impl OutlookSource for RandomPlaceholder {
    fn trend(&mut self, _bars: &[Bar]) -> Trend {
        Trend::ALL[self.rng.gen_range(0..Trend::ALL.len())]
    }

    fn sentiment(&mut self, _bars: &[Bar]) -> Sentiment {
        Sentiment::ALL[self.rng.gen_range(0..Sentiment::ALL.len())]
    }
}
