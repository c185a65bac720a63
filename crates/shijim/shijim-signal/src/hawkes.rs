//! Hawkes process intensities with an exponential kernel.
//!
//! The closed-form decay makes the update O(1) per event: intensity relaxes
//! toward the baseline between events and jumps on arrival,
//!
//! ```text
//! lambda(t) = mu + (lambda_prev - mu) * exp(-beta * (t - t_prev)) + alpha
//! ```

/// Kernel parameters for one event type.
#[derive(Debug, Clone, Copy)]
pub struct HawkesParams {
    /// Baseline intensity (events per unit time).
    pub mu: f64,
    /// Jump added by each arrival.
    pub alpha: f64,
    /// Decay rate of excitation.
    pub beta: f64,
}

/// Univariate self-exciting intensity.
#[derive(Debug)]
pub struct Hawkes {
    params: HawkesParams,
    lambda: f64,
    last_t: Option<f64>,
}

impl Hawkes {
    pub fn new(params: HawkesParams) -> Self {
        Self {
            params,
            lambda: params.mu,
            last_t: None,
        }
    }

    /// Registers an event at time `t` (same unit as `beta`'s inverse) and
    /// returns the post-jump intensity.
    ///
    /// Out-of-order timestamps are clamped: a non-positive elapsed time
    /// applies no decay, only the jump.
    pub fn on_event(&mut self, t: f64) -> f64 {
        let p = self.params;
        let decayed = match self.last_t {
            Some(prev) if t > prev => {
                p.mu + (self.lambda - p.mu) * (-p.beta * (t - prev)).exp()
            }
            Some(_) => self.lambda,
            None => p.mu,
        };
        self.lambda = decayed + p.alpha;
        self.last_t = Some(t);
        self.lambda
    }

    /// Intensity at time `t` without registering an event.
    pub fn intensity_at(&self, t: f64) -> f64 {
        let p = self.params;
        match self.last_t {
            Some(prev) if t > prev => {
                p.mu + (self.lambda - p.mu) * (-p.beta * (t - prev)).exp()
            }
            Some(_) => self.lambda,
            None => p.mu,
        }
    }

    /// Post-jump intensity as of the last event (baseline before any event).
    pub fn intensity(&self) -> f64 {
        self.lambda
    }

    /// Returns to the baseline with no event history.
    pub fn reset(&mut self) {
        self.lambda = self.params.mu;
        self.last_t = None;
    }
}

/// Mutually exciting intensities over `n` event types.
///
/// Cross-excitation is a flat row-major matrix: `alpha[src * n + dst]` is the
/// jump that an event of type `src` adds to the intensity of type `dst`. All
/// intensities share one event clock and decay together.
#[derive(Debug)]
pub struct MultivariateHawkes {
    mu: Vec<f64>,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    lambda: Vec<f64>,
    last_t: Option<f64>,
}

impl MultivariateHawkes {
    /// `alpha` is row-major `n x n`; `mu` and `beta` have length `n`.
    pub fn new(mu: Vec<f64>, alpha: Vec<f64>, beta: Vec<f64>) -> Self {
        let n = mu.len();
        assert_eq!(alpha.len(), n * n, "alpha must be n x n");
        assert_eq!(beta.len(), n, "beta must have one rate per type");
        Self {
            lambda: mu.clone(),
            mu,
            alpha,
            beta,
            last_t: None,
        }
    }

    pub fn types(&self) -> usize {
        self.mu.len()
    }

    /// Registers an event of type `src` at time `t`: decays every intensity
    /// to `t`, then applies the `src` row of cross-jumps.
    pub fn on_event(&mut self, src: usize, t: f64) {
        let n = self.types();
        assert!(src < n, "event type out of range");

        if let Some(prev) = self.last_t {
            if t > prev {
                let dt = t - prev;
                for i in 0..n {
                    self.lambda[i] =
                        self.mu[i] + (self.lambda[i] - self.mu[i]) * (-self.beta[i] * dt).exp();
                }
            }
        }
        for dst in 0..n {
            self.lambda[dst] += self.alpha[src * n + dst];
        }
        self.last_t = Some(t);
    }

    /// Post-jump intensity of one type as of the last event.
    pub fn intensity(&self, dst: usize) -> f64 {
        self.lambda[dst]
    }

    pub fn reset(&mut self) {
        self.lambda.copy_from_slice(&self.mu);
        self.last_t = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: HawkesParams = HawkesParams {
        mu: 0.5,
        alpha: 0.8,
        beta: 2.0,
    };

    #[test]
    fn first_event_jumps_from_baseline() {
        let mut h = Hawkes::new(PARAMS);
        assert_eq!(h.intensity(), 0.5);
        assert_eq!(h.on_event(10.0), 0.5 + 0.8);
    }

    #[test]
    fn excitation_decays_between_events() {
        let mut h = Hawkes::new(PARAMS);
        h.on_event(0.0);

        // lambda(1) = mu + (1.3 - mu) * exp(-2), then +alpha on arrival.
        let expected = 0.5 + 0.8 * (-2.0f64).exp() + 0.8;
        let got = h.on_event(1.0);
        assert!((got - expected).abs() < 1e-12, "{got} vs {expected}");
    }

    #[test]
    fn intensity_at_decays_without_jumping() {
        let mut h = Hawkes::new(PARAMS);
        h.on_event(0.0);
        let at_2 = h.intensity_at(2.0);
        assert!(at_2 < h.intensity());
        assert!(at_2 > PARAMS.mu);
        // Querying does not change state.
        assert_eq!(h.intensity(), 1.3);
    }

    #[test]
    fn far_future_relaxes_to_baseline() {
        let mut h = Hawkes::new(PARAMS);
        h.on_event(0.0);
        assert!((h.intensity_at(1e6) - PARAMS.mu).abs() < 1e-12);
    }

    #[test]
    fn non_monotonic_timestamp_applies_only_the_jump() {
        let mut h = Hawkes::new(PARAMS);
        h.on_event(5.0);
        let before = h.intensity();
        assert_eq!(h.on_event(5.0), before + PARAMS.alpha);
    }

    #[test]
    fn reset_restores_baseline() {
        let mut h = Hawkes::new(PARAMS);
        h.on_event(1.0);
        h.reset();
        assert_eq!(h.intensity(), PARAMS.mu);
        assert_eq!(h.on_event(3.0), PARAMS.mu + PARAMS.alpha);
    }

    #[test]
    fn cross_excitation_uses_the_source_row() {
        // Two types; trades (0) excite quotes (1) strongly, quotes excite
        // nothing.
        let mu = vec![0.1, 0.2];
        let alpha = vec![
            0.5, 0.9, // src = trade
            0.0, 0.0, // src = quote
        ];
        let beta = vec![1.0, 1.0];
        let mut h = MultivariateHawkes::new(mu, alpha, beta);

        h.on_event(0, 0.0);
        assert!((h.intensity(0) - 0.6).abs() < 1e-12);
        assert!((h.intensity(1) - 1.1).abs() < 1e-12);

        h.on_event(1, 0.0);
        // Quote events add nothing on either axis.
        assert!((h.intensity(0) - 0.6).abs() < 1e-12);
        assert!((h.intensity(1) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn multivariate_decay_tracks_each_beta() {
        let mu = vec![0.0, 0.0];
        // Type 0 jumps both intensities to 1; type 1 jumps nothing, so a
        // type-1 event at t=1 only applies one unit of decay.
        let alpha = vec![1.0, 1.0, 0.0, 0.0];
        let beta = vec![1.0, 10.0];
        let mut h = MultivariateHawkes::new(mu, alpha, beta);

        h.on_event(0, 0.0);
        h.on_event(1, 1.0);

        assert!((h.intensity(0) - (-1.0f64).exp()).abs() < 1e-12);
        assert!((h.intensity(1) - (-10.0f64).exp()).abs() < 1e-12);
    }
}
