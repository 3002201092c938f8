use vstab_core::RobustConfig;
use vstab_features::DetectorKind;

/// Pipeline configuration. The debug flag lives here and is threaded
/// explicitly into every stage that has an observational side effect;
/// nothing in the pipeline consults ambient state.
#[derive(Debug, Clone)]
pub struct StabConfig {
    /// Which feature detector backs the correspondence extractor.
    pub detector: DetectorKind,
    /// Lowe's ratio test threshold.
    pub ratio_threshold: f32,
    /// Robust homography estimation settings.
    pub ransac: RobustConfig,
    /// Upper bound on the smoothing window radius, in frames.
    pub smoothing_radius: usize,
    /// Fraction of the smaller frame dimension the smoothed path may
    /// deviate from the raw path before the window is shrunk.
    pub crop_budget: f64,
    /// Seed for the detector's sampling pattern and, unless overridden
    /// in `ransac`, the robust estimator.
    pub seed: u64,
    /// Enables correspondence arrows and trajectory trace overlays.
    pub debug: bool,
}

impl Default for StabConfig {
    fn default() -> Self {
        Self {
            detector: DetectorKind::Orb,
            ratio_threshold: 0.75,
            ransac: RobustConfig {
                threshold: 3.0,
                ..Default::default()
            },
            smoothing_radius: 40,
            crop_budget: 0.2,
            seed: 0,
            debug: false,
        }
    }
}

impl StabConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_smoothing_radius(mut self, radius: usize) -> Self {
        self.smoothing_radius = radius;
        self
    }

    /// RANSAC seed: an explicit estimator seed wins, otherwise the
    /// pipeline seed keeps the whole run reproducible.
    pub(crate) fn ransac_config(&self) -> RobustConfig {
        let mut config = self.ransac.clone();
        if config.seed.is_none() {
            config.seed = Some(self.seed);
        }
        config
    }
}
