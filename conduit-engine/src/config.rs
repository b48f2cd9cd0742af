//! Simulation configuration
//!
//! Every delay the engine uses to fake asynchronous work lives here, so a
//! demo can be slowed down or sped up without touching the services.

use std::time::Duration;

/// Simulation timings
///
/// The defaults reproduce the pacing of the dashboard: half a second before
/// a command is answered, a few seconds before a pipeline completes, and
/// progress bars that move 10% every 500ms.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Pause between a submission and its answer in the shell
    pub command_delay: Duration,

    /// Completion delay for "deploy X to production with tag T"
    pub tagged_deploy_delay: Duration,

    /// Completion delay for a regular deploy
    pub deploy_delay: Duration,

    /// Completion delay for a rollback
    pub rollback_delay: Duration,

    /// Completion delay for a test suite run
    pub test_delay: Duration,

    /// Completion delay for manually run or retried pipelines
    pub run_delay: Duration,

    /// Percentage points added per progress tick
    pub progress_step: u8,

    /// Time between progress ticks
    pub progress_interval: Duration,

    /// Time after monitoring starts before canary metrics refresh
    pub canary_metrics_delay: Duration,

    /// Time after monitoring starts before the canary completes
    pub canary_complete_delay: Duration,

    /// Populate the store with the demo pipelines and logs
    pub seed_demo_data: bool,
}

impl SimulationConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognized variables (all optional, milliseconds unless noted):
    /// - CONDUIT_COMMAND_DELAY_MS (default: 500)
    /// - CONDUIT_DEPLOY_DELAY_MS (default: 3000, also used for tagged deploys)
    /// - CONDUIT_ROLLBACK_DELAY_MS (default: 2500)
    /// - CONDUIT_TEST_DELAY_MS (default: 4000)
    /// - CONDUIT_RUN_DELAY_MS (default: 3000)
    /// - CONDUIT_PROGRESS_STEP (percent, default: 10)
    /// - CONDUIT_PROGRESS_INTERVAL_MS (default: 500)
    /// - CONDUIT_SEED (true/false, default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let deploy_delay = env_millis("CONDUIT_DEPLOY_DELAY_MS").unwrap_or(defaults.deploy_delay);

        let progress_step = match std::env::var("CONDUIT_PROGRESS_STEP") {
            Ok(raw) => raw
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("CONDUIT_PROGRESS_STEP must be 1-100, got '{}'", raw))?,
            Err(_) => defaults.progress_step,
        };

        let seed_demo_data = std::env::var("CONDUIT_SEED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.seed_demo_data);

        let config = Self {
            command_delay: env_millis("CONDUIT_COMMAND_DELAY_MS").unwrap_or(defaults.command_delay),
            tagged_deploy_delay: deploy_delay,
            deploy_delay,
            rollback_delay: env_millis("CONDUIT_ROLLBACK_DELAY_MS")
                .unwrap_or(defaults.rollback_delay),
            test_delay: env_millis("CONDUIT_TEST_DELAY_MS").unwrap_or(defaults.test_delay),
            run_delay: env_millis("CONDUIT_RUN_DELAY_MS").unwrap_or(defaults.run_delay),
            progress_step,
            progress_interval: env_millis("CONDUIT_PROGRESS_INTERVAL_MS")
                .unwrap_or(defaults.progress_interval),
            canary_metrics_delay: defaults.canary_metrics_delay,
            canary_complete_delay: defaults.canary_complete_delay,
            seed_demo_data,
        };

        config.validate()?;
        Ok(config)
    }

    /// Divides every delay by `factor`
    ///
    /// A factor of 10 turns a three second deploy into 300ms.
    pub fn scaled(mut self, factor: u32) -> Self {
        let factor = factor.max(1);
        for delay in [
            &mut self.command_delay,
            &mut self.tagged_deploy_delay,
            &mut self.deploy_delay,
            &mut self.rollback_delay,
            &mut self.test_delay,
            &mut self.run_delay,
            &mut self.progress_interval,
            &mut self.canary_metrics_delay,
            &mut self.canary_complete_delay,
        ] {
            *delay /= factor;
        }
        // tokio intervals panic on a zero period
        self.progress_interval = self.progress_interval.max(Duration::from_millis(1));
        self
    }

    pub fn without_seed(mut self) -> Self {
        self.seed_demo_data = false;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.progress_step == 0 || self.progress_step > 100 {
            anyhow::bail!("progress_step must be between 1 and 100");
        }

        if self.progress_interval.is_zero() {
            anyhow::bail!("progress_interval must be greater than 0");
        }

        if self.canary_metrics_delay > self.canary_complete_delay {
            anyhow::bail!("canary_metrics_delay must not exceed canary_complete_delay");
        }

        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            command_delay: Duration::from_millis(500),
            tagged_deploy_delay: Duration::from_millis(3000),
            deploy_delay: Duration::from_millis(3000),
            rollback_delay: Duration::from_millis(2500),
            test_delay: Duration::from_millis(4000),
            run_delay: Duration::from_millis(3000),
            progress_step: 10,
            progress_interval: Duration::from_millis(500),
            canary_metrics_delay: Duration::from_millis(2000),
            canary_complete_delay: Duration::from_millis(4000),
            seed_demo_data: true,
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
