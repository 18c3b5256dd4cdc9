//! Per-trial results and the campaign summary built from them.

/// Outcome of one trial, as logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    /// Propagation model identifier.
    pub model: &'static str,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Signal of the last frame received in the trial; `None` if no frame arrived.
    pub signal_dbm: Option<f64>,
    pub throughput_mbps: f64,
}

impl TrialResult {
    /// Whether the link delivered no bytes at all.
    pub fn is_link_lost(&self) -> bool {
        self.throughput_mbps <= 0.0
    }
}

/// Aggregates for one model over a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub model: &'static str,
    pub trials: usize,
    /// Farthest distance that still delivered traffic.
    pub last_reachable_distance_m: Option<f64>,
    pub peak_throughput_mbps: f64,
}

/// Per-model aggregates, in the order models were first swept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    pub models: Vec<ModelSummary>,
}

impl SweepSummary {
    pub fn record(&mut self, result: &TrialResult) {
        let index = match self.models.iter().position(|m| m.model == result.model) {
            Some(index) => index,
            None => {
                self.models.push(ModelSummary {
                    model: result.model,
                    trials: 0,
                    last_reachable_distance_m: None,
                    peak_throughput_mbps: 0.0,
                });
                self.models.len() - 1
            }
        };
        let summary = &mut self.models[index];
        summary.trials += 1;
        summary.peak_throughput_mbps = summary.peak_throughput_mbps.max(result.throughput_mbps);
        if !result.is_link_lost() {
            summary.last_reachable_distance_m = Some(
                summary
                    .last_reachable_distance_m
                    .map_or(result.distance_m, |d| d.max(result.distance_m)),
            );
        }
    }

    pub fn total_trials(&self) -> usize {
        self.models.iter().map(|m| m.trials).sum()
    }

    pub fn model(&self, model: &str) -> Option<&ModelSummary> {
        self.models.iter().find(|m| m.model == model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(model: &'static str, distance_m: f64, throughput_mbps: f64) -> TrialResult {
        TrialResult {
            model,
            distance_m,
            duration_s: 60.0,
            signal_dbm: None,
            throughput_mbps,
        }
    }

    #[test]
    fn summary_tracks_reach_and_peak_per_model() {
        let mut summary = SweepSummary::default();
        summary.record(&result("Friis", 1.0, 73.7));
        summary.record(&result("Friis", 6.0, 73.8));
        summary.record(&result("Friis", 11.0, 0.0));
        summary.record(&result("FixedRss", 1.0, 40.0));

        assert_eq!(summary.total_trials(), 4);
        let friis = summary.model("Friis").unwrap();
        assert_eq!(friis.trials, 3);
        assert_eq!(friis.last_reachable_distance_m, Some(6.0));
        assert_eq!(friis.peak_throughput_mbps, 73.8);
        assert_eq!(summary.models[1].model, "FixedRss");
    }

    #[test]
    fn model_that_never_delivers_has_no_reach() {
        let mut summary = SweepSummary::default();
        summary.record(&result("TwoRayGround", 1.0, 0.0));
        let two_ray = summary.model("TwoRayGround").unwrap();
        assert_eq!(two_ray.last_reachable_distance_m, None);
        assert_eq!(two_ray.peak_throughput_mbps, 0.0);
    }
}
