use super::Tracker;
use crate::lifecycle::ProfileStatus;

impl Tracker {
    /// Probes every tracked profile and updates its indicator.
    /// Returns how many indicators changed.
    pub async fn refresh_statuses(&self) -> usize {
        let mut changed = 0;

        for profile in self.tracked_profiles() {
            let status = self.probe(&profile).await;
            let Some(indicator) = status.indicator() else {
                log::debug!("No indicator for {} status of {}", status, profile);
                continue;
            };
            if self.apply_indicator(&profile, indicator, None) {
                log::debug!("Profile {} is now {}", profile, status);
                changed += 1;
            }
        }
        changed
    }

    async fn probe(&self, profile: &str) -> ProfileStatus {
        let prober = self.prober.clone();
        let name = profile.to_string();
        match tokio::task::spawn_blocking(move || prober.probe(&name)).await {
            Ok(status) => status,
            Err(e) => {
                log::error!("Status probe for {} failed: {}", profile, e);
                ProfileStatus::Unknown
            }
        }
    }
}
