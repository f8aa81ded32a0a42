use chrono::Duration;
use serde::Deserialize;

use crate::engine::EngineError;
use crate::model::Zone;

/// Message shown when online reservations are switched off and no custom
/// text is configured.
pub const DEFAULT_CLOSURE_MESSAGE: &str =
    "Online reservations are temporarily closed. Please contact us by phone.";

/// Venue-wide booking policy. Mutable between calls, treated as an
/// immutable snapshot within one; defaults apply once at the boundary
/// when a field is not configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Total indoor seats used for capacity calculations.
    pub indoor_capacity: u32,
    /// Total outdoor seats used for capacity calculations.
    pub outdoor_capacity: u32,
    /// How long one booking occupies its seats, including turnaround.
    pub dwell_minutes: u32,
    /// Largest party accepted for indoor and no-preference bookings.
    pub max_party_size_indoor: u32,
    /// Largest party accepted for outdoor bookings.
    pub max_party_size_outdoor: u32,
    pub medium_group_min: u32,
    pub medium_group_max: u32,
    pub large_group_min: u32,
    pub very_large_group_min: u32,
    /// Overlapping large-group cap per zone; very large groups also count
    /// as large.
    pub max_large_groups_indoor: u32,
    pub max_very_large_groups_indoor: u32,
    pub max_large_groups_outdoor: u32,
    /// Same-day bookings must start at least this far in the future.
    pub min_lead_minutes: u32,
    pub reservations_open: bool,
    pub closure_message: Option<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            indoor_capacity: 42,
            outdoor_capacity: 54,
            dwell_minutes: 90,
            max_party_size_indoor: 12,
            max_party_size_outdoor: 8,
            medium_group_min: 5,
            medium_group_max: 6,
            large_group_min: 7,
            very_large_group_min: 9,
            max_large_groups_indoor: 2,
            max_very_large_groups_indoor: 1,
            max_large_groups_outdoor: 2,
            min_lead_minutes: 15,
            reservations_open: true,
            closure_message: None,
        }
    }
}

/// Party-size band. Very large groups also count as large wherever large
/// groups are limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTier {
    Standard,
    Medium,
    Large,
    VeryLarge,
}

impl GroupTier {
    pub fn is_large(self) -> bool {
        matches!(self, GroupTier::Large | GroupTier::VeryLarge)
    }
}

impl PolicyConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reject snapshots that would make admission decisions nonsensical.
    /// Tier boundaries must satisfy
    /// `medium_min <= medium_max < large_min <= very_large_min`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.dwell_minutes == 0 {
            return Err(EngineError::InvalidConfig("dwell must be positive"));
        }
        if self.medium_group_min > self.medium_group_max {
            return Err(EngineError::InvalidConfig("medium tier bounds inverted"));
        }
        if self.medium_group_max >= self.large_group_min {
            return Err(EngineError::InvalidConfig(
                "medium and large tiers overlap",
            ));
        }
        if self.large_group_min > self.very_large_group_min {
            return Err(EngineError::InvalidConfig(
                "large tier starts above very large tier",
            ));
        }
        Ok(())
    }

    pub fn dwell(&self) -> Duration {
        Duration::minutes(self.dwell_minutes as i64)
    }

    pub fn min_lead(&self) -> Duration {
        Duration::minutes(self.min_lead_minutes as i64)
    }

    pub fn zone_capacity(&self, zone: Zone) -> u32 {
        match zone {
            Zone::Indoor => self.indoor_capacity,
            Zone::Outdoor => self.outdoor_capacity,
        }
    }

    pub fn max_party_size(&self, zone: Zone) -> u32 {
        match zone {
            Zone::Indoor => self.max_party_size_indoor,
            Zone::Outdoor => self.max_party_size_outdoor,
        }
    }

    pub fn group_tier(&self, party_size: u32) -> GroupTier {
        if party_size >= self.very_large_group_min {
            GroupTier::VeryLarge
        } else if party_size >= self.large_group_min {
            GroupTier::Large
        } else if party_size >= self.medium_group_min && party_size <= self.medium_group_max {
            GroupTier::Medium
        } else {
            GroupTier::Standard
        }
    }

    pub fn closure_text(&self) -> &str {
        self.closure_message.as_deref().unwrap_or(DEFAULT_CLOSURE_MESSAGE)
    }
}
