use anyhow::{bail, Result};
use beacon_core::elapsed_at_least_ms;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CELEBRATION_COOLDOWN_MS: u64 = 600_000;

const LEVEL_CLASSES: [&str; 5] = [
    "count-calm",
    "count-good",
    "count-warning",
    "count-danger",
    "count-emergency",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Calm,
    Good,
    Normal,
    Warning,
    Danger,
    Emergency,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Good => "good",
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Emergency => "emergency",
        }
    }

    /// State class on the total counter. `Normal` carries none.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Calm => Some("count-calm"),
            Self::Good => Some("count-good"),
            Self::Normal => None,
            Self::Warning => Some("count-warning"),
            Self::Danger => Some("count-danger"),
            Self::Emergency => Some("count-emergency"),
        }
    }

    pub fn siren_active(self) -> bool {
        self == Self::Emergency
    }
}

fn default_calm() -> u64 {
    50
}

fn default_good() -> u64 {
    70
}

fn default_warning() -> u64 {
    90
}

fn default_danger() -> u64 {
    100
}

fn default_emergency() -> u64 {
    110
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lower bounds (inclusive) of each level above `calm`.
pub struct AlertThresholds {
    #[serde(default = "default_calm")]
    pub calm: u64,
    #[serde(default = "default_good")]
    pub good: u64,
    #[serde(default = "default_warning")]
    pub warning: u64,
    #[serde(default = "default_danger")]
    pub danger: u64,
    #[serde(default = "default_emergency")]
    pub emergency: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            calm: default_calm(),
            good: default_good(),
            warning: default_warning(),
            danger: default_danger(),
            emergency: default_emergency(),
        }
    }
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = [
            ("calm", self.calm),
            ("good", self.good),
            ("warning", self.warning),
            ("danger", self.danger),
            ("emergency", self.emergency),
        ];
        for pair in ordered.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if upper < lower {
                bail!(
                    "alert threshold '{upper_name}' ({upper}) must not be below '{lower_name}' ({lower})"
                );
            }
        }
        Ok(())
    }

    pub fn level_for(&self, count: u64) -> AlertLevel {
        if count >= self.emergency {
            AlertLevel::Emergency
        } else if count >= self.danger {
            AlertLevel::Danger
        } else if count >= self.warning {
            AlertLevel::Warning
        } else if count >= self.good {
            AlertLevel::Normal
        } else if count >= self.calm {
            AlertLevel::Good
        } else {
            AlertLevel::Calm
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationKind {
    Good,
    Calm,
}

impl CelebrationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Calm => "calm",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Good => 0,
            Self::Calm => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The rendered total-count indicator.
pub struct AlertIndicator {
    pub count: u64,
    pub level: AlertLevel,
    pub siren_active: bool,
}

impl AlertIndicator {
    pub fn new(count: u64, level: AlertLevel) -> Self {
        Self {
            count,
            level,
            siren_active: level.siren_active(),
        }
    }

    pub fn css_class(&self) -> Option<&'static str> {
        self.level.css_class()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of one observation: which classes leave and which one arrives.
pub struct AlertTransition {
    pub previous_level: Option<AlertLevel>,
    pub level: AlertLevel,
    pub removed_classes: Vec<&'static str>,
    pub added_class: Option<&'static str>,
    pub siren_active: bool,
    pub celebration: Option<CelebrationKind>,
}

impl AlertTransition {
    pub fn level_changed(&self) -> bool {
        self.previous_level != Some(self.level)
    }
}

#[derive(Debug, Clone)]
pub struct AlertStateMachine {
    thresholds: AlertThresholds,
    cooldown_ms: u64,
    previous_count: Option<u64>,
    last_celebration_ms: [Option<u64>; 2],
}

impl AlertStateMachine {
    pub fn new(thresholds: AlertThresholds, cooldown_ms: u64) -> Self {
        Self {
            thresholds,
            cooldown_ms,
            previous_count: None,
            last_celebration_ms: [None, None],
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn previous_count(&self) -> Option<u64> {
        self.previous_count
    }

    pub fn indicator(&self) -> Option<AlertIndicator> {
        self.previous_count
            .map(|count| AlertIndicator::new(count, self.thresholds.level_for(count)))
    }

    /// Forgets the previous count so the next observation cannot celebrate.
    /// Cooldown timestamps are kept.
    pub fn reset_baseline(&mut self) {
        self.previous_count = None;
    }

    /// Deepest threshold crossed downwards between two counts, if any.
    pub fn detect_regression(&self, previous: u64, current: u64) -> Option<CelebrationKind> {
        if previous >= self.thresholds.calm && current < self.thresholds.calm {
            Some(CelebrationKind::Calm)
        } else if previous >= self.thresholds.good && current < self.thresholds.good {
            Some(CelebrationKind::Good)
        } else {
            None
        }
    }

    pub fn observe(&mut self, count: u64, now_unix_ms: u64) -> AlertTransition {
        let previous_level = self
            .previous_count
            .map(|previous| self.thresholds.level_for(previous));
        let level = self.thresholds.level_for(count);
        let added_class = level.css_class();
        let removed_classes = LEVEL_CLASSES
            .into_iter()
            .filter(|class| Some(*class) != added_class)
            .collect();

        let celebration = self
            .previous_count
            .and_then(|previous| self.detect_regression(previous, count))
            .filter(|kind| {
                let slot = kind.slot();
                if elapsed_at_least_ms(self.last_celebration_ms[slot], now_unix_ms, self.cooldown_ms)
                {
                    self.last_celebration_ms[slot] = Some(now_unix_ms);
                    true
                } else {
                    false
                }
            });
        self.previous_count = Some(count);

        AlertTransition {
            previous_level,
            level,
            removed_classes,
            added_class,
            siren_active: level.siren_active(),
            celebration,
        }
    }
}

impl Default for AlertStateMachine {
    fn default() -> Self {
        Self::new(AlertThresholds::default(), DEFAULT_CELEBRATION_COOLDOWN_MS)
    }
}
