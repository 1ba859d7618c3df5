//! Core types for models, settings and file status.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::utils::{CoreError, CoreResult};

/// Engine model variants. Every variant is loaded by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    #[serde(rename = "u2net")]
    U2net,
    #[serde(rename = "u2netp")]
    U2netp,
    #[serde(rename = "u2net_human_seg")]
    U2netHumanSeg,
    #[serde(rename = "silueta")]
    Silueta,
    #[serde(rename = "isnet-general-use")]
    IsnetGeneralUse,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        Self::U2net,
        Self::U2netp,
        Self::U2netHumanSeg,
        Self::Silueta,
        Self::IsnetGeneralUse,
    ];

    /// Name the engine knows this model by
    pub fn name(&self) -> &'static str {
        match self {
            Self::U2net => "u2net",
            Self::U2netp => "u2netp",
            Self::U2netHumanSeg => "u2net_human_seg",
            Self::Silueta => "silueta",
            Self::IsnetGeneralUse => "isnet-general-use",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.name() == name)
            .ok_or_else(|| CoreError::config(format!("Unknown model: {name}")))
    }
}

/// Solid colour the cut-out is composited onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgColor {
    #[default]
    Transparent,
    White,
    Black,
    Red,
    Green,
    Blue,
}

impl BgColor {
    pub const ALL: [BgColor; 6] = [
        Self::Transparent,
        Self::White,
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Blue,
    ];

    /// Straight (non-premultiplied) RGBA value
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::White => [255, 255, 255, 255],
            Self::Black => [0, 0, 0, 255],
            Self::Red => [255, 0, 0, 255],
            Self::Green => [0, 255, 0, 255],
            Self::Blue => [0, 0, 255, 255],
        }
    }
}

/// User-selected processing parameters.
///
/// Copied into each job when it is submitted, so later changes only affect
/// files submitted afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Model variant used for background removal
    pub model: ModelKind,
    /// Backdrop colour for the composited output
    pub bgcolor: BgColor,
}

/// Processing status of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStatus {
    Pending,
    Running,
    Done,
    Error,
}

impl FileStatus {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Done) | (Self::Running, Self::Error)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Position in file listings: failures first, finished work last
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Running => 1,
            Self::Pending => 2,
            Self::Done => 3,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Done => "Done",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

/// What the controller does after a file fails to process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Report the failure as fatal and end the session
    #[default]
    Halt,
    /// Report the failure as fatal but keep processing other files
    Continue,
}

/// Pool sizes and failure handling for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Files processed concurrently
    pub work_workers: usize,
    /// Discovery runs executed concurrently
    pub discover_workers: usize,
    /// Models loaded concurrently by the registry
    pub model_workers: usize,
    pub error_policy: ErrorPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_workers: 8,
            discover_workers: 1,
            model_workers: 1,
            error_policy: ErrorPolicy::Halt,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let capacities = [
            ("workWorkers", self.work_workers),
            ("discoverWorkers", self.discover_workers),
            ("modelWorkers", self.model_workers),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(CoreError::config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}
