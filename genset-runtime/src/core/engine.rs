use serde_derive::{Deserialize, Serialize};

/// Generator operating state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingState {
    /// Generator is at rest, ready to start.
    #[default]
    Stopped = 0x00,
    /// Generator is cranking and ramping up to rated output.
    Starting = 0x01,
    /// Generator is running and accepts load.
    Running = 0x02,
    /// Generator is ramping down.
    Stopping = 0x03,
    /// Generator is in fault.
    Fault = 0x04,
}

impl OperatingState {
    /// Whether the state accepts a load request.
    #[inline]
    pub fn accepts_load(&self) -> bool {
        !matches!(self, OperatingState::Stopped | OperatingState::Fault)
    }
}

impl std::fmt::Display for OperatingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatingState::Stopped => write!(f, "Stopped"),
            OperatingState::Starting => write!(f, "Starting"),
            OperatingState::Running => write!(f, "Running"),
            OperatingState::Stopping => write!(f, "Stopping"),
            OperatingState::Fault => write!(f, "Fault"),
        }
    }
}

impl TryFrom<u8> for OperatingState {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(OperatingState::Stopped),
            0x01 => Ok(OperatingState::Starting),
            0x02 => Ok(OperatingState::Running),
            0x03 => Ok(OperatingState::Stopping),
            0x04 => Ok(OperatingState::Fault),
            _ => Err(()),
        }
    }
}
