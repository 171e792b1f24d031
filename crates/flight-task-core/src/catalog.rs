//! Catalog of simulator properties read and written by tasks
//!
//! Every property a task touches is a variant of [`Property`]. Each carries
//! the simulator path it is addressed by and whether commands may be written
//! to it. Anything outside the catalog fails to resolve.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Result, TaskError};

/// Access mode of a simulator property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Property can only be read
    Read,
    /// Property can be read and written
    ReadWrite,
}

macro_rules! catalog {
    ($($(#[$doc:meta])* $variant:ident => ($path:literal, $access:ident)),+ $(,)?) => {
        /// Simulator property identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Property {
            $($(#[$doc])* $variant,)+
        }

        impl Property {
            /// Every property in the catalog, in declaration order
            pub const ALL: &'static [Property] = &[$(Property::$variant,)+];

            /// Simulator path of the property
            #[must_use]
            pub const fn path(self) -> &'static str {
                match self {
                    $(Property::$variant => $path,)+
                }
            }

            /// Access mode of the property
            #[must_use]
            pub const fn access(self) -> Access {
                match self {
                    $(Property::$variant => Access::$access,)+
                }
            }
        }
    };
}

catalog! {
    // position and attitude
    /// Altitude above sea level (m)
    PositionHSlM => ("position/h-sl-m", ReadWrite),
    /// Geocentric longitude (deg)
    PositionLongGcDeg => ("position/long-gc-deg", ReadWrite),
    /// Geodetic latitude (deg)
    PositionLatGeodDeg => ("position/lat-geod-deg", ReadWrite),
    /// Pitch angle (rad)
    AttitudePitchRad => ("attitude/pitch-rad", Read),
    /// Roll angle (rad)
    AttitudeRollRad => ("attitude/roll-rad", Read),
    /// True heading (rad)
    AttitudeHeadingTrueRad => ("attitude/heading-true-rad", Read),

    // body-frame velocities and rates
    /// Body x velocity (m/s)
    VelocitiesUMps => ("velocities/u-mps", Read),
    /// Body y velocity (m/s)
    VelocitiesVMps => ("velocities/v-mps", Read),
    /// Body z velocity (m/s)
    VelocitiesWMps => ("velocities/w-mps", Read),
    /// Downward velocity in the local frame (m/s)
    VelocitiesVDownMps => ("velocities/v-down-mps", Read),
    /// Roll rate (rad/s)
    VelocitiesPRadSec => ("velocities/p-rad_sec", Read),
    /// Pitch rate (rad/s)
    VelocitiesQRadSec => ("velocities/q-rad_sec", Read),
    /// Yaw rate (rad/s)
    VelocitiesRRadSec => ("velocities/r-rad_sec", Read),

    // control surfaces
    /// Left aileron position, normalised
    FcsLeftAileronPosNorm => ("fcs/left-aileron-pos-norm", Read),
    /// Right aileron position, normalised
    FcsRightAileronPosNorm => ("fcs/right-aileron-pos-norm", Read),
    /// Elevator position, normalised
    FcsElevatorPosNorm => ("fcs/elevator-pos-norm", Read),
    /// Rudder position, normalised
    FcsRudderPosNorm => ("fcs/rudder-pos-norm", Read),
    /// Aileron command in [-1, 1]
    FcsAileronCmdNorm => ("fcs/aileron-cmd-norm", ReadWrite),
    /// Elevator command in [-1, 1]
    FcsElevatorCmdNorm => ("fcs/elevator-cmd-norm", ReadWrite),
    /// Rudder command in [-1, 1]
    FcsRudderCmdNorm => ("fcs/rudder-cmd-norm", ReadWrite),
    /// Throttle command in [0, 1]
    FcsThrottleCmdNorm => ("fcs/throttle-cmd-norm", ReadWrite),

    // aerodynamics and loads
    /// Sideslip angle (deg)
    AeroBetaDeg => ("aero/beta-deg", Read),
    /// Pilot load factor along x (g)
    AccelerationsNPilotXNorm => ("accelerations/n-pilot-x-norm", Read),
    /// Pilot load factor along y (g)
    AccelerationsNPilotYNorm => ("accelerations/n-pilot-y-norm", Read),
    /// Pilot load factor along z (g)
    AccelerationsNPilotZNorm => ("accelerations/n-pilot-z-norm", Read),

    // simulation
    /// Elapsed simulation time (s)
    SimulationSimTimeSec => ("simulation/sim-time-sec", Read),
    /// Non-zero when the airframe is in an unrecoverable state
    DetectExtremeState => ("detect/extreme-state", Read),

    // task targets
    /// Target heading (deg)
    TargetHeadingDeg => ("tc/target-heading-deg", ReadWrite),
    /// Target altitude (ft)
    TargetAltitudeFt => ("tc/h-sl-ft", ReadWrite),
    /// Target body x velocity (m/s)
    TargetVelocitiesUMps => ("tc/target-velocity-u-mps", ReadWrite),
    /// Sim time at which heading tracking is next checked (s)
    HeadingCheckTime => ("heading_check_time", ReadWrite),
    /// Altitude error to target (m)
    DeltaAltitude => ("position/delta-altitude-to-target-m", Read),
    /// Heading error to target (deg)
    DeltaHeading => ("position/delta-heading-to-target-deg", Read),
    /// Body x velocity error to target (m/s)
    DeltaVelocitiesU => ("position/delta-velocities_u-to-target-mps", Read),
}

impl Property {
    /// Whether commands may be written to this property
    #[must_use]
    pub fn is_writable(self) -> bool {
        self.access() == Access::ReadWrite
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Property {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.path() == s)
            .ok_or_else(|| TaskError::UnknownProperty(s.to_string()))
    }
}

impl Serialize for Property {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl<'de> Deserialize<'de> for Property {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        path.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let paths: HashSet<_> = Property::ALL.iter().map(|p| p.path()).collect();
        assert_eq!(paths.len(), Property::ALL.len());
    }

    #[test]
    fn test_resolve_by_path() {
        let prop: Property = "position/h-sl-m".parse().unwrap();
        assert_eq!(prop, Property::PositionHSlM);
        assert_eq!(prop.to_string(), "position/h-sl-m");
    }

    #[test]
    fn test_unknown_path_is_rejected() {
        let err = "fcs/flaps-cmd-norm".parse::<Property>().unwrap_err();
        assert!(matches!(err, TaskError::UnknownProperty(ref p) if p == "fcs/flaps-cmd-norm"));
    }

    #[test]
    fn test_command_properties_are_writable() {
        assert!(Property::FcsThrottleCmdNorm.is_writable());
        assert!(!Property::AttitudeRollRad.is_writable());
    }

    #[test]
    fn test_serde_uses_path() {
        let json = serde_json::to_string(&Property::AeroBetaDeg).unwrap();
        assert_eq!(json, "\"aero/beta-deg\"");
        let back: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Property::AeroBetaDeg);
        assert!(serde_json::from_str::<Property>("\"nope\"").is_err());
    }
}
