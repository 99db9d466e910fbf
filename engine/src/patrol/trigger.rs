//! What ends a dwell on an orbit

use crate::kinematics::AngularRate;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Condition that ends surveillance on the current orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwitchTrigger {
    /// Switch after `dwell_duration` seconds on the orbit
    #[default]
    Dwell,

    /// Switch at the first of `count` evenly spaced exchange points reached
    /// after one full revolution
    ExchangePoints { count: u32 },

    /// Never switch on its own; the caller commands transits
    External,
}

impl SwitchTrigger {
    /// Seconds to surveil before the next switch decision
    ///
    /// `angle` is the current angle about the center and `rate` the rate just
    /// configured for the orbit. `None` means the dwell never ends on its own.
    pub fn dwell_budget(&self, dwell_duration: f64, angle: f64, rate: AngularRate) -> Option<f64> {
        match *self {
            SwitchTrigger::Dwell => Some(dwell_duration),
            SwitchTrigger::ExchangePoints { count } => {
                Some(exchange_point_budget(count, angle, rate))
            }
            SwitchTrigger::External => None,
        }
    }
}

/// One revolution plus the rotation to the next exchange point ahead
fn exchange_point_budget(count: u32, angle: f64, rate: AngularRate) -> f64 {
    let omega = rate.magnitude;
    let step = TAU / count as f64;
    let revolution = TAU / omega;
    let to_point = if rate.sign > 0.0 {
        (angle / step).ceil() * step - angle
    } else {
        angle - (angle / step).floor() * step
    };
    revolution + to_point / omega
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_dwell_is_fixed() {
        let rate = AngularRate::new(0.1, 1.0);
        assert_eq!(SwitchTrigger::Dwell.dwell_budget(10.0, 1.0, rate), Some(10.0));
        assert_eq!(SwitchTrigger::External.dwell_budget(10.0, 1.0, rate), None);
    }

    #[test]
    fn test_exchange_point_ahead_counter_clockwise() {
        // Four points at multiples of pi/2; from pi/4 the next one ahead is pi/2
        let rate = AngularRate::new(0.5, 1.0);
        let budget = SwitchTrigger::ExchangePoints { count: 4 }
            .dwell_budget(0.0, FRAC_PI_2 / 2.0, rate)
            .unwrap();
        let expected = TAU / 0.5 + (FRAC_PI_2 / 2.0) / 0.5;
        assert!((budget - expected).abs() < 1e-12);
    }

    #[test]
    fn test_exchange_point_ahead_clockwise() {
        // Clockwise from 3pi/4 the next point is pi/2
        let rate = AngularRate::new(0.5, -1.0);
        let angle = 3.0 * FRAC_PI_2 / 2.0;
        let budget = SwitchTrigger::ExchangePoints { count: 4 }
            .dwell_budget(0.0, angle, rate)
            .unwrap();
        let expected = TAU / 0.5 + (angle - FRAC_PI_2) / 0.5;
        assert!((budget - expected).abs() < 1e-12);
    }

    #[test]
    fn test_on_exchange_point_waits_one_revolution() {
        let rate = AngularRate::new(0.25, 1.0);
        let budget = SwitchTrigger::ExchangePoints { count: 2 }
            .dwell_budget(0.0, 0.0, rate)
            .unwrap();
        assert_eq!(budget, TAU / 0.25);
    }
}
