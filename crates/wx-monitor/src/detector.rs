//! Transition detection
//!
//! Each check is a pure function of the previously stored value and the new
//! reading, returning the value to store and an optional alert. Alerts fire
//! on edges only: a signal that stays past a threshold does not re-alert,
//! except wind which re-alerts while the smoothed speed stays high and relies
//! on the sink's suppression interval.

use tracing::{debug, trace};

use crate::alert::AlertMessage;
use crate::reading::Reading;
use crate::state::RollingState;

/// Relative humidity (%) at which rain is likely
pub const HUMID_THRESHOLD: f64 = 96.0;

/// m/s to mph
pub const MPS_TO_MPH: f64 = 2.237;

/// Alert subtopics
pub mod subtopics {
    pub const RAIN: &str = "rain";
    pub const TEMP: &str = "temp";
    pub const HUMIDITY: &str = "humidity";
    pub const WIND: &str = "wind";
}

/// Rain gauge total increased since the last reading
pub fn rain_transition(
    last_total: Option<f64>,
    all_total: f64,
    day_total: f64,
) -> (Option<f64>, Option<AlertMessage>) {
    let alert = match last_total {
        Some(last) if all_total > last => Some(AlertMessage::realtime(
            subtopics::RAIN,
            format!("It's raining! ({:.2}mm today)", day_total),
        )),
        _ => None,
    };
    (Some(all_total), alert)
}

/// Temperature dropped from at-or-above zero to below zero
pub fn below_zero_transition(
    last_temp: Option<f64>,
    temp: f64,
) -> (Option<f64>, Option<AlertMessage>) {
    let alert = match last_temp {
        Some(last) if last >= 0.0 && temp < 0.0 => {
            Some(AlertMessage::realtime(subtopics::TEMP, "Brrr, it's gone below zero!"))
        }
        _ => None,
    };
    (Some(temp), alert)
}

/// Humidity rose through [`HUMID_THRESHOLD`]
///
/// An absent reading leaves the stored value untouched.
pub fn humidity_transition(
    last_humidity: Option<f64>,
    humidity: Option<f64>,
) -> (Option<f64>, Option<AlertMessage>) {
    let Some(humidity) = humidity else {
        return (last_humidity, None);
    };
    let alert = match last_humidity {
        Some(last) if last < HUMID_THRESHOLD && humidity >= HUMID_THRESHOLD => {
            Some(AlertMessage::realtime(subtopics::HUMIDITY, "Looks like rain..."))
        }
        _ => None,
    };
    (Some(humidity), alert)
}

/// Runs the per-signal transitions over a [`RollingState`]
#[derive(Debug, Clone)]
pub struct TransitionDetector {
    /// Smoothed wind speed (m/s) above which to alert
    windy: f64,
}

impl TransitionDetector {
    pub fn new(windy: f64) -> Self {
        Self { windy }
    }

    pub fn windy(&self) -> f64 {
        self.windy
    }

    /// Apply a reading to the state, returning any alerts it raises
    pub fn process(&self, state: &mut RollingState, reading: &Reading) -> Vec<AlertMessage> {
        trace!(?reading, "Processing reading");
        let mut alerts = Vec::new();

        match *reading {
            Reading::Rain {
                all_total,
                day_total,
            } => {
                let (stored, alert) = rain_transition(state.last_rain_total, all_total, day_total);
                state.last_rain_total = stored;
                alerts.extend(alert);
            }
            Reading::Temperature { temp, humidity } => {
                // Both checks read the old state before either is stored
                let (temp_stored, below_zero) =
                    below_zero_transition(state.last_outside_temp, temp);
                let (humidity_stored, humid) =
                    humidity_transition(state.last_outside_humidity, humidity);
                state.last_outside_temp = temp_stored;
                state.last_outside_humidity = humidity_stored;
                alerts.extend(below_zero);
                alerts.extend(humid);
            }
            Reading::Humidity { humidity } => {
                let (stored, alert) =
                    humidity_transition(state.last_outside_humidity, Some(humidity));
                state.last_outside_humidity = stored;
                alerts.extend(alert);
            }
            Reading::Wind { speed } => {
                let avg = state.avg_wind.update(speed);
                trace!(speed, avg, "Wind average updated");
                if avg > self.windy {
                    alerts.push(AlertMessage::realtime(
                        subtopics::WIND,
                        format!("It's windy outside - {:.1}mph!", avg * MPS_TO_MPH),
                    ));
                }
            }
        }

        if !alerts.is_empty() {
            debug!(kind = %reading.kind(), count = alerts.len(), "Transition detected");
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::MovingAverage;

    fn temp(temp: f64) -> Reading {
        Reading::Temperature {
            temp,
            humidity: None,
        }
    }

    fn temp_humidity(temp: f64, humidity: f64) -> Reading {
        Reading::Temperature {
            temp,
            humidity: Some(humidity),
        }
    }

    fn rain(all_total: f64) -> Reading {
        Reading::Rain {
            all_total,
            day_total: 0.4,
        }
    }

    fn run(
        detector: &TransitionDetector,
        state: &mut RollingState,
        readings: &[Reading],
    ) -> Vec<AlertMessage> {
        readings
            .iter()
            .flat_map(|r| detector.process(state, r))
            .collect()
    }

    #[test]
    fn test_rain_alerts_only_on_increase_after_seed() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        assert!(detector.process(&mut state, &rain(10.0)).is_empty());
        assert_eq!(state.last_rain_total, Some(10.0));

        let alerts = detector.process(&mut state, &rain(10.5));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subtopic, "rain");
        assert_eq!(alerts[0].body, "It's raining! (0.40mm today)");
        assert_eq!(alerts[0].interval.as_secs(), 7200);

        assert!(detector.process(&mut state, &rain(10.5)).is_empty());
        // Gauge reset still updates the stored total
        assert!(detector.process(&mut state, &rain(0.0)).is_empty());
        assert_eq!(state.last_rain_total, Some(0.0));
    }

    #[test]
    fn test_rain_alert_property() {
        let cases = [
            (None, 5.0, false),
            (Some(5.0), 5.0, false),
            (Some(5.0), 4.0, false),
            (Some(5.0), 5.1, true),
            (Some(0.0), 0.2, true),
        ];
        for (last, total, expected) in cases {
            let (stored, alert) = rain_transition(last, total, 1.0);
            assert_eq!(stored, Some(total));
            assert_eq!(alert.is_some(), expected, "last={last:?} total={total}");
        }
    }

    #[test]
    fn test_below_zero_fires_once() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(2.0),
            ..RollingState::new()
        };

        let alerts = run(&detector, &mut state, &[temp(1.0), temp(-0.5)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subtopic, "temp");
        assert_eq!(alerts[0].body, "Brrr, it's gone below zero!");
    }

    #[test]
    fn test_below_zero_no_repeat_while_below() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(-0.2),
            ..RollingState::new()
        };

        let alerts = run(&detector, &mut state, &[temp(-1.0), temp(-2.0)]);
        assert!(alerts.is_empty());
        // Re-crossing upwards is silent too
        assert!(detector.process(&mut state, &temp(1.5)).is_empty());
        assert_eq!(state.last_outside_temp, Some(1.5));
    }

    #[test]
    fn test_genuine_zero_reading_still_alerts() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        let alerts = run(&detector, &mut state, &[temp(0.0), temp(-0.1)]);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_first_observation_only_seeds() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        let alerts = detector.process(&mut state, &temp_humidity(-3.0, 99.0));
        assert!(alerts.is_empty());
        assert_eq!(state.last_outside_temp, Some(-3.0));
        assert_eq!(state.last_outside_humidity, Some(99.0));
    }

    #[test]
    fn test_humidity_rising_through_threshold() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(10.0),
            last_outside_humidity: Some(85.0),
            ..RollingState::new()
        };

        let alerts = run(
            &detector,
            &mut state,
            &[temp_humidity(10.0, 90.0), temp_humidity(10.0, 97.0)],
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subtopic, "humidity");
        assert_eq!(alerts[0].body, "Looks like rain...");
    }

    #[test]
    fn test_humidity_no_repeat_while_high() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(10.0),
            last_outside_humidity: Some(96.5),
            ..RollingState::new()
        };

        let alerts = run(
            &detector,
            &mut state,
            &[temp_humidity(10.0, 97.0), temp_humidity(10.0, 98.0)],
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_exactly_threshold_counts_as_humid() {
        let (_, alert) = humidity_transition(Some(95.9), Some(HUMID_THRESHOLD));
        assert!(alert.is_some());
    }

    #[test]
    fn test_missing_humidity_keeps_prior_state() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(10.0),
            last_outside_humidity: Some(90.0),
            ..RollingState::new()
        };

        detector.process(&mut state, &temp(9.0));
        assert_eq!(state.last_outside_humidity, Some(90.0));

        let alerts = detector.process(&mut state, &temp_humidity(9.0, 97.0));
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_both_temperature_checks_on_one_event() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(0.5),
            last_outside_humidity: Some(92.0),
            ..RollingState::new()
        };

        let alerts = detector.process(&mut state, &temp_humidity(-0.5, 96.0));
        let subtopics: Vec<&str> = alerts.iter().map(|a| a.subtopic.as_str()).collect();
        assert_eq!(subtopics, vec!["temp", "humidity"]);
    }

    #[test]
    fn test_standalone_humidity_reading() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        let alerts = run(
            &detector,
            &mut state,
            &[
                Reading::Humidity { humidity: 80.0 },
                Reading::Humidity { humidity: 96.0 },
            ],
        );
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_replaying_a_reading_never_double_triggers() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            last_outside_temp: Some(3.0),
            last_outside_humidity: Some(50.0),
            last_rain_total: Some(1.0),
            ..RollingState::new()
        };

        for (reading, expected) in [(temp_humidity(-1.0, 99.0), 2), (rain(2.0), 1)] {
            assert_eq!(detector.process(&mut state, &reading).len(), expected);
            assert!(detector.process(&mut state, &reading).is_empty());
        }
    }

    #[test]
    fn test_wind_alerts_on_smoothed_average() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        // A single gust barely moves the average
        let alerts = run(
            &detector,
            &mut state,
            &[Reading::Wind { speed: 2.0 }, Reading::Wind { speed: 30.0 }],
        );
        assert!(alerts.is_empty());

        // Sustained wind eventually pushes the average over
        let mut alerts = Vec::new();
        for _ in 0..200 {
            alerts = detector.process(&mut state, &Reading::Wind { speed: 12.0 });
            if !alerts.is_empty() {
                break;
            }
        }
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subtopic, "wind");
        assert!(alerts[0].body.starts_with("It's windy outside - "));
        assert!(alerts[0].body.ends_with("mph!"));

        // No hysteresis: still above, alerts again
        let alerts = detector.process(&mut state, &Reading::Wind { speed: 12.0 });
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_startup_gust_does_not_alert() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState::new();

        let alerts = run(
            &detector,
            &mut state,
            &[
                Reading::Wind { speed: 20.0 },
                Reading::Wind { speed: 2.0 },
                Reading::Wind { speed: 2.0 },
            ],
        );
        assert!(alerts.is_empty(), "gust raised {} alerts", alerts.len());
        assert!(state.avg_wind.value() < 1.0);
    }

    #[test]
    fn test_wind_message_in_mph() {
        let detector = TransitionDetector::new(8.0);
        let mut state = RollingState {
            avg_wind: MovingAverage::new(1),
            ..RollingState::new()
        };

        let alerts = detector.process(&mut state, &Reading::Wind { speed: 20.0 });
        assert_eq!(alerts[0].body, "It's windy outside - 44.7mph!");
    }
}
