use std::time::Duration;

/// Interval between two volume updates of a ramp.
pub const FADE_TICK: Duration = Duration::from_millis(20);

/// Linear volume ramp evaluated in discrete [`FADE_TICK`] steps.
#[derive(Debug, Clone)]
pub struct FadeRamp {
    initial: f32,
    target: f32,
    step_size: f32,
    steps: u32,
    step: u32,
}

impl FadeRamp {
    pub fn new(initial: f32, target: f32, duration: Duration) -> Self {
        let steps =
            (duration.as_millis() / FADE_TICK.as_millis()).clamp(1, u32::MAX as u128) as u32;
        Self {
            initial,
            target,
            step_size: (target - initial) / steps as f32,
            steps,
            step: 0,
        }
    }

    /// Volume after the next tick and whether the ramp reached its target.
    pub fn advance(&mut self) -> (f32, bool) {
        self.step += 1;
        let volume = self.initial + self.step_size * self.step as f32;

        let reached = (self.step_size > 0.0 && volume >= self.target)
            || (self.step_size < 0.0 && volume <= self.target)
            || self.step_size == 0.0
            || self.step >= self.steps;

        if reached {
            (self.target, true)
        } else {
            (volume, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mut ramp: FadeRamp) -> Vec<f32> {
        let mut values = Vec::new();
        loop {
            let (volume, done) = ramp.advance();
            values.push(volume);
            if done {
                return values;
            }
            assert!(values.len() < 10_000, "ramp never finished");
        }
    }

    #[test]
    fn fade_in_is_monotonic_and_bounded() {
        let values = run(FadeRamp::new(0.0, 0.7, Duration::from_millis(800)));

        assert_eq!(values.len(), 40);
        assert_eq!(*values.last().unwrap(), 0.7);
        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(values.iter().all(|v| (0.0..=0.7).contains(v)));
    }

    #[test]
    fn fade_out_from_mid_ramp_lands_on_zero() {
        let values = run(FadeRamp::new(0.33, 0.0, Duration::from_millis(500)));

        assert_eq!(values.len(), 25);
        assert_eq!(*values.last().unwrap(), 0.0);
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert!(values.iter().all(|v| (0.0..=0.33).contains(v)));
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let values = run(FadeRamp::new(0.0, 0.7, Duration::ZERO));
        assert_eq!(values, vec![0.7]);
    }

    #[test]
    fn flat_ramp_finishes_immediately() {
        let values = run(FadeRamp::new(0.5, 0.5, Duration::from_secs(1)));
        assert_eq!(values, vec![0.5]);
    }

    #[test]
    fn partial_step_count_clamps_to_target() {
        let values = run(FadeRamp::new(0.0, 1.0, Duration::from_millis(50)));
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], 1.0);
    }
}
