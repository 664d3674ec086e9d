/// Accumulator that decouples a fixed-rate step function from the variable
/// frame rate: real elapsed time is banked, and the step function runs once
/// per `1/rate` seconds of banked time, carrying the remainder forward.
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(rate: f32) -> Self {
        Self {
            step: 1.0 / rate,
            accumulator: 0.0,
        }
    }

    /// Banks `elapsed` seconds and drains it step by step. The step function
    /// returns false to signal "no more work", which stops draining and
    /// makes `advance` return false; true otherwise.
    pub fn advance<F>(&mut self, elapsed: f32, mut step_fn: F) -> bool
    where
        F: FnMut() -> bool,
    {
        self.accumulator += elapsed;
        while self.accumulator > self.step {
            if !step_fn() {
                return false;
            }
            self.accumulator -= self.step;
        }
        true
    }
}
