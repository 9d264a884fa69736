use rand::Rng;

/// Decides, once per metric, whether a metric with a given sample rate is
/// actually emitted.
pub(crate) trait Sampling {
    fn new_with_rate(rate: f64) -> Self;
    fn sample<T>(&self, item: T) -> Option<T>;
}

/// Sampler backed by the thread local random number generator.
pub(crate) struct Sampler(f64);

impl Sampler {
    /// Make the emit or drop decision using the given random number generator.
    pub(crate) fn sample_with<R, T>(&self, rng: &mut R, item: T) -> Option<T>
    where
        R: Rng + ?Sized,
    {
        if self.0 >= 1.0 || rng.gen_bool(self.0) {
            Some(item)
        } else {
            None
        }
    }
}

impl Sampling for Sampler {
    fn new_with_rate(rate: f64) -> Self {
        Self(rate)
    }

    fn sample<T>(&self, item: T) -> Option<T> {
        self.sample_with(&mut rand::thread_rng(), item)
    }
}
