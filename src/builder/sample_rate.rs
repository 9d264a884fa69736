use crate::types::{ErrorKind, MetricError};
use std::fmt;

/// Represents the sample rate of a metric. This is used to determine how often
/// a metric should be sent to the the statsd server. The sample rate is a value
/// greater than 0.0 and less than or equal to 1.0.
///
/// > A float between 0 and 1, inclusive. Only works with COUNT, HISTOGRAM,
/// > DISTRIBUTION, and TIMER metrics. The default is 1, which samples 100% of the
/// > time.
/// > - via [DataDog](https://docs.datadoghq.com/developers/dogstatsd/datagram_shell)
///
/// The rate is written using the shortest decimal representation that parses
/// back to the same value, so the receiver scales by exactly the rate used to
/// sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SampleRate {
    value: f64,
}

impl SampleRate {
    pub(crate) const ONE: SampleRate = SampleRate { value: 1.0 };

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_one(&self) -> bool {
        self.value == 1.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate::ONE
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = MetricError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        if rate > 0.0 && rate <= 1.0 {
            Ok(SampleRate { value: rate })
        } else {
            Err(MetricError::from((
                ErrorKind::InvalidMetric,
                "Sample rate must be greater than 0.0 and at most 1.0",
            )))
        }
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.value)
    }
}
