// Metronome - A buffered Statsd client for Rust!
//
// To the extent possible under law, the author(s) have dedicated all copyright and
// related and neighboring rights to this file to the public domain worldwide.
// This software is distributed without any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication along with this
// software. If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.

// This example sends one metric of every type with an "environment" tag to
// a statsd server, configured from STATSD_* environment variables. Run the
// statsd-listen binary at the same time to see what is sent.

use metronome::prelude::*;
use metronome::{ClientConfig, MetricError, StatsdClient};
use rand::Rng;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), MetricError> {
    let config = ClientConfig::from_env()?;
    let client = StatsdClient::from_config(config)?;
    let mut rng = rand::thread_rng();

    client.incr_with_tags("example_metric.increment").with_tag("environment", "dev").send()?;
    client.decr_with_tags("example_metric.decrement").with_tag("environment", "dev").send()?;
    client.gauge_with_tags("example_metric.gauge", 40).with_tag("environment", "dev").send()?;
    client.set_with_tags("example_metric.set", 40).with_tag("environment", "dev").send()?;
    client
        .histogram_with_tags("example_metric.histogram", rng.gen_range(0..20u64))
        .with_tag("environment", "dev")
        .send()?;

    {
        let _timer = client.timed("example_metric.timer").with_tag("environment", "dev");
        // do something to be measured
        thread::sleep(Duration::from_millis(rng.gen_range(0..1000)));
    }

    client
        .distribution_with_tags("example_metric.distribution", rng.gen_range(0..20u64))
        .with_tag("environment", "dev")
        .send()?;

    // The result of sending can also be inspected, including the metric
    // that was built.
    let res = client
        .count_with_tags("example_metric.count", 3)
        .with_tags(["environment:dev", "user:1234"])
        .try_send();

    println!("Result of metric send: {:?}", res);

    client.shutdown();
    println!("Sent metrics: {:?}", client.stats());
    Ok(())
}
