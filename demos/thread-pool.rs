// Metronome - A buffered Statsd client for Rust!
//
// To the extent possible under law, the author(s) have dedicated all copyright and
// related and neighboring rights to this file to the public domain worldwide.
// This software is distributed without any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication along with this
// software. If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.

// This example shares a single client between 16 worker threads which run
// 100 jobs, each sending a handful of metrics. The client is wrapped in an
// `Arc` so each worker holds a reference to it.

use crossbeam_channel::unbounded;
use metronome::prelude::*;
use metronome::{ClientConfig, StatsdClient};
use std::sync::Arc;
use std::thread;

const WORKERS: usize = 16;
const JOBS: usize = 100;

fn job(client: &StatsdClient) {
    client.incr("foo").unwrap();
    client.time("stats.timed", 320).unwrap();
    client.gauge("foo", 70).unwrap();
    client.gauge_delta("foo", -3).unwrap();
    client.set("users", 123456).unwrap();
}

fn main() {
    let config = ClientConfig::from_env().unwrap();
    let client = Arc::new(StatsdClient::from_config(config).unwrap());
    let (tx, rx) = unbounded::<()>();

    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let client = Arc::clone(&client);
            let rx = rx.clone();
            thread::spawn(move || {
                for _ in rx.iter() {
                    job(&client);
                }
            })
        })
        .collect();

    for _ in 0..JOBS {
        tx.send(()).unwrap();
    }

    // Workers stop once all jobs are taken and the channel is disconnected
    drop(tx);
    for w in workers {
        w.join().unwrap();
    }

    client.shutdown();
    println!("{:?}", client.stats());
}
