use crossbeam_channel::Receiver;
use metronome::prelude::*;
use metronome::{codec, MetricType, SpyMetricSink, StatsdClient};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod utils;
use utils::{run_arc_threaded_test, METRICS_PER_ITERATION, NUM_ITERATIONS, NUM_THREADS};

fn new_spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    (rx, StatsdClient::from_sink(prefix, sink))
}

fn new_buffered_spy_client(prefix: &str, max: usize) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(prefix, sink)
        .buffered(max)
        .flush_interval(Duration::from_millis(5))
        .build();
    (rx, client)
}

fn received_lines(rx: &Receiver<Vec<u8>>) -> Vec<String> {
    rx.try_iter()
        .flat_map(|p| {
            String::from_utf8(p)
                .unwrap()
                .split('\n')
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_statsd_client_spy_sink_single_threaded() {
    let (rx, client) = new_spy_client("metronome");
    run_arc_threaded_test(client, 1, 1).shutdown();

    assert_eq!(METRICS_PER_ITERATION as usize, received_lines(&rx).len());
}

#[test]
fn test_statsd_client_buffered_spy_sink_single_threaded() {
    let (rx, client) = new_buffered_spy_client("metronome", 512);
    run_arc_threaded_test(client, 1, 1).shutdown();

    assert_eq!(METRICS_PER_ITERATION as usize, received_lines(&rx).len());
}

#[test]
fn test_statsd_client_buffered_spy_sink_sixteen_threads() {
    let (rx, client) = new_buffered_spy_client("metronome", 128);
    let client = run_arc_threaded_test(client, 16, 10);
    client.shutdown();

    let payloads: Vec<Vec<u8>> = rx.try_iter().collect();
    for payload in payloads.iter() {
        assert!(payload.len() <= 128, "payload too long: {}", payload.len());
    }

    let lines: usize = payloads.iter().map(|p| p.split(|b| *b == b'\n').count()).sum();
    assert_eq!(16 * 10 * METRICS_PER_ITERATION as usize, lines);
}

#[test]
fn test_statsd_client_hundred_concurrent_incr() {
    let (rx, client) = new_buffered_spy_client("", 512);
    let client = Arc::new(client);

    let threads: Vec<_> = (0..100)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || client.incr("foo").unwrap())
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
    client.shutdown();

    let lines = received_lines(&rx);
    assert_eq!(100, lines.len());

    for line in lines {
        let metric = codec::decode(&line).unwrap();
        assert_eq!(MetricType::Counter, metric.metric_type());
        assert_eq!("foo", metric.name());
    }
}

#[test]
fn test_statsd_client_send_after_shutdown_from_other_thread() {
    let (rx, client) = new_buffered_spy_client("metronome", 512);
    let client = Arc::new(client);

    client.incr("before").unwrap();

    let other = Arc::clone(&client);
    thread::spawn(move || other.shutdown()).join().unwrap();

    client.incr("after").unwrap();

    assert!(client.is_closed());
    assert_eq!(vec!["metronome.before:1|c".to_string()], received_lines(&rx));
}

#[ignore]
#[test]
fn test_statsd_client_spy_sink_many_threaded() {
    let (rx, client) = new_spy_client("metronome");
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS).shutdown();

    assert_eq!(
        (NUM_THREADS * NUM_ITERATIONS * METRICS_PER_ITERATION) as usize,
        received_lines(&rx).len()
    );
}

#[ignore]
#[test]
fn test_statsd_client_buffered_spy_sink_many_threaded() {
    let (rx, client) = new_buffered_spy_client("metronome", 1432);
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS).shutdown();

    assert_eq!(
        (NUM_THREADS * NUM_ITERATIONS * METRICS_PER_ITERATION) as usize,
        received_lines(&rx).len()
    );
}
