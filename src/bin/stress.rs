//! Moves a sequence of integers through every queue variant and checks it
//! arrives intact and in order.
//!
//! Usage:
//!     cargo run --release --bin stress
//!
//! Environment variables:
//!     LFQ_CAPACITY=1024    Slots per queue
//!     LFQ_ITEMS=16777216   Values transferred per run
//!     LFQ_ROUNDS=5         Measured runs per variant, after one warm-up run
//!     LFQ_PRODUCE_US=0     Pause after each successful push, in microseconds
//!     LFQ_CONSUME_US=0     Pause after each successful pop, in microseconds
//!     RUST_LOG=lfq=debug   Log filter, with `--features tracing`

use std::env;
use std::process;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use lfq::{blind, cached, CapacityError, Consumer, Producer, Ring};

const VARIANTS: [&str; 3] = ["cached-u64", "cached-i64", "blind-u64"];

struct Config {
    capacity: usize,
    items: u64,
    rounds: usize,
    produce: Duration,
    consume: Duration,
}

impl Config {
    fn from_env() -> Self {
        Config {
            capacity: var("LFQ_CAPACITY", 1024),
            items: var("LFQ_ITEMS", 1 << 24),
            rounds: var("LFQ_ROUNDS", 5),
            produce: Duration::from_micros(var("LFQ_PRODUCE_US", 0)),
            consume: Duration::from_micros(var("LFQ_CONSUME_US", 0)),
        }
    }
}

fn var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// What a side does when the queue can't make progress.
#[derive(Clone, Copy)]
enum Wait {
    Spin,
    Yield,
}

impl Wait {
    fn detect() -> Self {
        // spinning only helps if the other side is running on another core
        if num_cpus::get() > 1 {
            Wait::Spin
        } else {
            Wait::Yield
        }
    }

    fn wait(self) {
        match self {
            Wait::Spin => std::hint::spin_loop(),
            Wait::Yield => thread::yield_now(),
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Transfers `0..items` and returns the elapsed time, or the first value
/// that arrived out of order.
fn transfer<R>(
    producer: Producer<'_, R>,
    consumer: Consumer<'_, R>,
    config: &Config,
    wait: Wait,
) -> Result<Duration, (u64, u64)>
where
    R: Ring<Item = u64> + Sync,
{
    let (items, produce, consume) = (config.items, config.produce, config.consume);
    let start = Instant::now();

    crossbeam::scope(|scope| {
        scope.spawn(move |_| {
            for i in 0..items {
                while producer.try_push(i).is_err() {
                    wait.wait();
                }
                pause(produce);
            }
        });

        // keep draining after a mismatch so the producer can finish
        let mut mismatch = None;

        for expected in 0..items {
            let value = loop {
                match consumer.try_pop() {
                    Some(value) => break value,
                    None => wait.wait(),
                }
            };

            if value != expected && mismatch.is_none() {
                mismatch = Some((expected, value));
            }
            pause(consume);
        }

        match mismatch {
            Some(mismatch) => Err(mismatch),
            None => Ok(start.elapsed()),
        }
    })
    .unwrap_or_else(|_| {
        eprintln!("producer thread panicked");
        process::exit(1);
    })
}

fn report(name: &str, config: &Config, result: Result<Duration, (u64, u64)>) -> Duration {
    match result {
        Ok(elapsed) => {
            let rate = config.items as f64 / elapsed.as_secs_f64() / 1e6;
            println!("{name:<14} {elapsed:>12.3?} {rate:>8.1} M/s");
            elapsed
        }
        Err((expected, value)) => {
            eprintln!("{name}: expected {expected}, received {value}");
            process::exit(1);
        }
    }
}

/// The mean of `runs` measurements summing to `total`.
fn average(total: Duration, runs: usize) -> Option<Duration> {
    let runs = u32::try_from(runs).ok().filter(|&runs| runs > 0)?;
    Some(total / runs)
}

fn run(config: &Config) -> Result<(), CapacityError> {
    let wait = Wait::detect();
    let mut totals = [Duration::ZERO; VARIANTS.len()];

    // round 0 warms up the caches and the allocator and is not counted
    for round in 0..=config.rounds {
        if round == 0 {
            println!("warm-up");
        } else {
            println!("round {round}");
        }

        let mut queue = cached::Queue::<u64, u64>::new(config.capacity)?;
        let (producer, consumer) = queue.split();
        let cached_u64 = report(VARIANTS[0], config, transfer(producer, consumer, config, wait));

        let mut queue = cached::Queue::<u64, i64>::new(config.capacity)?;
        let (producer, consumer) = queue.split();
        let cached_i64 = report(VARIANTS[1], config, transfer(producer, consumer, config, wait));

        let mut queue = blind::Queue::<u64>::new(config.capacity)?;
        let (producer, consumer) = queue.split();
        let blind_u64 = report(VARIANTS[2], config, transfer(producer, consumer, config, wait));

        if round > 0 {
            for (total, elapsed) in totals.iter_mut().zip([cached_u64, cached_i64, blind_u64]) {
                *total += elapsed;
            }
        }
    }

    println!("mean of {} rounds", config.rounds);
    for (name, total) in VARIANTS.iter().zip(totals) {
        if let Some(mean) = average(total, config.rounds) {
            println!("{name:<14} {mean:>12.3?}");
        }
    }

    Ok(())
}

fn main() {
    lfq::trace::init_tracing();

    let config = Config::from_env();
    println!(
        "capacity: {}, items: {}, rounds: {}, produce: {:?}, consume: {:?}",
        config.capacity, config.items, config.rounds, config.produce, config.consume
    );

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
