#[macro_use]
extern crate criterion;

#[macro_use]
extern crate lazy_static;

use criterion::{Benchmark, Criterion, Throughput};
use rand::{distributions::Distribution, rngs::SmallRng, SeedableRng};
use rand_distr::Gamma;
use streamhist::StreamingHistogram;

lazy_static! {
    static ref NORMAL_SMALL: Vec<f64> = get_gamma_distribution(1000);
    static ref NORMAL_LARGE: Vec<f64> = get_gamma_distribution(1000000);
    static ref LINEAR_SMALL: Vec<f64> = get_linear_distribution(1000);
    static ref LINEAR_LARGE: Vec<f64> = get_linear_distribution(1000000);
}

fn get_gamma_distribution(len: usize) -> Vec<f64> {
    // Start with a seeded RNG so that we predictably regenerate our data.
    let mut rng = SmallRng::seed_from_u64(len as u64);

    // This Gamma distribution gets us pretty close to a typical web server response time
    // distribution where there's a big peak down low, and a long tail that drops off sharply.
    let gamma = Gamma::new(1.75, 1.0).expect("failed to create gamma distribution");

    gamma.sample_iter(&mut rng).take(len).collect::<Vec<f64>>()
}

fn get_linear_distribution(len: usize) -> Vec<f64> {
    // Monotonically increasing values: the insertion cursor always starts at the right spot,
    // which is the algorithm's best case.
    (0..len).map(|i| i as f64).collect()
}

macro_rules! define_basic_benches {
    ($c:ident, $name:expr, $input:ident) => {
        $c.bench(
            $name,
            Benchmark::new("insert (64 bins)", |b| {
                b.iter(|| {
                    let mut histogram =
                        StreamingHistogram::new(64).expect("failed to create histogram");
                    for value in $input.iter() {
                        histogram.insert(*value);
                    }
                    histogram
                })
            })
            .with_function("insert (256 bins)", |b| {
                b.iter(|| {
                    let mut histogram =
                        StreamingHistogram::new(256).expect("failed to create histogram");
                    for value in $input.iter() {
                        histogram.insert(*value);
                    }
                    histogram
                })
            })
            .throughput(Throughput::Elements($input.len() as u64)),
        )
    };
}

fn histogram_benchmark(c: &mut Criterion) {
    define_basic_benches!(c, "normal small", NORMAL_SMALL);
    define_basic_benches!(c, "normal large", NORMAL_LARGE);
    define_basic_benches!(c, "linear small", LINEAR_SMALL);
    define_basic_benches!(c, "linear large", LINEAR_LARGE);
}

criterion_group!(benches, histogram_benchmark);
criterion_main!(benches);
