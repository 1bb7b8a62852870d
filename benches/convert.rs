//! Benchmarks for machine conversion.
//!
//! Measures single key presses and whole-message conversion on the standard
//! five-slot machine, with and without a plugboard.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use enigma::config::read_machine;
use enigma::{Machine, Permutation};

const DEFAULT_CONF: &str = include_str!("../tests/fixtures/default.conf");

const MESSAGE: &str = "FROM HIS SHOULDER HIAWATHA TOOK THE CAMERA OF ROSEWOOD \
                       MADE OF SLIDING FOLDING ROSEWOOD NEATLY PUT IT ALL TOGETHER";

fn machine(plugboard: &str) -> Machine {
    let mut machine = read_machine(DEFAULT_CONF.as_bytes()).unwrap();
    machine.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
    machine.set_rotors("AXLE").unwrap();
    let plugboard = Permutation::new(plugboard, machine.alphabet().clone()).unwrap();
    machine.set_plugboard(plugboard).unwrap();
    machine
}

/// One key press: stepping plus the full signal path.
fn bench_convert_char(c: &mut Criterion) {
    let mut mach = machine("(HQ) (EX) (IP) (TR) (BY)");
    c.bench_function("convert_char", |b| {
        b.iter(|| mach.convert_char(black_box('A')).unwrap());
    });
}

fn bench_convert_message(c: &mut Criterion) {
    let letters = MESSAGE.chars().filter(|c| !c.is_whitespace()).count() as u64;
    let mut group = c.benchmark_group("convert_message");
    group.throughput(Throughput::Elements(letters));

    let plugboards = [
        ("no_plugboard", ""),
        ("ten_pairs", "(AB) (CD) (EF) (GH) (IJ) (KL) (MN) (OP) (QR) (ST)"),
    ];
    for (label, plugboard) in plugboards {
        let mut mach = machine(plugboard);
        group.bench_with_input(BenchmarkId::from_parameter(label), &MESSAGE, |b, msg| {
            b.iter(|| mach.convert_message(black_box(msg)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convert_char, bench_convert_message);
criterion_main!(benches);
