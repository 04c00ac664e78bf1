use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use exodus::{Encoding, File, InitParams};

fn write_nodal(n: usize, steps: usize, encoding: Encoding) {
    let dir = tempfile::tempdir().unwrap();
    let mut file = File::create(dir.path().join("bench.exo")).unwrap();
    file.set_encoding(encoding);
    file.init(&InitParams::new("bench", 1, n, 0, 0, 0, 0)).unwrap();

    let x: Array1<f64> = Array1::random(n, Uniform::new(0., 1.));
    file.write_coords(x.as_slice().unwrap(), None, None).unwrap();
    file.write_nodal_var_names(&["rho", "u"]).unwrap();

    for step in 1..=steps {
        file.write_time(step, step as f64).unwrap();
        for var in 1..=2 {
            let values: Array1<f64> = Array1::random(n, Uniform::new(0., 10.));
            file.write_nodal_var(step, var, values.as_slice().unwrap())
                .unwrap();
        }
    }

    file.close().unwrap();
}

fn write_nodal_bench(c: &mut Criterion) {
    c.bench_function("write nodal binary 10000x10", |b| {
        b.iter(|| write_nodal(black_box(10_000), 10, Encoding::Binary))
    });

    c.bench_function("write nodal ascii 10000x10", |b| {
        b.iter(|| write_nodal(black_box(10_000), 10, Encoding::Ascii))
    });
}

criterion_group!(benches, write_nodal_bench);
criterion_main!(benches);
