// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use veil_region::{IntRect, Region};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_rect(&mut self, extent: i32) -> IntRect {
        let x = (self.next_u32() % extent as u32) as i32;
        let y = (self.next_u32() % extent as u32) as i32;
        let w = 1 + (self.next_u32() % 200) as i32;
        let h = 1 + (self.next_u32() % 200) as i32;
        IntRect::new(x, y, w, h)
    }
}

fn bench_region_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("veil_region");

    for &n in &[16_usize, 128] {
        let mut rng = Lcg::new(0x5EE1_0000_0000_0010 + n as u64);
        let rects: Vec<IntRect> = (0..n).map(|_| rng.gen_rect(1000)).collect();
        let base = Region::from_rect(IntRect::new(0, 0, 1200, 1200));

        group.bench_function(format!("union_rects(n={n})"), |b| {
            b.iter(|| black_box(Region::from_rects(rects.iter().copied())));
        });

        group.bench_function(format!("subtract_rects(n={n})"), |b| {
            b.iter(|| {
                let mut region = base.clone();
                for &r in &rects {
                    region.subtract_rect(r);
                }
                black_box(region.num_rects());
            });
        });

        let holes = {
            let mut region = base.clone();
            for &r in &rects {
                region.subtract_rect(r);
            }
            region
        };
        group.bench_function(format!("intersect_holes(n={n})"), |b| {
            b.iter(|| {
                let mut region = holes.clone();
                region.intersect_rect(IntRect::new(100, 100, 500, 500));
                black_box(region.extents());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_region_ops);
criterion_main!(benches);
