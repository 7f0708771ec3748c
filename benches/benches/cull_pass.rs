// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the Veil cull pass over synthetic desktops.
//!
//! Each desktop is one background plus `n` windows at pseudo-random positions,
//! a quarter of them with an opaque region covering their top half.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use veil_region::{IntRect, Region};
use veil_scene::{CullPass, NoOcclusion, NodeFlags, NodeId, SubtractOpaque, Tree};

const SCREEN: IntRect = IntRect::new(0, 0, 1920, 1080);

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

    fn gen_range_i32(&mut self, upper_exclusive: i32) -> i32 {
        if upper_exclusive <= 0 {
            return 0;
        }
        (self.next_u32() % upper_exclusive as u32) as i32
    }
}

fn build_desktop(windows: usize, seed: u64) -> (Tree, NodeId) {
    let mut rng = Lcg::new(seed);
    let mut tree = Tree::new();
    let stage = tree.insert_container(None, SCREEN).unwrap();
    let backgrounds = tree.insert_container(Some(stage), SCREEN).unwrap();
    tree.insert_background(Some(backgrounds), SCREEN).unwrap();
    let group = tree.insert_container(Some(stage), SCREEN).unwrap();
    for i in 0..windows {
        let w = 200 + rng.gen_range_i32(600);
        let h = 150 + rng.gen_range_i32(450);
        let x = rng.gen_range_i32(SCREEN.width - w);
        let y = rng.gen_range_i32(SCREEN.height - h);
        let win = tree
            .insert_surface(Some(group), IntRect::new(x, y, w, h))
            .unwrap();
        if i % 4 == 0 {
            tree.set_opaque_region(win, Some(Region::from_rect(IntRect::new(0, 0, w, h / 2))))
                .unwrap();
        } else if i % 4 == 1 {
            tree.set_flags(win, NodeFlags::default() | NodeFlags::OPAQUE)
                .unwrap();
        }
    }
    (tree, stage)
}

fn bench_cull_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("veil_cull_pass");
    group.sample_size(50);
    let screen = Region::from_rect(SCREEN);

    for &n in &[8_usize, 32, 128] {
        group.bench_function(format!("subtract_opaque(n={n})"), |b| {
            let (mut tree, stage) = build_desktop(n, 0x5EE1_0000_0000_0001);
            let mut pass = CullPass::default();
            b.iter(|| {
                let stats = pass.run(
                    &mut tree,
                    stage,
                    &screen,
                    &screen,
                    &mut SubtractOpaque,
                    &mut (),
                );
                black_box(stats);
            });
        });

        group.bench_function(format!("no_occlusion(n={n})"), |b| {
            let (mut tree, stage) = build_desktop(n, 0x5EE1_0000_0000_0002);
            let mut pass = CullPass::default();
            b.iter(|| {
                let stats = pass.run(&mut tree, stage, &screen, &screen, &mut NoOcclusion, &mut ());
                black_box(stats);
            });
        });

        group.bench_function(format!("cull_then_paint_order(n={n})"), |b| {
            b.iter_batched(
                || build_desktop(n, 0x5EE1_0000_0000_0003),
                |(mut tree, stage)| {
                    CullPass::default().run(
                        &mut tree,
                        stage,
                        &screen,
                        &screen,
                        &mut SubtractOpaque,
                        &mut (),
                    );
                    black_box(tree.paint_order(stage));
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cull_pass);
criterion_main!(benches);
