// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate mandelzoom;
extern crate num_cpus;

use criterion::Criterion;
use mandelzoom::animation::render_all;
use mandelzoom::lzw;
use mandelzoom::quantize::quantize;
use mandelzoom::{Config, FrameRenderer, Kernel, ZoomSchedule};

fn render_frame(c: &mut Criterion) {
    let renderer = FrameRenderer::new(Kernel::default(), 256, 256, 600, num_cpus::get()).unwrap();
    let schedule = ZoomSchedule::default();
    c.bench_function("render frame 150", move |b| {
        b.iter(|| renderer.render_frame(&schedule, 150).unwrap())
    });
}

fn encode_frame(c: &mut Criterion) {
    let config = Config {
        schedule: ZoomSchedule {
            frames: 1,
            ..ZoomSchedule::default()
        },
        ..Config::default()
    };
    let frame = render_all(&config).unwrap().remove(0);
    let quantized = quantize(&frame).unwrap();
    c.bench_function("quantize frame 0", move |b| {
        b.iter(|| quantize(&frame).unwrap())
    });
    c.bench_function("lzw frame 0", move |b| {
        b.iter(|| lzw::compress(&quantized.indices, 8, Vec::new()).unwrap())
    });
}

criterion_group!(benches, render_frame, encode_frame);
criterion_main!(benches);
