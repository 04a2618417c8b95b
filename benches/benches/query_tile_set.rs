// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_blue_noise::{BoundingBox, EdgeCodes, SubdivisionTable, Tile, TileId, TileSet};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
    fn below(&mut self, n: u32) -> u32 {
        (self.next_u64() % u64::from(n)) as u32
    }
}

fn gen_points(rng: &mut Rng, count: usize) -> Vec<Point> {
    (0..count)
        .map(|_| Point::new(f64::from(rng.next_f32()), f64::from(rng.next_f32())))
        .collect()
}

/// A tile set shaped like the shipped ones: a few dozen tiles, each with
/// hundreds of points, subdividing into random tiles of the same set.
fn gen_tile_set(tiles: u32, arity: u32, points: usize, sub_points: usize) -> TileSet {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let tiles = (0..tiles)
        .map(|_| {
            let entries = (0..arity * arity)
                .map(|_| TileId::new(rng.below(tiles)))
                .collect();
            Tile::new(
                EdgeCodes::default(),
                SubdivisionTable::new(1, arity, entries).unwrap(),
                gen_points(&mut rng, points),
                gen_points(&mut rng, sub_points),
            )
        })
        .collect();
    TileSet::new(arity, 1, tiles)
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for &n in &[8u32, 32, 64] {
        let bytes = gen_tile_set(n, 3, 256, 512).encode();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(format!("slice_tiles{}", n), |b| {
            b.iter(|| black_box(TileSet::decode(black_box(&bytes)).unwrap()));
        });
        group.bench_function(format!("reader_tiles{}", n), |b| {
            b.iter(|| black_box(TileSet::read_from(black_box(&bytes[..])).unwrap()));
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let set = gen_tile_set(32, 3, 256, 512);
    c.bench_function("encode_tiles32", |b| b.iter(|| black_box(set.encode())));
}

fn bench_query_zoom(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_zoom");
    let set = gen_tile_set(32, 3, 256, 512);
    // A fixed-size viewport at increasing zoom: the box shrinks and the rank grows.
    for &zoom in &[1.0_f64, 4.0, 16.0, 64.0] {
        let side = 1.0 / zoom;
        let clip = BoundingBox::from_xywh(0.5 - side / 2.0, 0.5 - side / 2.0, side, side);
        let max_rank = 2000.0 * zoom * zoom;
        let hits = set.query(clip, max_rank).collect_points().unwrap().len();
        group.throughput(Throughput::Elements(hits as u64));
        group.bench_function(format!("zoom{}", zoom), |b| {
            b.iter(|| {
                let n: usize = set
                    .query(black_box(clip), black_box(max_rank))
                    .map(|batch| batch.unwrap().len())
                    .sum();
                black_box(n);
            });
        });
    }
    group.finish();
}

fn bench_query_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_density");
    let set = gen_tile_set(32, 2, 128, 384);
    for &max_rank in &[100.0_f64, 1_000.0, 10_000.0] {
        group.bench_function(format!("unit_rank{}", max_rank), |b| {
            b.iter(|| black_box(set.query(BoundingBox::UNIT, max_rank).collect_points().unwrap()));
        });
        group.bench_function(format!("unit_rank{}_skip_empty", max_rank), |b| {
            b.iter(|| {
                black_box(
                    set.query(BoundingBox::UNIT, max_rank)
                        .skip_empty(true)
                        .collect_batches()
                        .unwrap(),
                )
            });
        });
    }
    group.finish();
}

fn bench_query_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_pan");
    let set = gen_tile_set(32, 3, 256, 512);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let clips: Vec<_> = (0..64)
        .map(|_| {
            let x = f64::from(rng.next_f32()) * 0.75;
            let y = f64::from(rng.next_f32()) * 0.75;
            BoundingBox::from_xywh(x, y, 0.25, 0.25)
        })
        .collect();
    group.throughput(Throughput::Elements(clips.len() as u64));
    group.bench_function("viewport_64_frames", |b| {
        b.iter_batched(
            || clips.clone(),
            |clips| {
                let mut total = 0;
                for clip in clips {
                    for batch in set.query(clip, 20_000.0) {
                        total += batch.unwrap().len();
                    }
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_encode,
    bench_query_zoom,
    bench_query_density,
    bench_query_pan,
);
criterion_main!(benches);
