use criterion::{criterion_group, criterion_main, Criterion, black_box};

use lodscape::mesh::{GridMeshSynthesizer, LodTransitions, MeshRequest, MeshSynthesizer, TerrainMesh};
use lodscape::streaming::{ChunkCoords, FixedObserver, RenderSink, Spiral, StreamingConfig, TerrainStreamer};
use lodscape::terrain::{TerrainGenerator, TerrainParams};

use glam::Vec2;

/// Sink that only counts calls
#[derive(Default)]
struct CountingSink {
    created: u32,
    visible: u32,
}

impl RenderSink<TerrainMesh> for CountingSink {
    type Handle = u32;

    fn create_visual_object(&mut self) -> u32 {
        self.created += 1;
        self.created
    }

    fn attach_mesh(&mut self, _handle: &u32, mesh: &TerrainMesh) {
        black_box(mesh.vertices.len());
    }

    fn set_visible(&mut self, _handle: &u32, visible: bool) {
        if visible {
            self.visible += 1;
        }
    }
}

fn bench_config() -> StreamingConfig {
    StreamingConfig {
        lod_count: 6,
        mesh_size: 8,
        lod0_triangle_size: 0.25,
        render_radii: vec![4],
        ..Default::default()
    }
}

fn bench_spiral_walk(c: &mut Criterion) {
    c.bench_function("spiral_walk_r16", |b| {
        b.iter(|| Spiral::new(black_box(ChunkCoords::new(3, -7)), 16).count());
    });
}

fn bench_mesh_synthesis_32(c: &mut Criterion) {
    let field = TerrainGenerator::new(TerrainParams::default());
    let request = MeshRequest {
        lod: 0,
        coords: ChunkCoords::new(5, -2),
        size: 32,
        scale: 0.06125,
        transitions: LodTransitions::NONE,
    };

    c.bench_function("mesh_synthesis_32", |b| {
        b.iter(|| GridMeshSynthesizer.synthesize(&field, black_box(&request)));
    });
}

fn bench_mesh_synthesis_stitched(c: &mut Criterion) {
    let field = TerrainGenerator::new(TerrainParams { octaves: 8, ..Default::default() });
    let request = MeshRequest {
        lod: 2,
        coords: ChunkCoords::new(0, 0),
        size: 16,
        scale: 1.0,
        transitions: LodTransitions::ALL,
    };

    c.bench_function("mesh_synthesis_16_stitched", |b| {
        b.iter(|| GridMeshSynthesizer.synthesize(&field, black_box(&request)));
    });
}

fn bench_tick_warmup(c: &mut Criterion) {
    c.bench_function("tick_warmup_200", |b| {
        b.iter(|| {
            let mut streamer =
                TerrainStreamer::new(bench_config(), FixedObserver(Vec2::new(1.0, 1.0)), CountingSink::default())
                    .unwrap();
            for _ in 0..200 {
                streamer.tick().unwrap();
            }
            streamer.sink().visible
        });
    });
}

fn bench_tick_steady(c: &mut Criterion) {
    let mut streamer =
        TerrainStreamer::new(bench_config(), FixedObserver(Vec2::new(1.0, 1.0)), CountingSink::default())
            .unwrap();
    for _ in 0..2000 {
        streamer.tick().unwrap();
    }

    c.bench_function("tick_steady", |b| {
        b.iter(|| streamer.tick());
    });
}

criterion_group!(
    benches,
    bench_spiral_walk,
    bench_mesh_synthesis_32,
    bench_mesh_synthesis_stitched,
    bench_tick_warmup,
    bench_tick_steady,
);
criterion_main!(benches);
