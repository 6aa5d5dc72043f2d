use criterion::{Criterion, criterion_group, criterion_main};
use glam::vec3;
use polyedit::{EditMesh, FH, VH};
use std::hint::black_box;

fn grid(n: usize) -> EditMesh {
    EditMesh::grid(n, n, 1.0).unwrap()
}

// Construction Benchmarks
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("unit_cube_batch", |b| {
        b.iter(|| {
            for _ in 0..100 {
                let mesh = EditMesh::unit_cube().unwrap();
                black_box(mesh);
            }
        });
    });

    group.bench_function("grid_32", |b| {
        b.iter(|| {
            let mesh = grid(black_box(32));
            black_box(mesh);
        });
    });

    group.finish();
}

// Extrusion Benchmarks
fn bench_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude");

    group.bench_function("cube_top_face", |b| {
        let cube = EditMesh::unit_cube().unwrap();
        b.iter(|| {
            let mut mesh = cube.clone();
            let sides = mesh.extrude(&[FH::from(4u32)]).unwrap();
            black_box(sides);
        });
    });

    group.bench_function("grid_16_all_faces", |b| {
        let base = grid(16);
        let faces: Vec<FH> = base.face_handles().collect();
        b.iter(|| {
            let mut mesh = base.clone();
            let sides = mesh.extrude_faces(black_box(&faces), 0.5).unwrap();
            black_box(sides);
        });
    });

    group.finish();
}

// Subdivision Benchmarks
fn bench_subdivision(c: &mut Criterion) {
    let mut group = c.benchmark_group("subdivision");
    group.sample_size(20);

    group.bench_function("cube", |b| {
        let cube = EditMesh::unit_cube().unwrap();
        b.iter(|| {
            let mut mesh = cube.clone();
            let faces = mesh.subdivide().unwrap();
            black_box(faces);
        });
    });

    group.bench_function("cube_2_iterations", |b| {
        let cube = EditMesh::unit_cube().unwrap();
        b.iter(|| {
            let mut mesh = cube.clone();
            for _ in 0..2 {
                mesh.subdivide().unwrap();
            }
            black_box(mesh);
        });
    });

    group.bench_function("grid_8", |b| {
        let base = grid(8);
        b.iter(|| {
            let mut mesh = base.clone();
            let faces = mesh.subdivide().unwrap();
            black_box(faces);
        });
    });

    group.finish();
}

// Vertex Operation Benchmarks
fn bench_vertex_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_ops");

    group.bench_function("weld_split_grid_16", |b| {
        let mut base = grid(16);
        let slots: Vec<VH> = (0..base.num_vertices()).map(VH::from).collect();
        base.split_vertices(&slots).unwrap();
        b.iter(|| {
            let mut mesh = base.clone();
            mesh.weld_vertices(black_box(&slots), 0.01).unwrap();
            black_box(mesh);
        });
    });

    group.bench_function("degenerate_cleanup_grid_16", |b| {
        let mut base = grid(16);
        for v in (0..base.num_vertices()).step_by(7) {
            base.set_shared_vertex_position(VH::from(v), vec3(0.0, 0.0, 0.0))
                .unwrap();
        }
        b.iter(|| {
            let mut mesh = base.clone();
            let removed = mesh.remove_degenerate_triangles();
            black_box(removed);
        });
    });

    group.bench_function("vertex_normals_grid_32", |b| {
        let mesh = grid(32);
        b.iter(|| {
            let normals = mesh.vertex_normals();
            black_box(normals);
        });
    });

    group.bench_function("clone", |b| {
        let mesh = grid(32);
        b.iter(|| {
            let copy = mesh.clone();
            black_box(copy);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_extrude,
    bench_subdivision,
    bench_vertex_ops
);
criterion_main!(benches);
