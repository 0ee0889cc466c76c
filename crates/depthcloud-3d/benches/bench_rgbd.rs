use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use depthcloud_3d::{
    camera::CameraModel,
    io::ply::write_ply_ascii_to,
    rgbd::{estimate_normals, rgbd_to_pointcloud},
};
use depthcloud_image::{Image, ImageSize};

fn make_frame(size: ImageSize) -> (Image<u16, 1>, Image<u8, 3>) {
    let depth = (0..size.num_pixels())
        .map(|i| 500 + (i % 1500) as u16)
        .collect::<Vec<_>>();
    let color = (0..size.num_pixels() * 3)
        .map(|i| (i % 256) as u8)
        .collect::<Vec<_>>();

    (
        Image::new(size, depth).expect("valid depth"),
        Image::new(size, color).expect("valid color"),
    )
}

fn bench_rgbd_to_pointcloud(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgbd_to_pointcloud");

    let intrinsics = CameraModel::RealSenseD435.intrinsics();

    for (width, height) in [(320, 240), (640, 480)] {
        let size = ImageSize { width, height };
        let (depth, color) = make_frame(size);
        let normals = estimate_normals(&intrinsics, &depth).expect("normals");

        let parameter = format!("{width}x{height}");

        group.bench_with_input(
            BenchmarkId::new("xyz", &parameter),
            &depth,
            |b, depth| {
                b.iter(|| black_box(rgbd_to_pointcloud(&intrinsics, depth, None, None)));
            },
        );

        group.bench_function(BenchmarkId::new("xyz_normal_color", &parameter), |b| {
            b.iter(|| {
                black_box(rgbd_to_pointcloud(
                    &intrinsics,
                    &depth,
                    Some(&color),
                    Some(&normals),
                ))
            });
        });

        group.bench_with_input(
            BenchmarkId::new("estimate_normals", &parameter),
            &depth,
            |b, depth| {
                b.iter(|| black_box(estimate_normals(&intrinsics, depth)));
            },
        );
    }

    group.finish();
}

fn bench_write_ply(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_ply_ascii");

    let intrinsics = CameraModel::RealSenseD435.intrinsics();
    let (depth, color) = make_frame(ImageSize {
        width: 640,
        height: 480,
    });
    let pointcloud =
        rgbd_to_pointcloud(&intrinsics, &depth, Some(&color), None).expect("pointcloud");

    group.bench_function(BenchmarkId::new("xyz_color", "640x480"), |b| {
        let mut buf = Vec::with_capacity(pointcloud.len() * 48);
        b.iter(|| {
            buf.clear();
            black_box(write_ply_ascii_to(&mut buf, &pointcloud))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_rgbd_to_pointcloud, bench_write_ply);
criterion_main!(benches);
