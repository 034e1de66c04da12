use ac_ascii::compositor::Compositor;
use ac_core::config::RenderConfig;
use ac_core::frame::FrameBuffer;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn gradient_frame(width: u32, height: u32) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    for (i, px) in fb.data.chunks_exact_mut(4).enumerate() {
        let x = (i as u32 % width) * 255 / width;
        let v = x as u8;
        px.copy_from_slice(&[v, v, v, 255]);
    }
    fb
}

fn bench_process(c: &mut Criterion) {
    let frame = gradient_frame(1280, 720);
    let mut compositor = Compositor::new();
    for width in [60u32, 160, 320] {
        let config = RenderConfig {
            width,
            ..RenderConfig::default()
        };
        c.bench_function(&format!("compositor_720p_w{width}"), |b| {
            b.iter(|| compositor.process(black_box(&frame), black_box(&config)));
        });
    }
}

criterion_group!(benches, bench_process);
criterion_main!(benches);
