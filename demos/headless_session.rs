#![allow(clippy::cast_precision_loss)]
//! Runs a cloudscope session without a window.
//!
//! Writes a procedural cloud to a temporary directory, loads it, flies the
//! camera along the generated orbit while recording PNG frames, and saves a
//! screenshot at the end.
//!
//! Run with `RUST_LOG=info cargo run --example headless_session`.

use cloudscope::{
    init_logging, CloudData, FrameInput, HeadlessBackend, LoadOutcome, Session, SessionOptions,
    UVec2, Vec3,
};
use glam::UVec3;

/// Builds a soft spherical puff of density.
fn sphere_cloud(resolution: u32) -> Vec<f32> {
    let center = (resolution as f32 - 1.0) * 0.5;
    let mut density = Vec::with_capacity((resolution * resolution * resolution) as usize);
    for z in 0..resolution {
        for y in 0..resolution {
            for x in 0..resolution {
                let p = Vec3::new(x as f32, y as f32, z as f32) - Vec3::splat(center);
                let r = p.length() / center;
                density.push((1.0 - r).max(0.0));
            }
        }
    }
    density
}

fn main() -> cloudscope::Result<()> {
    init_logging();

    let root = std::env::temp_dir().join("cloudscope-headless-demo");
    std::fs::create_dir_all(&root)?;
    let cloud_path = root.join("sphere.xyz");
    CloudData::from_dense_grid("sphere", UVec3::splat(32), Vec3::splat(0.01), sphere_cloud(32))?
        .save_to_xyz(&cloud_path)?;

    let options = SessionOptions {
        data_directory: root.join("Data"),
        screenshot_directory: root.join("Screenshots"),
        camera_path_directory: root.join("CameraPaths"),
        use_camera_flight: true,
        real_time_camera_flight: false,
        recording_fps: 6.0,
        ..SessionOptions::default()
    };
    let mut session = Session::new(HeadlessBackend::new(), options);

    if session.load_dataset(&cloud_path, true) != LoadOutcome::Loaded {
        log::error!("Could not load {}", cloud_path.display());
        return Ok(());
    }

    let window = UVec2::new(320, 240);
    let input = FrameInput::docked(1.0 / 60.0, window, UVec2::new(160, 120));
    session.frame(&input);

    let recording = session.start_png_recording();
    let mut frames = 0;
    loop {
        frames += 1;
        if session.frame(&input).flight_finished {
            break;
        }
    }

    session.request_screenshot();
    let report = session.frame(&input);

    println!("Flew {frames} frames, recording in {}", recording.display());
    if let Some(path) = report.capture.screenshot {
        println!("Screenshot saved to {}", path.display());
    }
    println!(
        "Backend rendered {} times",
        session.backend().render_count()
    );
    Ok(())
}
