//! Integration tests for the session frame pipeline.
//!
//! The backend is a mock that records every call and keeps its images in an
//! inner `HeadlessBackend` so capture can read them back.

use std::cell::Cell;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use cloudscope::*;
use glam::UVec3;
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetOutput(ImageHandle),
    Recreate(u32, u32),
    Render,
    Moved,
    Camera,
    SetCloudData(PathBuf),
    LinearRgb(bool),
    ClearColor(Vec4),
}

#[derive(Debug)]
struct MockBackend {
    calls: Vec<Call>,
    inner: HeadlessBackend,
    stale: bool,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            inner: HeadlessBackend::new(),
            stale: false,
        }
    }

    fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| wanted(call)).count()
    }

    fn renders(&self) -> usize {
        self.count(|call| *call == Call::Render)
    }

    fn recreations(&self) -> usize {
        self.count(|call| matches!(call, Call::Recreate(..)))
    }
}

impl RenderBackend for MockBackend {
    fn set_output_image(&mut self, image: ImageHandle) {
        self.calls.push(Call::SetOutput(image));
        self.inner.set_output_image(image);
    }

    fn recreate_swapchain(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Recreate(width, height));
        self.inner.recreate_swapchain(width, height);
    }

    fn render(&mut self) {
        self.calls.push(Call::Render);
        self.inner.render();
    }

    fn needs_rerender(&mut self) -> bool {
        self.stale
    }

    fn on_has_moved(&mut self) {
        self.calls.push(Call::Moved);
        self.inner.on_has_moved();
    }

    fn set_camera(&mut self, pose: CameraPose) {
        self.calls.push(Call::Camera);
        self.inner.set_camera(pose);
    }

    fn set_cloud_data(&mut self, data: Arc<CloudData>) {
        self.calls
            .push(Call::SetCloudData(data.file_name().to_path_buf()));
        self.inner.set_cloud_data(data);
    }

    fn set_use_linear_rgb(&mut self, use_linear_rgb: bool) {
        self.calls.push(Call::LinearRgb(use_linear_rgb));
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.calls.push(Call::ClearColor(color));
        self.inner.set_clear_color(color);
    }

    fn composite(&mut self, source: ImageHandle, target: ImageHandle) -> RenderResult<()> {
        self.inner.composite(source, target)
    }

    fn read_image(&mut self, image: ImageHandle) -> RenderResult<FrameImage> {
        self.inner.read_image(image)
    }
}

struct CountingSink(Rc<Cell<u64>>);

impl VideoSink for CountingSink {
    fn push_frame(&mut self, _frame: &FrameImage) -> RenderResult<()> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.0.get()
    }
}

/// Menu that opens the listed submenus and clicks one item.
#[derive(Default)]
struct ScriptedMenu {
    open: HashSet<String>,
    click: Option<String>,
    log: Vec<String>,
    depth: i32,
}

impl MenuBackend for ScriptedMenu {
    fn begin_menu(&mut self, label: &str) -> bool {
        self.log.push(format!("begin {label}"));
        let open = self.open.contains(label);
        if open {
            self.depth += 1;
        }
        open
    }

    fn menu_item(&mut self, label: &str) -> bool {
        self.log.push(format!("item {label}"));
        self.click.as_deref() == Some(label)
    }

    fn end_menu(&mut self) {
        self.log.push("end".to_string());
        self.depth -= 1;
    }
}

const WINDOW: UVec2 = UVec2::new(200, 100);
const CONTENT: UVec2 = UVec2::new(64, 32);

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cloudscope-session-{}-{name}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_cloud(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let density = (0..64).map(|i| i as f32 / 64.0).collect();
    CloudData::from_dense_grid(name, UVec3::splat(4), Vec3::splat(0.1), density)
        .unwrap()
        .save_to_xyz(&path)
        .unwrap();
    path
}

fn options(dir: &Path) -> SessionOptions {
    SessionOptions {
        data_directory: dir.join("Data"),
        screenshot_directory: dir.join("Screenshots"),
        camera_path_directory: dir.join("CameraPaths"),
        ..SessionOptions::default()
    }
}

fn session(dir: &Path) -> Session<MockBackend> {
    Session::with_catalog(MockBackend::new(), options(dir), Catalog::empty())
}

fn docked() -> FrameInput {
    FrameInput::docked(1.0 / 60.0, WINDOW, CONTENT)
}

fn translation_row_major(x: f32) -> [f32; 16] {
    [
        1.0, 0.0, 0.0, x, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

#[test]
fn test_missing_manifest_leaves_manual_loaders() {
    let dir = temp_dir("missing-manifest");
    let session = Session::new(MockBackend::new(), options(&dir));
    assert!(session.catalog().is_empty());
    assert_eq!(session.catalog().names(), ["Local file..."]);
}

#[test]
fn test_first_frame_renders_without_gpu_work() {
    let dir = temp_dir("first-frame");
    let mut session = session(&dir);

    let report = session.frame(&docked());
    assert_eq!(report.resize, Some(ResizeOutcome::Recreated));
    assert!(report.rendered);
    assert_eq!(session.backend().renders(), 0);
    assert!(report.display_image.is_none());
    assert_eq!(session.scheduler().state(), RenderState::Clean);

    let report = session.frame(&docked());
    assert!(!report.rendered);
}

#[test]
fn test_dirty_events_coalesce_into_one_render() {
    let dir = temp_dir("coalesce");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    assert_eq!(session.load_dataset(&cloud, true), LoadOutcome::Loaded);
    session.frame(&docked());
    session.backend_mut().calls.clear();

    for _ in 0..5 {
        session.request_render();
    }
    session.set_clear_color(Vec4::new(0.2, 0.3, 0.4, 1.0));
    session.set_camera(CameraPose::look_at(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO, Vec3::Y));

    let report = session.frame(&docked());
    assert!(report.rendered);
    assert_eq!(session.backend().renders(), 1);
    assert_eq!(session.scheduler().state(), RenderState::Clean);

    let report = session.frame(&docked());
    assert!(!report.rendered);
    assert_eq!(session.backend().renders(), 1);
}

#[test]
fn test_unchanged_size_does_not_recreate() {
    let dir = temp_dir("unchanged-size");
    let mut session = session(&dir);

    for _ in 0..3 {
        session.frame(&docked());
    }
    assert_eq!(session.backend().recreations(), 1);
    assert_eq!(session.scheduler().render_count(), 1);
}

#[test]
fn test_resize_recreates_and_renders() {
    let dir = temp_dir("resize");
    let mut session = session(&dir);
    session.frame(&docked());

    let report = session.frame(&FrameInput::docked(0.0, WINDOW, UVec2::new(80, 40)));
    assert_eq!(report.resize, Some(ResizeOutcome::Recreated));
    assert!(report.rendered);
    assert_eq!(session.view().size(), UVec2::new(80, 40));
    assert_eq!(session.backend().calls.last(), Some(&Call::Recreate(80, 40)));
}

#[test]
fn test_zero_size_skips_render_and_stays_dirty() {
    let dir = temp_dir("zero-size");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    session.frame(&docked());
    let renders = session.backend().renders();

    let report = session.frame(&FrameInput::docked(0.0, WINDOW, UVec2::new(0, 32)));
    assert_eq!(report.resize, Some(ResizeOutcome::Collapsed));
    assert!(!report.rendered);
    assert!(session.scheduler().needs_render());
    assert_eq!(session.backend().renders(), renders);

    let report = session.frame(&docked());
    assert!(report.rendered);
    assert_eq!(session.backend().renders(), renders + 1);
}

#[test]
fn test_closed_view_renders_nothing() {
    let dir = temp_dir("closed-view");
    let mut session = session(&dir);
    let report = session.frame(&FrameInput {
        dt: 0.0,
        window_size: WINDOW,
        view: None,
    });
    assert!(report.resize.is_none());
    assert!(!report.rendered);
    assert!(session.scheduler().needs_render());
}

#[test]
fn test_backend_staleness_triggers_render() {
    let dir = temp_dir("stale");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    session.frame(&docked());

    session.backend_mut().stale = true;
    assert!(session.frame(&docked()).rendered);
    assert!(session.frame(&docked()).rendered);

    session.backend_mut().stale = false;
    assert!(!session.frame(&docked()).rendered);
}

#[test]
fn test_continuous_rendering() {
    let dir = temp_dir("continuous");
    let mut session = session(&dir);
    session.set_continuous_rendering(true);
    for _ in 0..3 {
        assert!(session.frame(&docked()).rendered);
    }
    session.set_continuous_rendering(false);
    assert!(!session.frame(&docked()).rendered);
}

#[test]
fn test_screenshot_restores_output_binding() {
    let dir = temp_dir("screenshot");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    session.frame(&docked());

    let before = session.backend().inner.output_image();
    session.request_screenshot();
    let report = session.frame(&docked());

    let expected = dir.join("Screenshots").join("screenshot_0.png");
    assert_eq!(report.capture.screenshot, Some(expected.clone()));
    assert!(expected.exists());
    assert_eq!(session.backend().inner.output_image(), before);
    assert_eq!(session.capture().screenshot_counter(), 1);

    // The next frame sees the original binding and takes no screenshot.
    let report = session.frame(&docked());
    assert!(report.capture.screenshot.is_none());
    assert_eq!(session.backend().inner.output_image(), before);
}

#[test]
fn test_load_primes_backend() {
    let dir = temp_dir("prime");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.frame(&docked());
    session.backend_mut().calls.clear();

    assert_eq!(session.load_dataset(&cloud, true), LoadOutcome::Loaded);
    let calls = &session.backend().calls;
    assert!(calls.contains(&Call::SetCloudData(cloud.clone())));
    assert!(calls.contains(&Call::LinearRgb(false)));
    assert!(calls.contains(&Call::ClearColor(session.clear_color())));
    assert!(session.scheduler().needs_render());
    assert_eq!(session.checkpoints().active_dataset(), Some(cloud.to_str().unwrap()));

    let current = session.current().unwrap();
    assert_eq!(current.descriptor_name(), cloud.as_path());
    assert_eq!(current.selection_index(), CUSTOM_FILE_INDEX);
}

#[test]
fn test_load_failure_keeps_state() {
    let dir = temp_dir("load-failure");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    session.frame(&docked());
    let camera_path = session.current().unwrap().camera_path().clone();
    assert!(!session.scheduler().needs_render());

    let outcome = session.load_dataset(dir.join("missing.xyz"), true);
    assert_eq!(outcome, LoadOutcome::Failed);
    let current = session.current().unwrap();
    assert_eq!(current.descriptor_name(), cloud.as_path());
    assert_eq!(current.camera_path(), &camera_path);
    assert!(!session.scheduler().needs_render());
}

#[test]
fn test_malformed_dataset_keeps_state() {
    let dir = temp_dir("malformed");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let broken = dir.join("broken.xyz");
    std::fs::write(&broken, [1, 2, 3]).unwrap();
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);

    assert_eq!(session.load_dataset(&broken, true), LoadOutcome::Failed);
    assert_eq!(session.current().unwrap().descriptor_name(), cloud.as_path());
}

#[test]
fn test_unsupported_extension_is_not_loaded() {
    let dir = temp_dir("unsupported");
    let mut session = session(&dir);
    session.frame(&docked());

    let outcome = session.load_dataset(dir.join("cloud.nvdb"), true);
    assert_eq!(outcome, LoadOutcome::Rejected);
    assert!(session.current().is_none());
    assert!(!session.scheduler().needs_render());
}

#[test]
fn test_empty_path_unloads() {
    let dir = temp_dir("unload");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);

    assert_eq!(session.load_dataset("", true), LoadOutcome::Unloaded);
    assert!(session.current().is_none());
}

#[test]
fn test_cached_camera_path_is_used_verbatim() {
    let dir = temp_dir("cached-path");
    let cloud = write_cloud(&dir, "foo.xyz");
    let cache_dir = dir.join("CameraPaths");
    std::fs::create_dir_all(&cache_dir).unwrap();
    let cache_file = cache_dir.join("foo.xyz.binpath");
    let cached = CameraPath::from_control_points(
        "custom",
        vec![
            ControlPoint::new(0.0, CameraPose::default()),
            ControlPoint::new(
                2.0,
                CameraPose::look_at(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y),
            ),
        ],
    );
    cached.to_binary_file(&cache_file).unwrap();

    let mut session = session(&dir);
    session.load_dataset(&cloud, true);

    let path = session.current().unwrap().camera_path();
    assert_eq!(path.source(), &CameraPathSource::Cached(cache_file));
    assert_eq!(path.control_points(), cached.control_points());
    assert!((path.duration() - 2.0).abs() < f32::EPSILON);
}

#[test]
fn test_generated_camera_path_duration_follows_mode() {
    let dir = temp_dir("generated-path");
    let cloud = write_cloud(&dir, "foo.xyz");

    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    let path = session.current().unwrap().camera_path();
    assert_eq!(path.source(), &CameraPathSource::Generated);
    assert!((path.duration() - CAMERA_PATH_TIME_RECORDING).abs() < 1e-4);
    assert!(!path.is_performance_measurement());

    let performance = SessionOptions {
        use_performance_measurement_mode: true,
        ..options(&dir)
    };
    let mut session = Session::with_catalog(MockBackend::new(), performance, Catalog::empty());
    assert!(session.options().use_camera_flight);
    session.load_dataset(&cloud, true);
    let path = session.current().unwrap().camera_path();
    assert!((path.duration() - CAMERA_PATH_TIME_PERFORMANCE_MEASUREMENT).abs() < 1e-4);
    assert!(path.is_performance_measurement());
}

#[test]
fn test_non_blocking_load_runs_on_next_frame() {
    let dir = temp_dir("non-blocking");
    let first = write_cloud(&dir, "first.xyz");
    let second = write_cloud(&dir, "second.xyz");
    let mut session = session(&dir);

    assert_eq!(session.load_dataset(&first, false), LoadOutcome::Queued);
    assert_eq!(session.load_dataset(&second, false), LoadOutcome::Queued);
    assert!(session.current().is_none());
    assert!(session.has_pending_load());

    let report = session.frame(&docked());
    assert_eq!(report.load, Some(LoadOutcome::Loaded));
    assert!(report.rendered);
    assert_eq!(session.current().unwrap().descriptor_name(), second.as_path());
    assert!(!session.has_pending_load());
    assert_eq!(session.frame(&docked()).load, None);
}

#[test]
fn test_blocking_load_discards_queued_request() {
    let dir = temp_dir("blocking-discards-queue");
    let queued = write_cloud(&dir, "queued.xyz");
    let newest = write_cloud(&dir, "newest.xyz");
    let mut session = session(&dir);

    assert_eq!(session.load_dataset(&queued, false), LoadOutcome::Queued);
    assert_eq!(session.load_dataset(&newest, true), LoadOutcome::Loaded);
    assert!(!session.has_pending_load());

    let report = session.frame(&docked());
    assert_eq!(report.load, None);
    assert_eq!(session.current().unwrap().descriptor_name(), newest.as_path());
}

#[test]
fn test_unload_discards_queued_request() {
    let dir = temp_dir("unload-discards-queue");
    let loaded = write_cloud(&dir, "loaded.xyz");
    let queued = write_cloud(&dir, "queued.xyz");
    let mut session = session(&dir);

    assert_eq!(session.load_dataset(&loaded, true), LoadOutcome::Loaded);
    assert_eq!(session.load_dataset(&queued, false), LoadOutcome::Queued);
    assert_eq!(session.load_dataset("", true), LoadOutcome::Unloaded);
    assert!(!session.has_pending_load());

    let report = session.frame(&docked());
    assert_eq!(report.load, None);
    assert!(session.current().is_none());
}

#[test]
fn test_selecting_catalog_entry_applies_transforms() {
    let dir = temp_dir("select");
    write_cloud(&dir, "a.xyz");
    let mut leaf = ManifestNode::leaf("a", "a.xyz");
    leaf.transform = Some(translation_row_major(5.0));
    let catalog = Catalog::from_nodes(vec![leaf], &dir);

    let rotated = SessionOptions {
        rotate_model_by_90_degree_turns: 1,
        model_rotation_axis: Vec3::Y,
        ..options(&dir)
    };
    let mut session = Session::with_catalog(MockBackend::new(), rotated, catalog);

    assert_eq!(session.select_dataset(0), None);
    assert_eq!(session.select_dataset(1), Some(LoadOutcome::Loaded));

    let current = session.current().unwrap();
    assert_eq!(current.selection_index(), 1);
    assert_eq!(current.descriptor_name(), dir.join("a.xyz").as_path());
    let expected =
        Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)) * Mat4::from_axis_angle(Vec3::Y, FRAC_PI_2);
    assert!(current.data().transform().abs_diff_eq(expected, 1e-5));
}

#[test]
fn test_out_of_range_selection_is_rejected() {
    let dir = temp_dir("out-of-range");
    let mut session = session(&dir);
    assert_eq!(session.select_dataset(7), Some(LoadOutcome::Rejected));
    assert!(session.current().is_none());
}

#[test]
fn test_reload_loads_selected_dataset_again() {
    let dir = temp_dir("reload");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.selection_mut().set_custom_path(&cloud);
    assert_eq!(session.load_selected_dataset(), LoadOutcome::Loaded);
    session.backend_mut().calls.clear();

    assert_eq!(session.reload_dataset(), LoadOutcome::Loaded);
    assert_eq!(
        session.backend().count(|call| matches!(call, Call::SetCloudData(_))),
        1
    );
}

#[test]
fn test_file_dialog_result_loads_custom_file() {
    let dir = temp_dir("file-dialog");
    let cloud = write_cloud(&dir, "picked.xyz");
    let catalog = Catalog::from_nodes(vec![ManifestNode::leaf("picked", "picked.xyz")], &dir);
    let mut session = Session::with_catalog(MockBackend::new(), options(&dir), catalog);
    session.select_dataset(1);

    let outcome = session.on_file_dialog_result(&FileDialogResult {
        directory: dir.clone(),
        file_name: "picked.xyz".to_string(),
        filter: ".xyz".to_string(),
    });
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(session.selection().index(), CUSTOM_FILE_INDEX);
    assert_eq!(session.selection().custom_path(), cloud.as_path());
    assert_eq!(session.current().unwrap().selection_index(), CUSTOM_FILE_INDEX);
}

#[test]
fn test_menu_walks_open_groups_and_loads_clicked_leaf() {
    let dir = temp_dir("menu");
    for name in ["a.xyz", "b.xyz", "c.xyz"] {
        write_cloud(&dir, name);
    }
    let catalog = Catalog::from_nodes(
        vec![
            ManifestNode::leaf("a", "a.xyz"),
            ManifestNode::group("g", vec![ManifestNode::leaf("b", "b.xyz")]),
            ManifestNode::group("h", vec![ManifestNode::leaf("c", "c.xyz")]),
        ],
        &dir,
    );
    let mut session = Session::with_catalog(MockBackend::new(), options(&dir), catalog);
    let mut menu = ScriptedMenu {
        open: ["Datasets", "g"].into_iter().map(String::from).collect(),
        click: Some("b".to_string()),
        ..ScriptedMenu::default()
    };

    let outcome = session.build_dataset_menu(&mut menu);
    assert_eq!(outcome, Some(LoadOutcome::Loaded));
    assert_eq!(
        menu.log,
        [
            "begin Datasets",
            "item a",
            "begin g",
            "item b",
            "end",
            "begin h",
            "end"
        ]
    );
    assert_eq!(menu.depth, 0);
    assert_eq!(session.selection().index(), 2);
    assert_eq!(
        session.current().unwrap().descriptor_name(),
        dir.join("b.xyz").as_path()
    );
}

#[test]
fn test_closed_menu_emits_nothing() {
    let dir = temp_dir("closed-menu");
    let mut session = session(&dir);
    let mut menu = ScriptedMenu::default();
    assert_eq!(session.build_dataset_menu(&mut menu), None);
    assert_eq!(menu.log, ["begin Datasets"]);
}

#[test]
fn test_dock_mode_change_applies_next_frame() {
    let dir = temp_dir("dock-mode");
    let mut session = session(&dir);
    session.frame(&docked());
    assert_eq!(session.view().size(), CONTENT);

    session.set_dock_space_mode(false);
    assert!(session.dock_space_mode());

    let report = session.frame(&FrameInput::windowed(0.0, WINDOW));
    assert!(!session.dock_space_mode());
    assert_eq!(report.resize, Some(ResizeOutcome::Recreated));
    assert!(report.rendered);
    assert_eq!(session.view().size(), WINDOW);
}

#[test]
fn test_fixed_size_viewport_overrides_panel_size() {
    let dir = temp_dir("fixed-size");
    let mut session = session(&dir);
    session.frame(&docked());

    session.set_fixed_size_viewport(true);
    session.set_fixed_viewport_size(UVec2::new(32, 16));
    let report = session.frame(&docked());
    assert_eq!(report.resize, Some(ResizeOutcome::Recreated));
    assert_eq!(session.view().size(), UVec2::new(32, 16));

    session.set_fixed_size_viewport(false);
    session.frame(&docked());
    assert_eq!(session.view().size(), CONTENT);
}

#[test]
fn test_checkpoints_move_camera() {
    let dir = temp_dir("checkpoints");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    assert!(!session.add_checkpoint("front"));

    session.load_dataset(&cloud, true);
    let front = CameraPose::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
    session.set_camera(front);
    assert!(session.add_checkpoint("front"));

    session.set_camera(CameraPose::look_at(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y));
    session.frame(&docked());
    let moves = session.backend().count(|call| *call == Call::Moved);

    assert!(session.apply_checkpoint("front"));
    assert_eq!(session.camera(), front);
    assert_eq!(session.backend().count(|call| *call == Call::Moved), moves + 1);
    assert!(session.scheduler().needs_render());

    assert!(!session.apply_checkpoint("missing"));
    assert!(session.remove_checkpoint("front"));
    assert!(!session.apply_checkpoint("front"));
}

#[test]
fn test_recording_follows_camera_flight() {
    let dir = temp_dir("recording");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let cache_dir = dir.join("CameraPaths");
    std::fs::create_dir_all(&cache_dir).unwrap();
    CameraPath::from_control_points(
        "short",
        vec![
            ControlPoint::new(0.0, CameraPose::default()),
            ControlPoint::new(
                1.0,
                CameraPose::look_at(Vec3::new(1.5, 0.0, 0.0), Vec3::ZERO, Vec3::Y),
            ),
        ],
    )
    .to_binary_file(cache_dir.join("cloud.xyz.binpath"))
    .unwrap();

    let flight = SessionOptions {
        use_camera_flight: true,
        real_time_camera_flight: false,
        recording_fps: 8.0,
        ..options(&dir)
    };
    let mut session = Session::with_catalog(MockBackend::new(), flight, Catalog::empty());
    session.load_dataset(&cloud, true);
    session.frame(&docked());

    let frames = Rc::new(Cell::new(0));
    session.start_recording(Box::new(CountingSink(Rc::clone(&frames))));
    assert!(session.is_recording());

    let mut flight_frames = 0;
    for _ in 0..32 {
        flight_frames += 1;
        if session.frame(&docked()).flight_finished {
            break;
        }
    }

    // 1 s at 8 fps; only the first frame after the start is not recorded,
    // so the video ends on the last pose of the path.
    assert_eq!(flight_frames, 8);
    assert!(!session.is_recording());
    assert_eq!(frames.get(), 7);
    assert!((session.flight_time() - 1.0).abs() < f32::EPSILON);
    assert!(session
        .camera()
        .position
        .abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-5));

    // The flight stays at the end of the path.
    assert!(!session.frame(&docked()).flight_finished);
}

#[test]
fn test_png_recording_writes_frames() {
    let dir = temp_dir("png-recording");
    let cloud = write_cloud(&dir, "cloud.xyz");
    let mut session = session(&dir);
    session.load_dataset(&cloud, true);
    session.frame(&docked());

    let directory = session.start_png_recording();
    assert!(directory.starts_with(dir.join("Screenshots")));
    for _ in 0..3 {
        session.request_render();
        session.frame(&docked());
    }
    assert_eq!(session.stop_recording(), Some(2));
    assert!(directory.join("frame_000000.png").exists());
    assert!(directory.join("frame_000001.png").exists());
}

proptest! {
    #[test]
    fn test_any_number_of_dirty_events_renders_at_most_once(events in 0usize..16) {
        let dir = std::env::temp_dir();
        let mut session = Session::with_catalog(MockBackend::new(), options(&dir), Catalog::empty());
        session.frame(&docked());

        for _ in 0..events {
            session.request_render();
        }
        let report = session.frame(&docked());
        prop_assert_eq!(report.rendered, events > 0);
        prop_assert!(!session.frame(&docked()).rendered);
    }
}
