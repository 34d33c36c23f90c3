//! Render-dirty scheduling.
//!
//! Any number of events may mark the frame dirty; the render pass still runs
//! at most once per frame, and the one-shot flag is cleared right after it ran.

/// Whether the displayed frame is up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing changed since the last render.
    Clean,
    /// The next frame must render.
    Dirty,
}

/// Tracks pending re-render requests.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    needs_render: bool,
    continuous_render: bool,
    render_count: u64,
}

impl RenderScheduler {
    /// Creates a scheduler. The first frame always renders.
    pub fn new(continuous_render: bool) -> Self {
        Self {
            needs_render: true,
            continuous_render,
            render_count: 0,
        }
    }

    /// Requests a render on the next frame.
    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    /// Returns the one-shot request flag.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Returns whether every frame renders.
    #[must_use]
    pub fn continuous_render(&self) -> bool {
        self.continuous_render
    }

    /// Enables or disables rendering every frame.
    pub fn set_continuous_render(&mut self, continuous_render: bool) {
        self.continuous_render = continuous_render;
    }

    /// Returns the state without taking the backend into account.
    #[must_use]
    pub fn state(&self) -> RenderState {
        if self.needs_render || self.continuous_render {
            RenderState::Dirty
        } else {
            RenderState::Clean
        }
    }

    /// Returns how many render passes ran so far.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Runs `render` if the frame is dirty and clears the one-shot flag.
    ///
    /// `backend_requests_rerender` is the backend's own staleness report for
    /// this frame. Returns whether `render` was called.
    pub fn run_frame(&mut self, backend_requests_rerender: bool, render: impl FnOnce()) -> bool {
        let dirty = self.state() == RenderState::Dirty || backend_requests_rerender;
        if !dirty {
            return false;
        }

        render();
        self.needs_render = false;
        self.render_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_renders() {
        let mut scheduler = RenderScheduler::new(false);
        assert_eq!(scheduler.state(), RenderState::Dirty);
        assert!(scheduler.run_frame(false, || {}));
        assert_eq!(scheduler.state(), RenderState::Clean);
        assert!(!scheduler.run_frame(false, || {}));
    }

    #[test]
    fn test_requests_coalesce() {
        let mut scheduler = RenderScheduler::new(false);
        scheduler.run_frame(false, || {});

        for _ in 0..5 {
            scheduler.request_render();
        }
        let mut renders = 0;
        assert!(scheduler.run_frame(true, || renders += 1));
        assert_eq!(renders, 1);
        assert!(!scheduler.needs_render());
        assert!(!scheduler.run_frame(false, || renders += 1));
        assert_eq!(renders, 1);
        assert_eq!(scheduler.render_count(), 2);
    }

    #[test]
    fn test_backend_staleness_renders_without_request() {
        let mut scheduler = RenderScheduler::new(false);
        scheduler.run_frame(false, || {});
        assert!(scheduler.run_frame(true, || {}));
        assert_eq!(scheduler.state(), RenderState::Clean);
    }

    #[test]
    fn test_continuous_render_stays_dirty() {
        let mut scheduler = RenderScheduler::new(true);
        for _ in 0..3 {
            assert!(scheduler.run_frame(false, || {}));
            assert_eq!(scheduler.state(), RenderState::Dirty);
        }
        scheduler.set_continuous_render(false);
        assert!(!scheduler.run_frame(false, || {}));
    }

    proptest::proptest! {
        #[test]
        fn test_at_most_one_render_per_frame(requests in proptest::collection::vec(0usize..4, 1..32)) {
            let mut scheduler = RenderScheduler::new(false);
            for (frame, count) in requests.iter().enumerate() {
                for _ in 0..*count {
                    scheduler.request_render();
                }
                let mut renders = 0;
                let rendered = scheduler.run_frame(false, || renders += 1);
                proptest::prop_assert!(renders <= 1);
                // The first frame always renders.
                proptest::prop_assert_eq!(rendered, frame == 0 || *count > 0);
                proptest::prop_assert!(!scheduler.needs_render());
            }
        }
    }
}
