use std::collections::VecDeque;
use std::time::Duration;

const FPS_SAMPLE_WINDOW: usize = 180;

/// Rolling frame timing shown in the top bar.
#[derive(Default)]
pub(in crate::app) struct FrameStats {
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    simulate_ms: f32,
    draw_ms: f32,
}

impl FrameStats {
    pub(in crate::app) fn record(&mut self, dt: f32, simulate: Duration, draw: Duration) {
        self.simulate_ms = simulate.as_secs_f32() * 1000.0;
        self.draw_ms = draw.as_secs_f32() * 1000.0;

        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn average_fps(&self) -> Option<f32> {
        if self.fps_samples.is_empty() {
            return None;
        }
        Some(self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32)
    }

    pub(in crate::app) fn display_text(&self) -> Option<String> {
        if self.fps_current <= f32::EPSILON {
            return None;
        }

        let mut parts = vec![format!("FPS {:.0}", self.fps_current)];
        if let Some(avg) = self.average_fps() {
            parts.push(format!("avg {avg:.1}"));
        }
        parts.push(format!("sim {:.2} ms", self.simulate_ms));
        parts.push(format!("draw {:.2} ms", self.draw_ms));
        Some(parts.join(" | "))
    }
}
