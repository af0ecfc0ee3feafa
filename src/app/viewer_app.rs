//! Main application struct for the keyboard visualizer
//!
//! The engine lives on its own thread (see [`EngineWorker`]). The viewer
//! forwards pointer, speed and size changes to it and paints the newest
//! frame snapshot it has handed back.

use std::io;

use eframe::egui::{self, Align, Layout, RichText};

use super::theme;
use crate::engine::{EngineWorker, FrameSnapshot, VisualizerEngine};
use crate::protocol::{EngineHandle, EngineInput};
use crate::timing::{speed_percent, DEFAULT_SPEED_VALUE};
use crate::widgets::{self, KeyboardConfig, KeyboardPointer};

/// Main application state for the visualizer
pub struct ViewerApp {
    worker: EngineWorker,
    /// Newest frame received from the engine thread
    frame: FrameSnapshot,
    corner_radius: f32,
    pointer: KeyboardPointer,
    keyboard_config: KeyboardConfig,
    /// Slider position shown in the toolbar
    speed_value: f64,
    /// Surface size last sent to the engine
    surface_size: Option<(f64, f64)>,
    show_guides: bool,
    theme_applied: bool,
}

impl ViewerApp {
    /// Start the engine thread. It requests a repaint on `ctx` whenever it
    /// publishes a frame.
    pub fn new(
        ctx: &egui::Context,
        engine: VisualizerEngine,
        handle: EngineHandle,
    ) -> io::Result<Self> {
        let frame = FrameSnapshot::capture(&engine, 0.0);
        let corner_radius = engine.settings().corner_radius_px as f32;
        let repaint = ctx.clone();
        let worker = EngineWorker::spawn(engine, handle, move || repaint.request_repaint())?;

        Ok(Self {
            worker,
            speed_value: frame.speed_value,
            frame,
            corner_radius,
            pointer: KeyboardPointer::default(),
            keyboard_config: KeyboardConfig::default(),
            surface_size: None,
            show_guides: true,
            theme_applied: false,
        })
    }

    fn set_speed(&mut self, value: f64) {
        self.speed_value = value;
        self.worker.send(EngineInput::SetSpeed(value));
    }

    /// Back to the default slider position (100%).
    fn reset_speed(&mut self) {
        self.set_speed(DEFAULT_SPEED_VALUE);
    }

    fn receive_frame(&mut self) {
        if let Some(frame) = self.worker.latest() {
            // Follow speed changes made elsewhere without fighting a drag
            if frame.speed_value != self.frame.speed_value {
                self.speed_value = frame.speed_value;
            }
            self.frame = frame;
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(
                RichText::new("KEY BEAM")
                    .size(18.0)
                    .color(theme::text::PRIMARY)
                    .strong(),
            );

            ui.add_space(20.0);
            ui.separator();
            ui.add_space(20.0);

            ui.label(RichText::new("Speed").color(theme::text::SECONDARY));
            let slider = egui::Slider::new(&mut self.speed_value, 0.0..=100.0)
                .show_value(false)
                .step_by(1.0);
            if ui.add(slider).changed() {
                let value = self.speed_value;
                self.set_speed(value);
            }
            ui.label(
                RichText::new(format!("{}%", speed_percent(self.speed_value)))
                    .color(theme::accent::PRIMARY)
                    .monospace(),
            );
            if ui
                .small_button("Reset")
                .on_hover_text("Back to 100%")
                .clicked()
            {
                self.reset_speed();
            }

            ui.add_space(20.0);
            ui.checkbox(&mut self.show_guides, "Guides");

            let frame = &self.frame;
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.add_space(8.0);
                let status_color = if frame.pending_triggers > 0 {
                    theme::accent::WARNING
                } else {
                    theme::text::DISABLED
                };
                ui.label(
                    RichText::new(format!("{} pending", frame.pending_triggers))
                        .color(status_color)
                        .small(),
                );
                ui.label(
                    RichText::new(format!(
                        "{} beams • {}% • {:.1}s",
                        frame.beams,
                        frame.speed_percent,
                        frame.now_ms / 1000.0
                    ))
                    .color(theme::text::SECONDARY)
                    .small(),
                );
            });
        });
    }

    fn draw_surface(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let size = (rect.width() as f64, rect.height() as f64);
        if self.surface_size != Some(size) {
            self.surface_size = Some(size);
            self.worker.send(EngineInput::Resize {
                width: size.0,
                height: size.1,
            });
        }

        let output = widgets::keyboard_input(ui, rect, &self.frame.layout, &mut self.pointer);
        for (key, action) in output.actions {
            self.worker.send(EngineInput::Pointer { key, action });
        }

        let layout = &self.frame.layout;
        let keyboard_top = layout.keyboard_top() as f32;

        let painter = ui.painter();
        let beam_area = egui::Rect::from_min_max(
            rect.min,
            egui::pos2(rect.right(), rect.top() + keyboard_top),
        );
        if self.show_guides {
            let start = layout.predictive_start_px() as f32;
            let touch = (layout.predictive_start_px() + layout.distance_to_touch()) as f32;
            theme::draw_surface_background(painter, beam_area, start, touch);
        } else {
            painter.rect_filled(beam_area, 0.0, theme::background::SURFACE);
        }

        widgets::paint_beams(
            painter,
            rect.min,
            beam_area,
            &self.frame.scene.beams,
            self.corner_radius,
        );
        widgets::paint_keys(painter, rect.min, &self.frame.scene, &self.keyboard_config);
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.receive_frame();

        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::none()
                    .fill(theme::background::PANEL)
                    .inner_margin(egui::Margin::symmetric(0.0, 8.0)),
            )
            .show(ctx, |ui| self.draw_toolbar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.draw_surface(ui));
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::Settings;
    use crate::keys::{PianoKey, PointerAction};
    use crate::protocol::EventChannels;

    fn app(settings: Settings) -> ViewerApp {
        let engine = VisualizerEngine::new(settings, 1040.0, 1000.0);
        let (_sender, _playback, handle) = EventChannels::with_defaults().split();
        ViewerApp::new(&egui::Context::default(), engine, handle).unwrap()
    }

    fn wait_for_frame(app: &mut ViewerApp, done: impl Fn(&FrameSnapshot) -> bool) {
        let started = Instant::now();
        loop {
            app.receive_frame();
            if done(&app.frame) {
                return;
            }
            assert!(started.elapsed() < Duration::from_secs(5), "engine never caught up");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_reset_returns_speed_to_nominal() {
        let mut settings = Settings::default();
        settings.default_speed_value = 100.0;
        let mut app = app(settings);
        assert_eq!(app.frame.speed_percent, 300);

        app.reset_speed();
        assert_eq!(app.speed_value, DEFAULT_SPEED_VALUE);
        wait_for_frame(&mut app, |frame| frame.speed_percent == 100);
        assert_eq!(app.speed_value, DEFAULT_SPEED_VALUE);
    }

    #[test]
    fn test_pointer_input_reaches_engine_thread() {
        let mut app = app(Settings::default());
        app.worker.send(EngineInput::Pointer {
            key: PianoKey::MIDDLE_C,
            action: PointerAction::Down,
        });
        wait_for_frame(&mut app, |frame| {
            frame.scene.key(PianoKey::MIDDLE_C).map_or(false, |k| k.pressed) && frame.beams == 1
        });
    }
}
