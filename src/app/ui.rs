use crate::app::PreviewApp;
use super::data::*;
use super::list_view::*;
use super::programs::Program;
use super::render_engine::ShaderRenderer;

use egui::{pos2, vec2, Align2, Color32, FontId, Id, LayerId, Order, Rect, Rounding};

const BACKGROUND: Color32 = Color32::from_rgb(0x11, 0x11, 0x11);
const TEXT_COLOR: Color32 = Color32::from_rgb(0xDD, 0xDD, 0xDD);
const ERROR_TEXT_COLOR: Color32 = Color32::from_rgb(0xFF, 0x8A, 0x80);
const FPS_COLOR: Color32 = Color32::from_rgb(0x00, 0xE4, 0x30);
const DEFAULT_TEXT_SIZE: f32 = 20.0;
const LIST_TEXT_SIZE: f32 = 30.0;
const POPUP_TEXT_SIZE: f32 = 16.0;
const KEY_SCROLL_STEP: f32 = ROW_HEIGHT + ROW_PADDING;

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt);

        self.handle_keys(ctx);
        self.poll_reload();

        if self.mode == Mode::Menu {
            self.handle_list_input(ctx);
        }

        self.popups.tick(dt);
        if self.auto_time {
            self.time += dt;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                self.custom_painting(ui);
            });

        if self.mode == Mode::Menu {
            self.draw_program_list(ctx);
        }
        self.draw_hud(ctx, dt);
        self.draw_popups(ctx);

        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.destroy_gl_resources(gl);
        }
    }
}

impl PreviewApp {
    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (tab, reload, open, pause) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Tab),
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::O),
                i.key_pressed(egui::Key::Space),
            )
        });

        if tab {
            self.toggle_mode();
        }
        if reload {
            self.reload_programs();
        }
        if open {
            self.pick_directory();
        }
        if pause {
            self.auto_time = !self.auto_time;
        }
    }

    fn handle_list_input(&mut self, ctx: &egui::Context) {
        let layout = ListLayout::for_screen(ctx.screen_rect());
        let count = self.programs.len();

        let (wheel, up, down, pointer, pressed, held) = ctx.input(|i| {
            (
                i.scroll_delta.y,
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
                i.pointer.hover_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
            )
        });

        // Wheel up moves the content down, like the arrow keys.
        self.scroll.scroll_by(-wheel, &layout, count);
        if up {
            self.scroll.scroll_by(-KEY_SCROLL_STEP, &layout, count);
        } else if down {
            self.scroll.scroll_by(KEY_SCROLL_STEP, &layout, count);
        }
        self.scroll.clamp(&layout, count);

        if let Some(pos) = pointer {
            if pressed && !self.scroll.press(pos, &layout, count) {
                if let Some(index) = layout.hit_test(pos, self.scroll.offset(), count) {
                    self.select(index);
                }
            }
            self.scroll.drag_to(pos.y, &layout, count);
        }
        if !held {
            self.scroll.release();
        }
    }

    fn draw_program_list(&self, ctx: &egui::Context) {
        let layout = ListLayout::for_screen(ctx.screen_rect());
        let count = self.programs.len();
        let offset = self.scroll.offset();
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("program_list")));

        let panel_rounding = 0.05 * layout.viewport.width().min(layout.viewport.height());
        painter.rect_filled(
            layout.viewport,
            Rounding::same(panel_rounding),
            to_color32(color_alpha(0x181818, OVERLAY_ALPHA)),
        );

        if self.programs.is_empty() {
            painter.text(
                layout.viewport.center(),
                Align2::CENTER_CENTER,
                format!("no *.{} files in {}", self.settings.extension, self.programs.dir().display()),
                FontId::proportional(DEFAULT_TEXT_SIZE),
                TEXT_COLOR,
            );
            return;
        }

        let (pointer, held) = ctx.input(|i| (i.pointer.hover_pos(), i.pointer.primary_down()));
        let hovered = if self.scroll.is_dragging() {
            None
        } else {
            pointer.and_then(|pos| layout.hit_test(pos, offset, count))
        };

        let rows = painter.with_clip_rect(layout.viewport);
        for index in layout.visible_rows(offset, count) {
            let Some(program) = self.programs.get(index) else {
                continue;
            };
            let rect = layout.row_rect(index, offset);
            let is_hovered = hovered == Some(index);
            let color = row_color(is_hovered, is_hovered && held, self.selected == Some(index));
            rows.rect_filled(rect, 0.0, to_color32(color));

            let (label, text_color) = row_label(program);
            rows.text(
                rect.left_center() + vec2(layout.padding, 0.0),
                Align2::LEFT_CENTER,
                label,
                FontId::proportional(LIST_TEXT_SIZE),
                text_color,
            );
        }

        if let Some(thumb) = layout.thumb_rect(offset, count) {
            let rounding = Rounding::same(layout.scrollbar_width / 2.0);
            let thumb_color = if self.scroll.is_dragging() {
                brighten(color_alpha(0x663030, OVERLAY_ALPHA), 0.3)
            } else {
                color_alpha(0x663030, OVERLAY_ALPHA)
            };
            painter.rect_filled(layout.track_rect(), rounding, to_color32(color_alpha(0x101010, OVERLAY_ALPHA)));
            painter.rect_filled(thumb, rounding, to_color32(thumb_color));
        }
    }

    fn draw_hud(&self, ctx: &egui::Context, dt: f32) {
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("hud")));
        let screen = ctx.screen_rect();

        let name = self.selected_program()
            .map(|p| p.name.as_str())
            .unwrap_or("null");
        painter.text(
            pos2(screen.left() + 5.0, screen.bottom() - 5.0),
            Align2::LEFT_BOTTOM,
            format!("program: {}", name),
            FontId::proportional(DEFAULT_TEXT_SIZE),
            TEXT_COLOR,
        );

        let fps = if dt > 0.0 { (1.0 / dt).round() } else { 0.0 };
        let paused = if self.auto_time { "" } else { " (paused)" };
        painter.text(
            pos2(screen.left() + 5.0, screen.top() + 5.0),
            Align2::LEFT_TOP,
            format!("{} FPS{}", fps, paused),
            FontId::monospace(DEFAULT_TEXT_SIZE),
            FPS_COLOR,
        );
    }

    /// Newest popup at the bottom right, older ones stacked above it.
    fn draw_popups(&self, ctx: &egui::Context) {
        if self.popups.is_empty() {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("popups")));
        let screen = ctx.screen_rect();
        let padding = vec2(10.0, 6.0);
        let mut bottom = screen.bottom() - 10.0;

        for popup in self.popups.iter().rev() {
            let opacity = popup.opacity();
            let (background, text) = match popup.kind {
                PopupKind::Info => (Color32::from_rgb(0x20, 0x20, 0x20), TEXT_COLOR),
                PopupKind::Error => (Color32::from_rgb(0x40, 0x14, 0x14), ERROR_TEXT_COLOR),
            };

            let galley = painter.layout_no_wrap(
                popup.message.clone(),
                FontId::proportional(POPUP_TEXT_SIZE),
                text.gamma_multiply(opacity),
            );
            let size = galley.size() + 2.0 * padding;
            let rect = Rect::from_min_size(
                pos2(screen.right() - 10.0 - size.x, bottom - size.y),
                size,
            );

            painter.rect_filled(rect, Rounding::same(4.0), background.gamma_multiply(0.9 * opacity));
            painter.galley(rect.min + padding, galley);
            bottom = rect.top() - 6.0;
        }
    }
}

fn row_label(program: &Program<ShaderRenderer>) -> (String, Color32) {
    if program.missing {
        (format!("{} (missing)", program.name), ERROR_TEXT_COLOR)
    } else if !program.is_valid() {
        (format!("{} (error)", program.name), ERROR_TEXT_COLOR)
    } else {
        (program.name.clone(), TEXT_COLOR)
    }
}
