#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod modules;
mod paths;
mod theme;

use gifconv_media::Pipeline;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pipeline = Pipeline::ffmpeg().expect("FFmpeg init failed");

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("GIF Converter")
            .with_inner_size([960.0, 620.0])
            .with_min_inner_size([720.0, 460.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "gifconv",
        native_options,
        Box::new(|cc| Ok(Box::new(app::GifConvApp::new(cc, pipeline)))),
    )
}
