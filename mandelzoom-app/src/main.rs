mod app;
mod config;
mod surface;

fn main() -> eframe::Result {
    app::run()
}
