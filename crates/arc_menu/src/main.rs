#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::fs;

use anyhow::anyhow;
use chrono::{Datelike, Local, Timelike};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use arc_menu::APP_NAME;

fn main() -> eframe::Result<()> {
    if let Err(e) = set_log_config() {
        eprintln!("logging disabled: {:#}", e);
    }
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Box::new(arc_menu::App::new(cc))),
    )
}

fn set_log_config() -> anyhow::Result<()> {
    let local_time = Local::now();
    let file_name = format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}.log",
        local_time.year(),
        local_time.month(),
        local_time.day(),
        local_time.hour(),
        local_time.minute(),
        local_time.second()
    );
    let log_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("no home directory"))?
        .join(APP_NAME)
        .join("logs");
    fs::create_dir_all(&log_dir)?;
    let stdout = ConsoleAppender::builder().build();
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} - {l} - {m}{n}")))
        .build(log_dir.join(file_name))?;
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(LevelFilter::Info),
        )?;
    log4rs::init_config(config)?;
    Ok(())
}
