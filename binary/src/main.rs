use clap::{App, Arg, ArgMatches};
use colored::*;
use icon_mosaic::{generate, MosaicConfig, Resize};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::str::FromStr;

fn from_string_validator<T: FromStr>(error: String) -> impl Fn(String) -> Result<(), String> {
    move |value| match value.parse::<T>() {
        Ok(..) => Ok(()),
        Err(..) => Err(error.clone()),
    }
}
fn try_parse<T: FromStr>(text: Option<&str>) -> Option<T> {
    text.and_then(|a| a.parse().ok())
}

fn app() -> App<'static, 'static> {
    App::new("Icon mosaic")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("ICON_DIR")
            .help("The directory where icons are stored")
            .required(true)
            .takes_value(true)
            .short("c")
            .long("icon-dir")
        )
        .arg(Arg::with_name("INPUT")
            .help("The image to recreate")
            .takes_value(true)
            .short("i")
            .long("input")
            .default_value("in.png")
        )
        .arg(Arg::with_name("OUTPUT")
            .help("The output file name")
            .takes_value(true)
            .short("o")
            .long("output")
            .default_value("out.png")
        )
        .arg(Arg::with_name("WIDTH")
            .help("Resize the input image to this width before processing")
            .takes_value(true)
            .short("W")
            .long("width")
            .validator(from_string_validator::<NonZeroU32>("Invalid width".into()))
        )
        .arg(Arg::with_name("HEIGHT")
            .help("Resize the input image to this height before processing")
            .takes_value(true)
            .short("H")
            .long("height")
            .validator(from_string_validator::<NonZeroU32>("Invalid height".into()))
        )
        .arg(Arg::with_name("THREADS")
            .help("Worker threads used to load icons and match cells (default: one per core)")
            .takes_value(true)
            .short("j")
            .long("threads")
            .validator(from_string_validator::<NonZeroUsize>("Invalid thread count".into()))
        )
        .arg(Arg::with_name("PLAN")
            .help("Also write the chosen icon of every cell to this JSON file")
            .takes_value(true)
            .short("p")
            .long("plan")
        )
        .arg(Arg::with_name("VERBOSE")
            .help("Log every icon and cell decision")
            .short("v")
            .long("verbose")
        )
}

fn config_from_matches(matches: &ArgMatches) -> MosaicConfig {
    let mut config = MosaicConfig::new(matches.value_of("ICON_DIR").unwrap_or_default());
    if let Some(input) = matches.value_of("INPUT") {
        config.input = PathBuf::from(input);
    }
    if let Some(output) = matches.value_of("OUTPUT") {
        config.output = PathBuf::from(output);
    }
    config.threads = try_parse::<usize>(matches.value_of("THREADS")).unwrap_or(0);
    config.resize = Resize::from_dimensions(
        try_parse::<u32>(matches.value_of("WIDTH")),
        try_parse::<u32>(matches.value_of("HEIGHT")),
    );
    config.plan_output = matches.value_of("PLAN").map(PathBuf::from);
    config
}

fn main() {
    let mut app = app();
    if std::env::args_os().len() == 1 {
        let _ = app.write_help(&mut std::io::stderr());
        eprintln!();
        return;
    }
    let matches = app.get_matches();

    let level = if matches.is_present("VERBOSE") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        eprintln!("{}", "Could not initialise logging".yellow());
    }

    let config = config_from_matches(&matches);
    match generate(&config) {
        Ok(report) => info!(
            "Placed {} icons from a set of {} into a {}x{} mosaic",
            report.placements, report.icons, report.width, report.height
        ),
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    }
}
