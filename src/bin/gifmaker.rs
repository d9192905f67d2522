use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, Command};
use gifmaker::{FrameAggregator, FramePlayer, GifMakerHandler, GifMakerHandlerDelegate, LoaderSettings, PlaybackMode};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

mod source;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

struct CliDelegate {
    image_interval: f64,
    thumbnails: Cell<usize>,
}

impl GifMakerHandlerDelegate for CliDelegate {
    fn did_confirm_gif(&self) {
        tracing::info!(thumbnails = self.thumbnails.get(), "GIF confirmed");
    }

    fn default_time_interval_for_image_segments(&self) -> f64 {
        self.image_interval
    }

    fn set_thumbnails(&self, count: usize) {
        self.thumbnails.set(count);
    }
}

fn init_logging(quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if quiet { "warn" } else { "info" }));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn bin_main() -> BinResult<()> {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about("Builds a GIF timeline from stills and clips, and prints how the edited GIF plays")
        .arg_required_else_help(true)
        .arg(Arg::new("image-duration")
            .long("image-duration")
            .short('d')
            .value_name("seconds")
            .value_parser(value_parser!(f64))
            .default_value("0.1666667")
            .help("How long each PNG still is shown"))
        .arg(Arg::new("fps")
            .long("fps")
            .short('r')
            .value_name("num")
            .value_parser(value_parser!(f32))
            .default_value("10")
            .help("How many frames per second are taken from GIF clips"))
        .arg(Arg::new("speed")
            .long("speed")
            .short('s')
            .value_name("x")
            .value_parser(value_parser!(f32))
            .default_value("1")
            .help("Playback speed multiplier"))
        .arg(Arg::new("mode")
            .long("mode")
            .short('m')
            .value_parser(["loop", "reverse", "rebound"])
            .default_value("loop")
            .help("Playback order"))
        .arg(Arg::new("trim-start")
            .long("trim-start")
            .value_name("0-100")
            .value_parser(value_parser!(f64))
            .default_value("0")
            .help("Start of the trim range, in percent of the timeline"))
        .arg(Arg::new("trim-end")
            .long("trim-end")
            .value_name("0-100")
            .value_parser(value_parser!(f64))
            .default_value("100")
            .help("End of the trim range, in percent of the timeline"))
        .arg(Arg::new("nosort")
            .alias("nosort")
            .long("no-sort")
            .action(ArgAction::SetTrue)
            .help("Use files exactly in the order given, rather than sorted"))
        .arg(Arg::new("quiet")
            .long("quiet")
            .short('q')
            .action(ArgAction::SetTrue)
            .help("Only log warnings and errors"))
        .arg(Arg::new("FILE")
            .help("PNG stills and GIF clips, in timeline order")
            .num_args(1..)
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .get_matches_from(wild::args_os());

    init_logging(matches.get_flag("quiet"));

    let mut files: Vec<PathBuf> = matches.get_many::<PathBuf>("FILE").ok_or("Missing files")?.cloned().collect();
    if !matches.get_flag("nosort") {
        files.sort_by(|a, b| natord::compare(&a.to_string_lossy(), &b.to_string_lossy()));
    }
    source::check_if_paths_exist(&files)?;

    let image_interval = *matches.get_one::<f64>("image-duration").ok_or("Missing image duration")?;
    if !(image_interval > 0.) {
        return Err("Image duration must be positive".into());
    }
    let fps = *matches.get_one::<f32>("fps").ok_or("Missing fps")?;
    if !(fps > 0. && fps <= 100.) {
        return Err("fps must be between 0 and 100".into());
    }
    let speed = *matches.get_one::<f32>("speed").ok_or("Missing speed")?;
    let mode: PlaybackMode = matches.get_one::<String>("mode").ok_or("Missing mode")?.parse()?;
    let trim_start = *matches.get_one::<f64>("trim-start").ok_or("Missing trim start")?;
    let trim_end = *matches.get_one::<f64>("trim-end").ok_or("Missing trim end")?;

    let segments = source::segments_from_files(&files, None)?;

    let settings = LoaderSettings {
        frames_per_second: fps,
        default_image_interval: image_interval,
        ..LoaderSettings::default()
    };
    let delegate = Rc::new(CliDelegate {
        image_interval,
        thumbnails: Cell::new(0),
    });
    let mut handler = GifMakerHandler::new(FramePlayer::default(), FrameAggregator::gif(settings));
    handler.set_delegate(&delegate);

    let loaded = Rc::new(Cell::new(false));
    let loaded_flag = Rc::clone(&loaded);
    handler.load(segments, || tracing::info!(files = files.len(), "loading"), || {}, move |ok| loaded_flag.set(ok));
    handler.wait();
    if !loaded.get() {
        return Err("None of the inputs produced any frames".into());
    }

    handler.did_start_trimming();
    handler.did_trim(trim_start, 100.);
    handler.did_trim(trim_start, trim_end);
    handler.did_end_trimming(trim_start, trim_end);
    handler.did_select_speed(speed);
    handler.did_select_playback(mode);
    handler.did_confirm_gif();

    let settings = handler.settings().ok_or("Nothing loaded")?;
    let playback = handler.playback_frames();
    println!("{} frames loaded; playing frames {}..={} at {}x, {}",
        handler.frame_count(), settings.start_index(), settings.end_index(), settings.rate(), settings.mode());
    for (i, frame) in playback.iter().enumerate() {
        println!("{i:>5}  {}x{}  {:.3}s", frame.image.width(), frame.image.height(), frame.interval);
    }
    println!("total {:.3}s", playback.iter().map(|f| f.interval).sum::<f64>());
    Ok(())
}
