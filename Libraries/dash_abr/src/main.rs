use dash_abr::args::{get_log_level_filter, parse_args, player_options};
use dash_abr::DashPlayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, Layer};

fn main() {
    let args = parse_args();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(get_log_level_filter(&args));
    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");

    info!("{:?}", args);

    let options = match player_options(&args) {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut player = DashPlayer::new(options);
    match player.run(&args.manifest) {
        Ok(()) => info!("Playback finished, downloads in {}", player.run_dir().display()),
        Err(e) if e.is_fatal() => {
            error!("Fatal: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Playback aborted: {}", e);
            std::process::exit(2);
        }
    }
}
