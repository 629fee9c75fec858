use clap::{
    crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches,
    Command,
};
use refold::create::OverwritePolicy;
use std::path::PathBuf;

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .help("Directory to restructure")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML manifest to use instead of the built-in portfolio layout")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("skip-existing")
                .long("skip-existing")
                .help("Keep files that already exist instead of overwriting them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Preview the changes without touching the filesystem")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    handle_run(&matches)
}

fn init_logging(is_verbose: bool) {
    let default_level = if is_verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn handle_run(args: &ArgMatches) -> miette::Result<()> {
    let root = args
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = refold::load_config(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if args.get_flag("skip-existing") {
        config.overwrite = OverwritePolicy::Skip;
    }

    if args.get_flag("dry-run") {
        refold::dry_run(&root, &config)?;
    } else {
        refold::restructure(&root, &config)?;
    }

    Ok(())
}
