use sp95_infl::dashboard::{init_logger, parse_cli, run, DashboardKind};
use sp95_infl::scrape::HttpSource;

fn main() {
    let kind = DashboardKind::Sp95;
    let args = parse_cli(kind);
    init_logger(args.verbose);
    if !args.describe {
        println!(
            "read fuel prices from {} and inflation from {}",
            args.csvin.display(),
            args.url
        );
    }
    let result = HttpSource::new(args.timeout).and_then(|source| run(kind, &args, source));
    if let Err(e) = result {
        eprintln!("{}: {}", kind.name(), e);
        std::process::exit(1);
    }
}
