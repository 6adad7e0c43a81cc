use sp95_infl::dashboard::{init_logger, parse_cli, run, DashboardKind};
use sp95_infl::scrape::HttpSource;

fn main() {
    let kind = DashboardKind::Inflation;
    let args = parse_cli(kind);
    init_logger(args.verbose);
    if !args.describe {
        println!("read inflation from {}", args.url);
    }
    let result = HttpSource::new(args.timeout).and_then(|source| run(kind, &args, source));
    if let Err(e) = result {
        eprintln!("{}: {}", kind.name(), e);
        std::process::exit(1);
    }
}
