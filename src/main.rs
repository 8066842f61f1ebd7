mod cli;
mod fusebuild;

use clap::Parser;

use env_logger::Env;

use cli::CLI;

fn logger(env: Env, verbose: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env.default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
}

fn init_logger(verbose: bool) {
    logger(Env::default(), verbose).init();
}

fn main() {
    let cli = CLI::parse();
    init_logger(cli.verbose);

    if let Err(e) = cli.run() {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
