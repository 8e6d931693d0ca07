//! linkbench binary entry point.

fn main() {
    if let Err(err) = linkbench_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
