fn main() {
    if let Err(err) = crime_dashboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
