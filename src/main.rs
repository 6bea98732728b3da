fn main() {
    if let Err(err) = route_labeler::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
