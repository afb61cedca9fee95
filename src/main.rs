use hostguard::error::{is_permission_denied, ELEVATION_HINT};

fn main() {
    if let Err(e) = hostguard::cli::run() {
        eprintln!("Error: {e:#}");
        if is_permission_denied(&e) {
            eprintln!("{ELEVATION_HINT}");
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}
