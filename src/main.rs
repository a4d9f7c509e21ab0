fn main() {
    vmlaunch::app::cli::run();
}
