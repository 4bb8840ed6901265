fn main() {
    #[cfg(feature = "cli")]
    blockpress::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("blockpress: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
