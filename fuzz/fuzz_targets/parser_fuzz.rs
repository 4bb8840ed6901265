#![no_main]
use libfuzzer_sys::fuzz_target;

const SUBCOMMANDS: [&str; 5] = ["compress", "decompress", "inspect", "scan", "config"];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };

    // First byte picks the subcommand.
    let mut args = vec![SUBCOMMANDS[selector as usize % SUBCOMMANDS.len()].to_string()];
    let text = String::from_utf8_lossy(rest);
    args.extend(text.split_whitespace().take(32).map(str::to_string));
    blockpress::cli::fuzz_try_parse_args(&args);
});
