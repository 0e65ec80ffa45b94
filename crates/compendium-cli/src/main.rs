#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    compendium_cli::main_entry()
}
