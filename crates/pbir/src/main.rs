/// CLI module - command-line interface for pbir
mod cli;

fn main() {
    cli::run_cli();
}
