//! Luna command line.

use lunac::commands::{explain_error, run_check};

fn main() {
    lunac::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "check" => {
            std::process::exit(run_check(&args[2..]));
        }
        "explain" | "--explain" => {
            if args.len() < 3 {
                eprintln!("Usage: luna explain <CODE>");
                eprintln!("Example: luna explain E2001");
                std::process::exit(1);
            }
            std::process::exit(explain_error(&args[2]));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("luna {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("error: unknown command '{command}'");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Luna - annotation-aware checker for Lua sources");
    println!();
    println!("Usage: luna <command> [options]");
    println!();
    println!("Commands:");
    println!("  check [--config <settings.json>] <path>...");
    println!("                  Check every Lua file below the given paths");
    println!("  explain <CODE>  Describe a diagnostic code");
    println!("  help            Show this message");
    println!("  version         Show the version");
    println!();
    println!("Set RUST_LOG (for example RUST_LOG=lunac=debug) for trace output on stderr.");
}
