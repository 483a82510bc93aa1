use argh::FromArgs;
use simple_shell::command::process_exit_byte;
use simple_shell::env::Environment;
use simple_shell::{Config, Interpreter};
use std::process::ExitCode;

#[derive(FromArgs)]
/// Minimal interactive command interpreter.
/// Reads commands from standard input, one per line, until end of input or `exit`.
struct Args {}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let _args: Args = argh::from_env();

    let config = Config::from_process();
    let program = config.program_name.clone();
    let mut sh = Interpreter::new(config, Environment::new());

    let stdin = std::io::stdin();
    match sh.repl(&mut stdin.lock(), &mut std::io::stdout(), &mut std::io::stderr()) {
        Ok(code) => ExitCode::from(process_exit_byte(code)),
        Err(err) => {
            log::error!("shell stopped: {:?}", err);
            eprintln!("{}: {:#}", program, err);
            ExitCode::FAILURE
        }
    }
}
