use bindchain_cli::{
    command::{parse_command, Command},
    print_diagnostic,
    session::Session,
};
use bindchain_engine::CheckPolicy;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Binding warnings (missing values, duplicate variables) are the point of
    // the shell, so they show by default. RUST_LOG overrides.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> rustyline::Result<()> {
    init_tracing();
    let mut rl = rustyline::DefaultEditor::new()?;
    let mut session = Session::new(CheckPolicy::process_default());
    loop {
        let prompt = format!("bind[{}]> ", session.depth());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                print_diagnostic(e, &line);
                continue;
            }
        };
        match session.execute(command) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => print_diagnostic(e, &line),
        }
    }
    Ok(())
}
