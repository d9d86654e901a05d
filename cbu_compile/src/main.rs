use cbu_compile::{run_tokens, summary, token_line};
use cbu_syntax::lex::Lexer;
use std::{
    env, fs,
    io::{self, Write},
    process::ExitCode,
};

const USAGE: &str = "Usage: cbu [--tokens] <file>";

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    match parse_args(&args) {
        Some((show_tokens, file_path)) => run_file(file_path, show_tokens),
        None => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether to list tokens and the file to run, or `None` when
/// the arguments do not match the usage line.
fn parse_args(args: &[String]) -> Option<(bool, &str)> {
    match args {
        [path] => Some((false, path.as_str())),
        [flag, path] if flag == "--tokens" => Some((true, path.as_str())),
        _ => None,
    }
}

fn run_file(file_path: &str, show_tokens: bool) -> ExitCode {
    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read {file_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let tokens = Lexer::new(&source).lex_all();
    if show_tokens {
        tokens.iter().for_each(|t| println!("{}", token_line(t)));
    }

    let diagnostics = {
        let mut stdout = io::stdout().lock();
        let diagnostics = run_tokens(tokens, &mut stdout);
        stdout.flush().expect("Failed to flush stdout");
        diagnostics
    };
    println!("{}", summary(&diagnostics));
    diagnostics.iter().for_each(|e| eprintln!("{e}"));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn file_only() {
        assert_eq!(parse_args(&args(&["prog.cbu"])), Some((false, "prog.cbu")));
    }

    #[test]
    fn tokens_flag() {
        assert_eq!(
            parse_args(&args(&["--tokens", "prog.cbu"])),
            Some((true, "prog.cbu"))
        );
    }

    #[test]
    fn bad_usage() {
        assert_eq!(parse_args(&args(&[])), None);
        assert_eq!(parse_args(&args(&["-t", "prog.cbu"])), None);
        assert_eq!(parse_args(&args(&["a.cbu", "b.cbu"])), None);
        assert_eq!(parse_args(&args(&["--tokens", "a.cbu", "b.cbu"])), None);
    }
}
