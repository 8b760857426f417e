//! Simple command that prints one or '-n count' UUID strings, version 1 unless '-4' is given

use std::{env, io, io::Write, process::ExitCode, thread};

#[derive(Debug, Default, PartialEq)]
struct Options {
    count: Option<usize>,
    v4: bool,
}

fn main() -> io::Result<ExitCode> {
    let opts = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(opts) => opts,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-4] [-n count]",
                    program.as_deref().unwrap_or("uuid14")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..opts.count.unwrap_or(1) {
        if opts.v4 {
            writeln!(buf, "{}", uuid14::uuid4())?;
        } else {
            match retry_rate_limited(uuid14::uuid1) {
                Ok(uuid) => writeln!(buf, "{}", uuid)?,
                Err(err) => {
                    buf.flush()?;
                    eprintln!("Error: {}", err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Calls `generate` again while it reports the rate limit, i.e. until the next millisecond.
fn retry_rate_limited(
    mut generate: impl FnMut() -> Result<uuid14::Uuid, uuid14::GenerateError>,
) -> Result<uuid14::Uuid, uuid14::GenerateError> {
    loop {
        match generate() {
            Err(uuid14::GenerateError::RateExceeded) => thread::yield_now(),
            result => return result,
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-4" => opts.v4 = true,
            "-n" => {
                if opts.count.is_some() {
                    return Err("option 'n' given more than once".to_owned());
                }
                let Some(n_arg) = args.next() else {
                    return Err("argument to option 'n' missing".to_owned());
                };
                let Ok(c) = n_arg.parse() else {
                    return Err(format!("invalid argument to option 'n': '{}'", n_arg));
                };
                opts.count.replace(c);
            }
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        }
    }
    Ok(opts)
}
