use anyhow::Context;
use clap::Parser;
use log::debug;
use qrterm::{Config, Level};
use std::{
    ffi::OsString,
    io::{self, Read, Write},
    process,
};

//
// cargo run -- -l M https://example.com
// echo -n 'hello' | cargo run -- -s
//

#[derive(Parser, Debug)]
#[command(name = "qrterm", version, about = "Render a QR code in the terminal")]
struct Args {
    /// Output debugging information
    #[arg(short = 'v')]
    verbose: bool,

    /// Error correction level [L, M, H]
    #[arg(short = 'l', default_value = "L")]
    level: String,

    /// Size of the quiet zone border
    #[arg(short = 'q', default_value_t = qrterm::QUIET_ZONE)]
    quiet_zone: usize,

    /// Disable sixel output
    #[arg(short = 's')]
    disable_sixel: bool,

    /// Treat input as binary data when reporting it with -v
    #[arg(short = 'b')]
    binary: bool,

    /// Content to encode, read from stdin when absent
    content: Vec<OsString>,
}

/// Bytes to encode, taken from the arguments joined by spaces or from stdin.
///
/// Text and binary mode encode the same bytes; they differ only in how
/// `-v` reports the content.
fn read_content(args: &Args) -> anyhow::Result<Vec<u8>> {
    if !args.content.is_empty() {
        let mut data: Vec<u8> = Vec::new();
        for (i, arg) in args.content.iter().enumerate() {
            if i > 0 {
                data.push(b' ');
            }
            data.extend_from_slice(&arg_bytes(arg)?);
        }
        return Ok(data);
    }

    let mut data: Vec<u8> = Vec::new();
    io::stdin()
        .read_to_end(&mut data)
        .context("failed to read content from stdin")?;
    debug!("Read {} bytes from stdin", data.len());
    Ok(data)
}

#[cfg(unix)]
fn arg_bytes(arg: &OsString) -> anyhow::Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;

    Ok(arg.as_bytes().to_vec())
}

#[cfg(not(unix))]
fn arg_bytes(arg: &OsString) -> anyhow::Result<Vec<u8>> {
    arg.to_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| anyhow::anyhow!("argument {:?} is not valid Unicode", arg))
}

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    let level = match args.level.parse::<Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid error correction level: {}", args.level);
            eprintln!("Valid options are [L, M, H]");
            process::exit(1);
        }
    };

    if let Err(err) = run(&args, level) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Args, level: Level) -> anyhow::Result<()> {
    let content = read_content(args)?;

    let mut config = Config::default()
        .level(level)
        .quiet_zone(args.quiet_zone);
    if !args.disable_sixel {
        config = config.detect_sixel();
    }

    let mut stdout = io::stdout();
    if args.verbose {
        writeln!(stdout, "Level: {} ", args.level)?;
        writeln!(stdout, "Quietzone Border Size: {} ", args.quiet_zone)?;
        writeln!(stdout, "Binary mode: {} ", args.binary)?;
        if args.binary {
            writeln!(stdout, "Encoded data: {} bytes of binary data ", content.len())?;
        } else {
            stdout.write_all(b"Encoded data: ")?;
            stdout.write_all(&content)?;
            writeln!(stdout, " ")?;
        }
        writeln!(stdout)?;
    }
    writeln!(stdout)?;

    qrterm::render_binary_with_config(&content, config).context("failed to render QR code")
}
