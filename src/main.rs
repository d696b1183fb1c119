use clap::Parser;
use log::{error, info};
use polar_mk::cli::{Command, CommandLineOptions};
use polar_mk::polar::{format_bits, parse_bits, TimedEncoder};
use polar_mk::Encoder;

fn main() {
    env_logger::init();
    let opts = CommandLineOptions::parse();

    if let Err(e) = run(&opts) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(opts: &CommandLineOptions) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = opts.load_config()?;
    let encoder = cfg.build_encoder::<u8>()?;

    match &opts.command {
        Command::Encode {
            bits,
            dump,
            dump_limit,
        } => {
            let u_k: Vec<u8> = parse_bits(bits, "info bits")?;
            let mut encoder = TimedEncoder::new(encoder);
            encoder.set_debug(*dump);
            encoder.set_debug_limit(*dump_limit);
            let x_n = encoder.encode_to_vec(&u_k)?;
            for frame in x_n.chunks(cfg.n) {
                println!("{}", format_bits(frame));
            }
            let stats = encoder.stats();
            info!(
                "encoded {} frame(s), total {:?}, max {:?}",
                stats.n_calls, stats.total, stats.max
            );
        }
        Command::Check { codeword } => {
            let x_n: Vec<u8> = parse_bits(codeword, "codeword")?;
            for frame in x_n.chunks(cfg.n) {
                let verdict = if encoder.is_codeword(frame)? {
                    "valid"
                } else {
                    "invalid"
                };
                println!("{} {}", format_bits(frame), verdict);
            }
        }
        Command::Generator => {
            print!("{}", encoder.generator_matrix());
        }
    }
    Ok(())
}
