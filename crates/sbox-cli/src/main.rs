//! Command-line interface for the S-box workbench.

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use aes_core::{
    decrypt_buffer, encrypt_block_traced, encrypt_buffer, expand_key, Block, CipherKey, SBox,
    TraceStep, AES_SBOX,
};
use sbox_gen::{aes_affine_matrix, build_sbox, trace_construction, Matrix8};
use sbox_metrics::{analyze, ddt, lat};

/// S-box workbench CLI.
#[derive(Parser)]
#[command(
    name = "sboxlab",
    version,
    author,
    about = "Construct, score, and run 256-entry substitution tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a table against the standard metric battery.
    Analyze {
        /// Table as 512 hex characters (defaults to the AES S-box).
        #[arg(long, value_name = "FILE")]
        sbox: Option<PathBuf>,
        /// Write the report as JSON.
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
        /// Write the full differential distribution table as JSON rows.
        #[arg(long, value_name = "FILE")]
        ddt: Option<PathBuf>,
        /// Write the full linear approximation table as JSON rows.
        #[arg(long, value_name = "FILE")]
        lat: Option<PathBuf>,
    },
    /// Build a table from an affine matrix over GF(2^8) inverses.
    Construct {
        /// Matrix file: 8 lines of 8 bits (defaults to the AES matrix).
        #[arg(long, value_name = "FILE")]
        matrix: Option<PathBuf>,
        /// Affine constant as two hex characters.
        #[arg(long, value_name = "HEX", default_value = "63")]
        constant: String,
        /// Reducing polynomial as hex (9 bits).
        #[arg(long, value_name = "HEX", default_value = "11b")]
        poly: String,
        /// Output path for the table as hex text.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        /// Print the per-bit construction audit for one input byte.
        #[arg(long, value_name = "HEX")]
        trace: Option<String>,
    },
    /// Encrypt a file (PKCS#7-padded buffer).
    Enc {
        /// Cipher key as 32/48/64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Custom table (defaults to the AES S-box).
        #[arg(long, value_name = "FILE")]
        sbox: Option<PathBuf>,
        /// Input plaintext path.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output ciphertext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Decrypt a file and strip padding.
    Dec {
        /// Cipher key as 32/48/64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Custom table (defaults to the AES S-box).
        #[arg(long, value_name = "FILE")]
        sbox: Option<PathBuf>,
        /// Input ciphertext path.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output plaintext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Encrypt one block and print every round step.
    Trace {
        /// Cipher key as 32/48/64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Plaintext block as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        block_hex: String,
        /// Custom table (defaults to the AES S-box).
        #[arg(long, value_name = "FILE")]
        sbox: Option<PathBuf>,
        /// Write the records as JSON instead of printing them.
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            sbox,
            json,
            ddt,
            lat,
        } => cmd_analyze(sbox.as_deref(), json.as_deref(), ddt.as_deref(), lat.as_deref()),
        Commands::Construct {
            matrix,
            constant,
            poly,
            out,
            trace,
        } => cmd_construct(matrix.as_deref(), &constant, &poly, &out, trace.as_deref()),
        Commands::Enc {
            key_hex,
            sbox,
            input,
            output,
        } => cmd_enc(&key_hex, sbox.as_deref(), &input, &output),
        Commands::Dec {
            key_hex,
            sbox,
            input,
            output,
        } => cmd_dec(&key_hex, sbox.as_deref(), &input, &output),
        Commands::Trace {
            key_hex,
            block_hex,
            sbox,
            json,
        } => cmd_trace(&key_hex, &block_hex, sbox.as_deref(), json.as_deref()),
    }
}

fn cmd_analyze(
    sbox_path: Option<&Path>,
    json_path: Option<&Path>,
    ddt_path: Option<&Path>,
    lat_path: Option<&Path>,
) -> Result<()> {
    let sbox = load_sbox(sbox_path)?;
    info!("scoring table against the full metric battery");
    let report = analyze(&sbox);

    println!("bijective:               {}", report.bijective);
    for (bit, entry) in report.balance.iter().enumerate() {
        println!(
            "balance bit {bit}:           {}/{}{}",
            entry.zeros,
            entry.ones,
            if entry.balanced() { "" } else { "  (unbalanced)" }
        );
    }
    println!("nonlinearity:            {}", report.nonlinearity);
    println!("sac:                     {:.6}", report.sac);
    println!("bic nonlinearity:        {}", report.bic_nonlinearity);
    println!("bic sac:                 {:.6}", report.bic_sac);
    println!("differential uniformity: {}", report.differential_uniformity);
    println!("dap:                     {:.6}", report.dap);
    println!("lap:                     {:.6}", report.lap);
    println!("algebraic degree:        {}", report.algebraic_degree);
    println!("transparency order:      {:.6}", report.transparency_order);
    println!("correlation immunity:    {}", report.correlation_immunity);

    if let Some(path) = json_path {
        let body = serde_json::to_string_pretty(&report).context("serialize report")?;
        fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
        info!("wrote report to {}", path.display());
    }
    if let Some(path) = ddt_path {
        let rows = ddt(&sbox).to_rows();
        let body = serde_json::to_string(&rows).context("serialize ddt")?;
        fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
        info!("wrote ddt to {}", path.display());
    }
    if let Some(path) = lat_path {
        let rows = lat(&sbox).to_rows();
        let body = serde_json::to_string(&rows).context("serialize lat")?;
        fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
        info!("wrote lat to {}", path.display());
    }
    Ok(())
}

fn cmd_construct(
    matrix_path: Option<&Path>,
    constant_hex: &str,
    poly_hex: &str,
    out: &Path,
    trace_hex: Option<&str>,
) -> Result<()> {
    let matrix = match matrix_path {
        Some(path) => parse_matrix_file(path)?,
        None => aes_affine_matrix(),
    };
    let constant = u8::from_str_radix(constant_hex.trim(), 16)
        .with_context(|| format!("parse constant {constant_hex:?}"))?;
    let poly = u16::from_str_radix(poly_hex.trim(), 16)
        .with_context(|| format!("parse polynomial {poly_hex:?}"))?;

    debug!(constant, poly, "constructing table");
    let sbox = build_sbox(&matrix, constant, poly);
    write_sbox_hex(out, &sbox)?;
    info!("wrote table to {}", out.display());
    if !sbox.is_bijective() {
        println!("note: constructed table is not bijective");
    }

    if let Some(byte_hex) = trace_hex {
        let x = u8::from_str_radix(byte_hex.trim(), 16)
            .with_context(|| format!("parse trace byte {byte_hex:?}"))?;
        let trace = trace_construction(&matrix, constant, poly, x);
        let body = serde_json::to_string_pretty(&trace).context("serialize construction trace")?;
        println!("{body}");
    }
    Ok(())
}

fn cmd_enc(
    key_hex: &str,
    sbox_path: Option<&Path>,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let key = parse_key_hex(key_hex)?;
    let sbox = load_sbox(sbox_path)?;
    let round_keys = expand_key(&key, &sbox);
    let data = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let ciphertext = encrypt_buffer(&data, &round_keys, &sbox);
    fs::write(output, ciphertext).with_context(|| format!("write {}", output.display()))?;
    info!("encrypted {} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_dec(
    key_hex: &str,
    sbox_path: Option<&Path>,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let key = parse_key_hex(key_hex)?;
    let sbox = load_sbox(sbox_path)?;
    if !sbox.is_bijective() {
        info!("table is not bijective; decryption may be ambiguous");
    }
    let round_keys = expand_key(&key, &sbox);
    let data = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let plaintext = decrypt_buffer(&data, &round_keys, &sbox).context("decrypt buffer")?;
    fs::write(output, plaintext).with_context(|| format!("write {}", output.display()))?;
    info!("decrypted {} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_trace(
    key_hex: &str,
    block_hex: &str,
    sbox_path: Option<&Path>,
    json_path: Option<&Path>,
) -> Result<()> {
    let key = parse_key_hex(key_hex)?;
    let sbox = load_sbox(sbox_path)?;
    let block = parse_block_hex(block_hex)?;
    let round_keys = expand_key(&key, &sbox);
    let (ciphertext, records) = encrypt_block_traced(&block, &round_keys, &sbox);

    if let Some(path) = json_path {
        let body = serde_json::to_string_pretty(&records).context("serialize trace")?;
        fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
        info!("wrote {} records to {}", records.len(), path.display());
    } else {
        for record in &records {
            match record.step {
                TraceStep::Input => println!("input"),
                step => println!("round {:>2}  {:?}", record.round, step),
            }
            for row in &record.state {
                println!("    {}", hex_row(row));
            }
            if let Some(round_key) = &record.round_key {
                println!("  round key:");
                for row in round_key {
                    println!("    {}", hex_row(row));
                }
            }
        }
    }
    println!("ciphertext: {}", hex::encode(ciphertext));
    Ok(())
}

fn hex_row(row: &[u8; 4]) -> String {
    row.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_key_hex(hex_str: &str) -> Result<CipherKey> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    CipherKey::new(bytes).context("validate key")
}

fn parse_block_hex(hex_str: &str) -> Result<Block> {
    let bytes = hex::decode(hex_str.trim()).context("decode block hex")?;
    let block: Block = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("block must be 16 bytes (32 hex characters)"))?;
    Ok(block)
}

fn load_sbox(path: Option<&Path>) -> Result<SBox> {
    let Some(path) = path else {
        return Ok(AES_SBOX);
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let compact: String = text.split_whitespace().collect();
    let bytes = hex::decode(&compact).context("decode table hex")?;
    SBox::from_slice(&bytes).context("validate table")
}

fn write_sbox_hex(path: &Path, sbox: &SBox) -> Result<()> {
    let mut text = String::with_capacity(16 * 33);
    for chunk in sbox.as_bytes().chunks(16) {
        text.push_str(&hex::encode(chunk));
        text.push('\n');
    }
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

fn parse_matrix_file(path: &Path) -> Result<Matrix8> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut rows: Vec<Vec<u8>> = Vec::new();
    for line in text.lines() {
        let mut row = Vec::new();
        for c in line.split_whitespace().flat_map(|token| token.chars()) {
            match c.to_digit(10) {
                Some(digit) => row.push(digit as u8),
                None => bail!("matrix entries must be digits, got {c:?}"),
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Matrix8::from_bits(&rows).context("validate matrix")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_construct_parameters_reproduce_aes() {
        let matrix = aes_affine_matrix();
        let sbox = build_sbox(&matrix, sbox_gen::AES_AFFINE_CONSTANT, 0x11B);
        assert_eq!(sbox.as_bytes(), AES_SBOX.as_bytes());
    }

    #[test]
    fn key_parsing_accepts_all_standard_lengths() {
        assert!(parse_key_hex("00112233445566778899aabbccddeeff").is_ok());
        assert!(parse_key_hex(&"ab".repeat(24)).is_ok());
        assert!(parse_key_hex(&"ab".repeat(32)).is_ok());
        assert!(parse_key_hex("0011").is_err());
        assert!(parse_key_hex("not hex").is_err());
    }

    #[test]
    fn block_parsing_requires_sixteen_bytes() {
        assert!(parse_block_hex("00112233445566778899aabbccddeeff").is_ok());
        assert!(parse_block_hex("001122").is_err());
    }
}
